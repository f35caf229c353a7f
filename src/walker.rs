use crate::{
    Config,
    error::{ParseError, SchemaError, SchemaErrorKind},
    field::{ConfigField, FieldMeta},
    naming::{screaming_snake, short_type_name},
    registry::TypeRegistry,
    value::EnvValue,
};
use std::any::{Any, type_name};

/// Flattens a config struct into [`ConfigField`]s.
///
/// Generated `Config::visit` impls call one method per field; each borrows the
/// destination field for `'a` so the setter can write into it later.
pub struct Walker<'a> {
    prefix: String,
    path: Vec<String>,
    registry: TypeRegistry,
    fields: Vec<ConfigField<'a>>,
}

impl<'a> Walker<'a> {
    pub fn new(prefix: &str, registry: TypeRegistry) -> Self {
        Self {
            prefix: prefix.to_string(),
            path: Vec::new(),
            registry,
            fields: Vec::new(),
        }
    }

    /// A field parsed through the registry or its [`EnvValue`] impl
    pub fn leaf<T: EnvValue>(
        &mut self,
        name: &str,
        meta: FieldMeta,
        dest: &'a mut T,
    ) -> Result<(), SchemaError> {
        let env_var = self.validate_leaf(name, &meta)?;
        self.fields.push(ConfigField::new(
            env_var,
            meta,
            short_type_name(type_name::<T>()),
            Box::new(move |raw: &str, registry: &TypeRegistry| {
                *dest = T::decode_with(raw, registry)?;
                Ok(())
            }),
        ));
        Ok(())
    }

    /// A field whose type can only be parsed by a registered converter
    pub fn registered<T: Any + Send>(
        &mut self,
        name: &str,
        meta: FieldMeta,
        dest: &'a mut T,
    ) -> Result<(), SchemaError> {
        let env_var = self.validate_leaf(name, &meta)?;
        let type_name = short_type_name(type_name::<T>());
        if !self.registry.contains::<T>() {
            return Err(self.error(name, SchemaErrorKind::Unsupported { type_name }));
        }
        self.fields.push(ConfigField::new(
            env_var,
            meta,
            type_name.clone(),
            Box::new(move |raw: &str, registry: &TypeRegistry| {
                match registry.convert::<T>(raw) {
                    Some(value) => *dest = value?,
                    None => {
                        return Err(ParseError::invalid(
                            raw,
                            format!("no converter registered for {type_name}"),
                        ));
                    }
                }
                Ok(())
            }),
        ));
        Ok(())
    }

    /// Recurse into a nested config struct, extending the prefix with `<NAME>_`
    pub fn nested<C: Config>(
        &mut self,
        name: &str,
        meta: FieldMeta,
        dest: &'a mut C,
    ) -> Result<(), SchemaError> {
        if meta.required {
            return Err(self.error(name, SchemaErrorKind::RequiredNested));
        }
        if meta.default.is_some() {
            return Err(self.error(name, SchemaErrorKind::DefaultOnNested));
        }

        let saved = self.prefix.len();
        self.prefix.push_str(&screaming_snake(name));
        self.prefix.push('_');
        self.path.push(name.to_string());

        let result = dest.visit(self);

        self.path.pop();
        self.prefix.truncate(saved);
        result
    }

    /// Pointer-like fields are never decoded into
    pub fn pointer(&mut self, name: &str, type_name: &str) -> Result<(), SchemaError> {
        Err(self.error(
            name,
            SchemaErrorKind::Pointer {
                type_name: type_name.to_string(),
            },
        ))
    }

    pub fn fields(&self) -> &[ConfigField<'a>] {
        &self.fields
    }

    pub(crate) fn into_parts(self) -> (Vec<ConfigField<'a>>, TypeRegistry) {
        (self.fields, self.registry)
    }

    fn validate_leaf(&self, name: &str, meta: &FieldMeta) -> Result<String, SchemaError> {
        if let Some(default) = &meta.default {
            if default.is_empty() {
                return Err(self.error(name, SchemaErrorKind::EmptyDefault));
            }
            if meta.required {
                return Err(self.error(name, SchemaErrorKind::RequiredWithDefault));
            }
        }
        Ok(format!("{}{}", self.prefix, screaming_snake(name)))
    }

    fn error(&self, name: &str, kind: SchemaErrorKind) -> SchemaError {
        let mut path = self.path.join(".");
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(name);
        SchemaError { path, kind }
    }
}
