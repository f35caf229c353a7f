use crate::{error::ParseError, registry::TypeRegistry};
use std::fmt;

/// Per-field policy attached by `#[field(...)]` or passed to [`Walker`](crate::Walker) by hand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    /// Whether decoding fails when the variable is absent
    pub required: bool,
    /// Literal used when the variable is absent
    pub default: Option<String>,
    /// Human-readable description used in generated docs
    pub doc: String,
}

impl FieldMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }
}

pub(crate) type Setter<'a> = Box<dyn FnMut(&str, &TypeRegistry) -> Result<(), ParseError> + 'a>;

/// One leaf field flattened out of a config struct.
///
/// Holds a setter that writes into the destination field, so it only lives for
/// a single decode call.
pub struct ConfigField<'a> {
    /// Fully qualified variable name, prefix included
    pub env_var: String,
    pub default: Option<String>,
    pub required: bool,
    pub doc: String,
    /// Short type name, e.g. `Vec<u16>`
    pub type_name: String,
    setter: Setter<'a>,
}

impl<'a> ConfigField<'a> {
    pub(crate) fn new(
        env_var: String,
        meta: FieldMeta,
        type_name: String,
        setter: Setter<'a>,
    ) -> Self {
        Self {
            env_var,
            default: meta.default,
            required: meta.required,
            doc: meta.doc,
            type_name,
            setter,
        }
    }

    /// Parse `raw` and write it into the destination field
    pub fn set(&mut self, raw: &str, registry: &TypeRegistry) -> Result<(), ParseError> {
        (self.setter)(raw, registry)
    }
}

impl fmt::Debug for ConfigField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigField")
            .field("env_var", &self.env_var)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
