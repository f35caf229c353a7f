use crate::{
    Config,
    error::{ConfigValueError, DecodeError, ValueErrorKind, ValueErrors, format_config_errors},
    field::ConfigField,
    registry::TypeRegistry,
    source::{Source, TrackingSource},
    walker::Walker,
};
use tracing::{debug, trace, warn};

/// Decode `T` from `source`, prepending `prefix` verbatim to every variable name
///
/// # Example
/// ```rust
/// use envdecode::{Config, MapEnv, decode};
///
/// #[derive(Debug, Default, Config)]
/// pub struct Settings {
///     #[field(default = "a")]
///     pub a: String,
///     #[field(required)]
///     pub b: String,
/// }
///
/// let settings: Settings = decode(MapEnv::from([("B", "b")]), "").unwrap();
/// assert_eq!(settings.a, "a");
/// ```
pub fn decode<T: Config, S: Source>(source: S, prefix: &str) -> Result<T, DecodeError> {
    Decoder::new(source).prefix(prefix).decode()
}

/// Decoder with options beyond the plain [`decode`] call
///
/// # Example
/// ```rust
/// use envdecode::{Config, Decoder, DecodeError, MapEnv};
///
/// #[derive(Debug, Default, Config)]
/// pub struct Settings {
///     #[field(default = "a")]
///     pub a: String,
/// }
///
/// let result = Decoder::new(MapEnv::from([("PFX_B", "b")]))
///     .prefix("PFX_")
///     .deny_unused(true)
///     .decode::<Settings>();
/// assert!(matches!(result, Err(DecodeError::Unused(_))));
/// ```
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
    prefix: String,
    registry: Option<TypeRegistry>,
    deny_unused: bool,
    report: bool,
}

impl<S: Source> Decoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            prefix: String::new(),
            registry: None,
            deny_unused: false,
            report: true,
        }
    }

    /// Prefix prepended verbatim, separator included, e.g. `"APP_"`
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Use these converters instead of a snapshot of the process-wide registry
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Fail when the source defines prefixed variables the config never reads
    pub fn deny_unused(mut self, deny: bool) -> Self {
        self.deny_unused = deny;
        self
    }

    /// Echo value errors to stderr before returning them (on by default)
    pub fn report(mut self, report: bool) -> Self {
        self.report = report;
        self
    }

    /// Decode a fresh `T`.
    ///
    /// Schema errors abort before any variable is read. Value errors are collected
    /// for every field and returned together; the partially written value is dropped.
    pub fn decode<T: Config>(&self) -> Result<T, DecodeError> {
        let registry = self
            .registry
            .clone()
            .unwrap_or_else(TypeRegistry::global);
        let source = TrackingSource::new(&self.source);
        let mut config = T::default();

        {
            let mut walker = Walker::new(&self.prefix, registry);
            config.visit(&mut walker)?;
            let (fields, registry) = walker.into_parts();
            debug!(
                prefix = %self.prefix,
                fields = fields.len(),
                "decoding configuration"
            );

            let errors = execute(fields, &source, &registry);
            if !errors.is_empty() {
                debug!(errors = errors.len(), "configuration has invalid values");
                if self.report {
                    eprint!("{}", format_config_errors(&errors));
                }
                return Err(DecodeError::Values(ValueErrors(errors)));
            }
        }

        if self.deny_unused {
            let mut unused: Vec<String> = source
                .unfetched()
                .into_iter()
                .filter(|name| name.starts_with(&self.prefix))
                .collect();
            if !unused.is_empty() {
                unused.sort();
                warn!(unused = ?unused, "environment defines variables the config does not use");
                return Err(DecodeError::Unused(unused));
            }
        }

        debug!(prefix = %self.prefix, "configuration decoded");
        Ok(config)
    }
}

/// Apply every field against the source, collecting one error per failing field
fn execute(
    fields: Vec<ConfigField<'_>>,
    source: &impl Source,
    registry: &TypeRegistry,
) -> Vec<ConfigValueError> {
    let mut errors = Vec::new();

    for mut field in fields {
        trace!(env_var = %field.env_var, "reading variable");

        match source.get(&field.env_var).filter(|value| !value.is_empty()) {
            Some(value) => {
                if let Err(err) = field.set(&value, registry) {
                    errors.push(ConfigValueError::new(
                        field.env_var,
                        ValueErrorKind::Invalid(err),
                    ));
                }
            }
            None if field.required => {
                errors.push(ConfigValueError::new(field.env_var, ValueErrorKind::Required));
            }
            None => {
                // No default means the field keeps its `Default` value
                let Some(default) = field.default.take() else {
                    continue;
                };
                if let Err(err) = field.set(&default, registry) {
                    errors.push(ConfigValueError::new(
                        field.env_var,
                        ValueErrorKind::Default {
                            default,
                            source: err,
                        },
                    ));
                }
            }
        }
    }

    errors
}
