//! Converters for field types keyed by `TypeId`.
//!
//! The process-wide registry is pre-populated with converters for
//! [`Duration`](std::time::Duration) and `DateTime<Utc>`. Register additional
//! converters during startup, before any decoding runs.

use crate::{
    convert::{parse_duration, parse_timestamp},
    error::{BoxError, ParseError},
    naming::short_type_name,
};
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};
use tracing::debug;

type Converter = Arc<dyn Fn(&str) -> Result<Box<dyn Any + Send>, BoxError> + Send + Sync>;

static GLOBAL: LazyLock<RwLock<TypeRegistry>> =
    LazyLock::new(|| RwLock::new(TypeRegistry::with_builtins()));

#[derive(Clone, Default)]
pub struct TypeRegistry {
    converters: HashMap<TypeId, (&'static str, Converter)>,
}

impl TypeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the duration and timestamp converters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(parse_duration);
        registry.register(parse_timestamp);
        registry
    }

    /// Snapshot of the process-wide registry
    pub fn global() -> Self {
        GLOBAL
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Add a converter for `T`, replacing any previous one
    pub fn register<T, E, F>(&mut self, parser: F)
    where
        T: Any + Send,
        E: Into<BoxError>,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        let converter: Converter = Arc::new(move |raw: &str| {
            parser(raw)
                .map(|value| Box::new(value) as Box<dyn Any + Send>)
                .map_err(Into::into)
        });
        self.converters
            .insert(TypeId::of::<T>(), (type_name::<T>(), converter));
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.converters.contains_key(&TypeId::of::<T>())
    }

    /// Run the converter for `T`, or `None` when there is none
    pub fn convert<T: Any>(&self, raw: &str) -> Option<Result<T, ParseError>> {
        let (name, converter) = self.converters.get(&TypeId::of::<T>())?;
        let result = converter(raw).map_err(ParseError::Custom).and_then(|value| {
            value.downcast::<T>().map(|value| *value).map_err(|_| {
                ParseError::invalid(raw, format!("converter for {name} returned another type"))
            })
        });
        Some(result)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .converters
            .values()
            .map(|(name, _)| short_type_name(name))
            .collect();
        names.sort();
        f.debug_struct("TypeRegistry")
            .field("types", &names)
            .finish()
    }
}

/// Register a converter for `T` in the process-wide registry.
///
/// Decoders snapshot the registry when they start, so register during startup.
pub fn register<T, E, F>(parser: F)
where
    T: Any + Send,
    E: Into<BoxError>,
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
{
    debug!(type_name = type_name::<T>(), "registering config converter");
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(parser);
}
