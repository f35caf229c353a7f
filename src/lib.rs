//! Decode typed configuration structs from environment variables.
//!
//! Derive [`Config`] on a struct, then decode it from any [`Source`]. Field names
//! map to `SCREAMING_SNAKE_CASE` variable names, nested structs extend the name
//! with their own field name, and every failing variable is reported together.
//!
//! ```rust
//! use envdecode::{Config, MapEnv};
//!
//! #[derive(Debug, Default, Config)]
//! pub struct ServerConfig {
//!     #[field(default = "127.0.0.1:8080")]
//!     pub bind_addr: String,
//!     #[field(required)]
//!     pub database_url: String,
//!     #[field(nested)]
//!     pub pool: PoolConfig,
//! }
//!
//! #[derive(Debug, Default, Config)]
//! pub struct PoolConfig {
//!     #[field(default = "10")]
//!     pub max_size: u32,
//! }
//!
//! let env = MapEnv::from([
//!     ("APP_DATABASE_URL", "postgres://localhost/app"),
//!     ("APP_POOL_MAX_SIZE", "0x20"),
//! ]);
//! let config: ServerConfig = envdecode::decode(&env, "APP_").unwrap();
//! assert_eq!(config.bind_addr, "127.0.0.1:8080");
//! assert_eq!(config.pool.max_size, 32);
//! ```

// Lets the derive's `::envdecode::` paths resolve inside this crate's own tests.
extern crate self as envdecode;

pub mod bsize;
pub mod convert;
pub mod decoder;
pub mod docs;
pub mod error;
pub mod field;
pub mod macros;
pub mod naming;
pub mod registry;
pub mod source;
pub mod value;
pub mod walker;

pub use bsize::ByteSize;
pub use decoder::{Decoder, decode};
pub use docs::{FieldInfo, describe};
pub use error::{
    BoxError, ConfigValueError, DecodeError, ParseError, SchemaError, SchemaErrorKind,
    SourceError, ValueErrorKind, ValueErrors, format_config_errors,
};
pub use field::{ConfigField, FieldMeta};
pub use registry::{TypeRegistry, register};
pub use source::{FallbackEnv, FileEnv, MapEnv, OsEnv, Source, TrackingSource};
pub use value::EnvValue;
pub use walker::Walker;

// Re-export macro
pub use envdecode_macros::Config;

/// A struct that can be decoded from environment variables.
///
/// Normally implemented with `#[derive(Config)]`; a manual implementation calls
/// one [`Walker`] method per field, in declaration order.
pub trait Config: Default {
    /// Prefix prepended to every variable name by [`Config::load`]
    const PREFIX: &'static str = "";

    /// Register every field of `self` with the walker
    fn visit<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), SchemaError>;

    /// Load configuration from `.env` and the process environment, panicking on errors
    fn load() -> Self {
        match Self::load_or_error() {
            Ok(config) => config,
            Err(DecodeError::Values(errors)) => panic!("{}", format_config_errors(&errors)),
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`Config::load`], but returns errors instead of panicking
    fn load_or_error() -> Result<Self, DecodeError> {
        let _ = dotenvy::dotenv();
        Decoder::new(OsEnv).prefix(Self::PREFIX).report(false).decode()
    }
}
