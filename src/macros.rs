// Declarative helpers for implementing `EnvValue`.

/// Implement [`EnvValue`](crate::EnvValue) for types that already implement `FromStr`.
///
/// ```rust
/// use std::str::FromStr;
///
/// #[derive(Debug, Default, PartialEq)]
/// pub enum Mode {
///     #[default]
///     Dev,
///     Prod,
/// }
///
/// impl FromStr for Mode {
///     type Err = String;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         match s {
///             "dev" => Ok(Self::Dev),
///             "prod" => Ok(Self::Prod),
///             _ => Err(format!("expected 'dev' or 'prod', got {s:?}")),
///         }
///     }
/// }
///
/// envdecode::impl_env_value_from_str!(Mode);
///
/// use envdecode::EnvValue;
/// assert_eq!(Mode::parse_env("prod").unwrap(), Mode::Prod);
/// ```
#[macro_export]
macro_rules! impl_env_value_from_str {
    ($($t:ty),+ $(,)?) => {$(
        impl $crate::EnvValue for $t {
            fn parse_env(raw: &str) -> ::core::result::Result<Self, $crate::ParseError> {
                <$t as ::core::str::FromStr>::from_str(raw)
                    .map_err(|err| $crate::ParseError::invalid(raw, err.to_string()))
            }
        }
    )+};
}
