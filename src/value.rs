use crate::{
    convert::{parse_bool, parse_duration, parse_timestamp, split_radix},
    error::ParseError,
    impl_env_value_from_str,
    registry::TypeRegistry,
};
use chrono::{DateTime, Utc};
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

/// A type that can be parsed from the raw string of one environment variable.
///
/// Implement this for your own types to use them as config fields. A converter
/// registered for the same type in the [`TypeRegistry`] takes precedence.
pub trait EnvValue: Sized + 'static {
    fn parse_env(raw: &str) -> Result<Self, ParseError>;

    /// Parse `raw`, preferring a converter registered for `Self`
    fn decode_with(raw: &str, registry: &TypeRegistry) -> Result<Self, ParseError> {
        match registry.convert::<Self>(raw) {
            Some(result) => result,
            None => Self::parse_env(raw),
        }
    }
}

impl EnvValue for bool {
    fn parse_env(raw: &str) -> Result<Self, ParseError> {
        parse_bool(raw)
    }
}

impl EnvValue for String {
    fn parse_env(raw: &str) -> Result<Self, ParseError> {
        Ok(raw.to_string())
    }
}

macro_rules! impl_env_value_int {
    ($($t:ty),+) => {$(
        impl EnvValue for $t {
            fn parse_env(raw: &str) -> Result<Self, ParseError> {
                let (sign, digits, radix) = split_radix(raw);
                if digits.starts_with(['+', '-']) {
                    return Err(ParseError::invalid(raw, "invalid syntax"));
                }
                <$t>::from_str_radix(&format!("{sign}{digits}"), radix).map_err(|source| {
                    ParseError::Int {
                        value: raw.to_string(),
                        source,
                    }
                })
            }
        }
    )+};
}

impl_env_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_env_value_float {
    ($($t:ty),+) => {$(
        impl EnvValue for $t {
            fn parse_env(raw: &str) -> Result<Self, ParseError> {
                let value = raw.parse::<$t>().map_err(|source| ParseError::Float {
                    value: raw.to_string(),
                    source,
                })?;
                if value.is_finite() || is_non_finite_literal(raw) {
                    Ok(value)
                } else {
                    Err(ParseError::invalid(raw, "value out of range"))
                }
            }
        }
    )+};
}

/// `inf`, `infinity` and `nan` in any case, optionally signed
fn is_non_finite_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|literal| unsigned.eq_ignore_ascii_case(literal))
}

impl_env_value_float!(f32, f64);

/// Comma separated list. There is no escaping, elements cannot contain commas.
impl<T: EnvValue> EnvValue for Vec<T> {
    fn parse_env(raw: &str) -> Result<Self, ParseError> {
        split_elements(raw, T::parse_env)
    }

    fn decode_with(raw: &str, registry: &TypeRegistry) -> Result<Self, ParseError> {
        match registry.convert::<Self>(raw) {
            Some(result) => result,
            None => split_elements(raw, |part| T::decode_with(part, registry)),
        }
    }
}

fn split_elements<T>(
    raw: &str,
    mut parse: impl FnMut(&str) -> Result<T, ParseError>,
) -> Result<Vec<T>, ParseError> {
    raw.split(',')
        .enumerate()
        .map(|(index, part)| {
            parse(part).map_err(|source| ParseError::Element {
                index,
                value: part.to_string(),
                source: Box::new(source),
            })
        })
        .collect()
}

/// A missing variable leaves the field `None`
impl<T: EnvValue> EnvValue for Option<T> {
    fn parse_env(raw: &str) -> Result<Self, ParseError> {
        T::parse_env(raw).map(Some)
    }

    fn decode_with(raw: &str, registry: &TypeRegistry) -> Result<Self, ParseError> {
        match registry.convert::<Self>(raw) {
            Some(result) => result,
            None => T::decode_with(raw, registry).map(Some),
        }
    }
}

impl EnvValue for Duration {
    fn parse_env(raw: &str) -> Result<Self, ParseError> {
        parse_duration(raw)
    }
}

impl EnvValue for DateTime<Utc> {
    fn parse_env(raw: &str) -> Result<Self, ParseError> {
        parse_timestamp(raw)
    }
}

impl_env_value_from_str!(PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);
