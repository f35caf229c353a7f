//! Byte sizes with binary unit suffixes, e.g. `512`, `4KiB` or `1.5GiB` when printed.

use crate::{error::ParseError, value::EnvValue};
use std::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct ByteSize(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ByteSizeError {
    #[error("input {0:?} does not match format: digits with an optional B/KiB/MiB/GiB/TiB/PiB")]
    Format(String),
    #[error("parsing {value:?}: {source}")]
    Int {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("size {0} overflows u64")]
    Overflow(String),
}

const UNITS: [(&str, ByteSize); 4] = [
    ("KiB", ByteSize::KIB),
    ("MiB", ByteSize::MIB),
    ("GiB", ByteSize::GIB),
    ("TiB", ByteSize::TIB),
];

impl ByteSize {
    pub const B: ByteSize = ByteSize(1);
    pub const KIB: ByteSize = ByteSize(1 << 10);
    pub const MIB: ByteSize = ByteSize(1 << 20);
    pub const GIB: ByteSize = ByteSize(1 << 30);
    pub const TIB: ByteSize = ByteSize(1 << 40);
    pub const PIB: ByteSize = ByteSize(1 << 50);

    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Parse a number with an optional unit suffix, e.g. `1024` or `4KiB`
    pub fn parse(s: &str) -> Result<Self, ByteSizeError> {
        let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, suffix) = s.split_at(digits_end);
        if digits.is_empty() {
            return Err(ByteSizeError::Format(s.to_string()));
        }

        let unit = match suffix {
            "" | "B" => Self::B,
            "KiB" => Self::KIB,
            "MiB" => Self::MIB,
            "GiB" => Self::GIB,
            "TiB" => Self::TIB,
            "PiB" => Self::PIB,
            _ => return Err(ByteSizeError::Format(s.to_string())),
        };

        let n: u64 = digits.parse().map_err(|source| ByteSizeError::Int {
            value: s.to_string(),
            source,
        })?;
        n.checked_mul(unit.0)
            .map(ByteSize)
            .ok_or_else(|| ByteSizeError::Overflow(s.to_string()))
    }
}

/// Formats with at most one decimal digit, dropped when zero: `1.5GiB`, `2MiB`, `512B`
impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self < Self::KIB {
            return write!(f, "{}B", self.0);
        }
        for (name, unit) in UNITS {
            if self.0 < unit.0 * 1024 {
                return write!(f, "{}{}", fmt_unit(self.0, unit.0), name);
            }
        }
        write!(f, "{}PiB", fmt_unit(self.0, Self::PIB.0))
    }
}

fn fmt_unit(v: u64, unit: u64) -> String {
    let whole = v / unit;
    let tenths = v % unit * 10 / unit;
    if tenths == 0 {
        whole.to_string()
    } else {
        format!("{whole}.{tenths}")
    }
}

impl FromStr for ByteSize {
    type Err = ByteSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl EnvValue for ByteSize {
    fn parse_env(raw: &str) -> Result<Self, ParseError> {
        Self::parse(raw).map_err(|err| ParseError::Custom(Box::new(err)))
    }
}

impl From<ByteSize> for u64 {
    fn from(size: ByteSize) -> Self {
        size.bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let cases = [
            ("0", 0),
            ("1", 1),
            ("1B", 1),
            ("1KiB", 1024),
            ("4MiB", 4 << 20),
            ("1TiB", 1 << 40),
            ("2PiB", 2 << 50),
        ];
        for (input, want) in cases {
            assert_eq!(ByteSize::parse(input).unwrap(), ByteSize(want), "{input}");
        }
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "asdf", "KiB", "1 KiB", "1kib", "1KB", "-1", "1.5MiB"] {
            assert!(
                matches!(ByteSize::parse(input), Err(ByteSizeError::Format(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        assert!(matches!(
            ByteSize::parse("18446744073709551616B"),
            Err(ByteSizeError::Int { .. })
        ));
        assert!(matches!(
            ByteSize::parse("18014398509481985KiB"),
            Err(ByteSizeError::Overflow(_))
        ));
        assert_eq!(
            ByteSize::parse("18446744073709551615").unwrap(),
            ByteSize(u64::MAX)
        );
    }

    #[test]
    fn test_display() {
        let cases = [
            (ByteSize(0), "0B"),
            (ByteSize(1), "1B"),
            (ByteSize(1023), "1023B"),
            (ByteSize::KIB, "1KiB"),
            (ByteSize(1337), "1.3KiB"),
            (ByteSize(1536), "1.5KiB"),
            (ByteSize(ByteSize::GIB.0 * 3 / 2), "1.5GiB"),
            (ByteSize::TIB, "1TiB"),
            (ByteSize(ByteSize::TIB.0 * 1024), "1PiB"),
            (ByteSize(u64::MAX), "16383.9PiB"),
        ];
        for (size, want) in cases {
            assert_eq!(size.to_string(), want);
        }
    }

    #[test]
    fn test_env_value() {
        assert_eq!(ByteSize::parse_env("16MiB").unwrap(), ByteSize(16 << 20));
        assert!(matches!(
            ByteSize::parse_env("16MB"),
            Err(ParseError::Custom(_))
        ));
        assert_eq!(u64::from("2KiB".parse::<ByteSize>().unwrap()), 2048);
        assert_eq!(ByteSize::MIB.bytes(), 1 << 20);
    }
}
