//! Built-in conversion of raw strings into field values.
//!
//! Every supported scalar type maps to one [`Kind`]. [`Kind::parse`] is the
//! single place where raw strings are interpreted; [`Coerce`] impls only
//! narrow the resulting [`Scalar`] to the concrete field type.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};

use crate::capability::{Scan, UnmarshalJson, UnmarshalText};

/// The closed set of value kinds the engine knows how to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Int { bits: u32 },
    Uint { bits: u32 },
    Float { bits: u32 },
    Bool,
    Complex { bits: u32 },
    Duration,
    Timestamp,
}

/// A parsed value, widened to the largest representation of its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Complex(Complex<f64>),
    Duration(Duration),
    Timestamp(DateTime<FixedOffset>),
}

/// Failure of built-in coercion, before field context is attached.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoerceError {
    /// The raw string does not parse as `kind`.
    #[error("{message}")]
    Invalid { kind: Kind, message: String },

    /// An element's [`Scan`] implementation failed.
    #[error("{message}")]
    Scan { message: String },

    /// The type's own parsing rule rejected the value.
    #[error("{message}")]
    Parse { message: String },
}

impl CoerceError {
    pub fn invalid(kind: Kind, message: impl fmt::Display) -> Self {
        Self::Invalid {
            kind,
            message: message.to_string(),
        }
    }

    pub fn parse(message: impl fmt::Display) -> Self {
        Self::Parse {
            message: message.to_string(),
        }
    }
}

impl Kind {
    /// Parse `raw` according to this kind's rule.
    pub fn parse(self, raw: &str) -> Result<Scalar, CoerceError> {
        match self {
            Kind::Text => Ok(Scalar::Text(raw.to_string())),
            Kind::Int { bits } => {
                let value: i64 = raw.parse().map_err(|e| CoerceError::invalid(self, e))?;
                let (min, max) = signed_range(bits);
                if !(min..=max).contains(&i128::from(value)) {
                    return Err(CoerceError::invalid(
                        self,
                        format!("value out of range for {bits}-bit integer"),
                    ));
                }
                Ok(Scalar::Int(value))
            }
            Kind::Uint { bits } => {
                if raw.starts_with('+') {
                    return Err(CoerceError::invalid(self, "invalid digit found in string"));
                }
                let value: u64 = raw.parse().map_err(|e| CoerceError::invalid(self, e))?;
                if bits < 64 && value >> bits != 0 {
                    return Err(CoerceError::invalid(
                        self,
                        format!("value out of range for {bits}-bit unsigned integer"),
                    ));
                }
                Ok(Scalar::Uint(value))
            }
            Kind::Float { bits } => parse_float(raw, bits)
                .map(Scalar::Float)
                .ok_or_else(|| CoerceError::invalid(self, "invalid float literal")),
            Kind::Bool => parse_bool(raw)
                .map(Scalar::Bool)
                .ok_or_else(|| CoerceError::invalid(self, "expected one of 1, t, true, 0, f, false")),
            Kind::Complex { bits } => parse_complex(raw, bits)
                .map(Scalar::Complex)
                .ok_or_else(|| CoerceError::invalid(self, "expected a complex number like 1+2i")),
            Kind::Duration => humantime::parse_duration(raw)
                .map(Scalar::Duration)
                .map_err(|e| CoerceError::invalid(self, e)),
            Kind::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(Scalar::Timestamp)
                .map_err(|e| CoerceError::invalid(self, e)),
        }
    }
}

fn signed_range(bits: u32) -> (i128, i128) {
    let max = (1i128 << (bits - 1)) - 1;
    (-max - 1, max)
}

fn parse_float(raw: &str, bits: u32) -> Option<f64> {
    if bits == 32 {
        raw.parse::<f32>().ok().map(f64::from)
    } else {
        raw.parse::<f64>().ok()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse `a`, `bi`, `a+bi` or `a-bi`, optionally wrapped in parentheses.
fn parse_complex(raw: &str, bits: u32) -> Option<Complex<f64>> {
    let s = raw
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(raw);

    let Some(body) = s.strip_suffix('i') else {
        return Some(Complex::new(parse_float(s, bits)?, 0.0));
    };

    // Split at the last sign that is neither leading nor part of an exponent.
    let split = body
        .char_indices()
        .filter(|&(i, c)| {
            (c == '+' || c == '-') && i > 0 && !matches!(body.as_bytes()[i - 1], b'e' | b'E')
        })
        .map(|(i, _)| i)
        .last();

    let (re, im) = match split {
        Some(i) => (parse_float(&body[..i], bits)?, &body[i..]),
        None => (0.0, body),
    };
    let im = match im {
        "" | "+" => 1.0,
        "-" => -1.0,
        digits => parse_float(digits, bits)?,
    };
    Some(Complex::new(re, im))
}

/// Rectangular complex number.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;

impl<T> Complex<T> {
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T: fmt::Display + PartialOrd + Default> fmt::Display for Complex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < T::default() {
            write!(f, "({}{}i)", self.re, self.im)
        } else {
            write!(f, "({}+{}i)", self.re, self.im)
        }
    }
}

/// Conversion from a raw, non-empty string into a field value.
///
/// Implemented for the scalar types the engine supports and for `Vec<T>` and
/// `Option<T>` of those. Implement it for your own type to give it a built-in
/// rule that takes part in sequences.
pub trait Coerce: Sized {
    fn coerce(raw: &str) -> Result<Self, CoerceError>;
}

macro_rules! coerce_via_kind {
    ($($ty:ty => $kind:expr, $variant:ident($value:ident) => $convert:expr;)*) => {$(
        impl Coerce for $ty {
            fn coerce(raw: &str) -> Result<Self, CoerceError> {
                let kind = $kind;
                match kind.parse(raw)? {
                    Scalar::$variant($value) => $convert
                        .ok_or_else(|| CoerceError::invalid(kind, "value out of range")),
                    _ => Err(CoerceError::invalid(kind, "parsed value has the wrong kind")),
                }
            }
        }
    )*};
}

coerce_via_kind! {
    String => Kind::Text, Text(v) => Some(v);
    i8 => Kind::Int { bits: 8 }, Int(v) => Self::try_from(v).ok();
    i16 => Kind::Int { bits: 16 }, Int(v) => Self::try_from(v).ok();
    i32 => Kind::Int { bits: 32 }, Int(v) => Self::try_from(v).ok();
    i64 => Kind::Int { bits: 64 }, Int(v) => Some(v);
    isize => Kind::Int { bits: isize::BITS }, Int(v) => Self::try_from(v).ok();
    u8 => Kind::Uint { bits: 8 }, Uint(v) => Self::try_from(v).ok();
    u16 => Kind::Uint { bits: 16 }, Uint(v) => Self::try_from(v).ok();
    u32 => Kind::Uint { bits: 32 }, Uint(v) => Self::try_from(v).ok();
    u64 => Kind::Uint { bits: 64 }, Uint(v) => Some(v);
    usize => Kind::Uint { bits: usize::BITS }, Uint(v) => Self::try_from(v).ok();
    f32 => Kind::Float { bits: 32 }, Float(v) => Some(v as f32);
    f64 => Kind::Float { bits: 64 }, Float(v) => Some(v);
    bool => Kind::Bool, Bool(v) => Some(v);
    Complex32 => Kind::Complex { bits: 32 }, Complex(v) => Some(Complex::new(v.re as f32, v.im as f32));
    Complex64 => Kind::Complex { bits: 64 }, Complex(v) => Some(v);
    Duration => Kind::Duration, Duration(v) => Some(v);
    DateTime<FixedOffset> => Kind::Timestamp, Timestamp(v) => Some(v);
    DateTime<Utc> => Kind::Timestamp, Timestamp(v) => Some(v.with_timezone(&Utc));
}

/// Comma-separated sequence. Segments are not trimmed and empty segments are
/// coerced like any other.
impl<T: Coerce> Coerce for Vec<T> {
    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        raw.split(',').map(T::coerce).collect()
    }
}

/// A resolved value always produces `Some`; unresolved fields stay `None`.
impl<T: Coerce> Coerce for Option<T> {
    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        T::coerce(raw).map(Some)
    }
}

/// Comma-separated sequence of scan-capable elements.
///
/// Each element starts from `T::default()` and is handed its segment.
pub fn scan_sequence<T: Scan + Default>(raw: &str) -> Result<Vec<T>, CoerceError> {
    raw.split(',')
        .map(|segment| {
            let mut element = T::default();
            element
                .scan(segment)
                .map(|()| element)
                .map_err(|e| CoerceError::Scan {
                    message: format!("{e:#}"),
                })
        })
        .collect()
}

/// Comma-separated sequence decoded element by element with
/// [`UnmarshalText`].
pub fn text_sequence<T: UnmarshalText + Default>(raw: &str) -> anyhow::Result<Vec<T>> {
    raw.split(',')
        .map(|segment| {
            let mut element = T::default();
            element.unmarshal_text(segment.as_bytes())?;
            Ok(element)
        })
        .collect()
}

/// Comma-separated sequence decoded element by element with
/// [`UnmarshalJson`].
pub fn json_sequence<T: UnmarshalJson + Default>(raw: &str) -> anyhow::Result<Vec<T>> {
    raw.split(',')
        .map(|segment| {
            let mut element = T::default();
            element.unmarshal_json(segment.as_bytes())?;
            Ok(element)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_is_identity() {
        assert_eq!(String::coerce(" spaced, text ").unwrap(), " spaced, text ");
    }

    #[test]
    fn test_signed_integers_are_range_checked() {
        assert_eq!(i8::coerce("-128").unwrap(), -128);
        assert_eq!(i8::coerce("127").unwrap(), 127);
        assert!(matches!(
            i8::coerce("128"),
            Err(CoerceError::Invalid {
                kind: Kind::Int { bits: 8 },
                ..
            })
        ));
        assert_eq!(i64::coerce("-9223372036854775808").unwrap(), i64::MIN);
        assert_eq!(i32::coerce("+42").unwrap(), 42);
        assert!(i32::coerce("4.2").is_err());
        assert!(i16::coerce("").is_err());
    }

    #[test]
    fn test_unsigned_integers_are_range_checked() {
        assert_eq!(u8::coerce("255").unwrap(), 255);
        assert!(u8::coerce("256").is_err());
        assert!(matches!(
            u32::coerce("-1"),
            Err(CoerceError::Invalid {
                kind: Kind::Uint { bits: 32 },
                ..
            })
        ));
        assert_eq!(u64::coerce("18446744073709551615").unwrap(), u64::MAX);
        assert_eq!(usize::coerce("42").unwrap(), 42);
    }

    #[test]
    fn test_floats() {
        assert_eq!(f64::coerce("2.5").unwrap(), 2.5);
        assert_eq!(f64::coerce("1e3").unwrap(), 1000.0);
        assert_eq!(f32::coerce("0.1").unwrap(), 0.1f32);
        assert!(matches!(
            f64::coerce("pi"),
            Err(CoerceError::Invalid {
                kind: Kind::Float { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_bools() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(bool::coerce(raw).unwrap(), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!bool::coerce(raw).unwrap(), "{raw}");
        }
        assert!(bool::coerce("yes").is_err());
        assert!(bool::coerce("tRuE").is_err());
    }

    #[test]
    fn test_complex_forms() {
        assert_eq!(Complex64::coerce("1+2i").unwrap(), Complex::new(1.0, 2.0));
        assert_eq!(Complex64::coerce("1.5-0.5i").unwrap(), Complex::new(1.5, -0.5));
        assert_eq!(Complex64::coerce("(3+4i)").unwrap(), Complex::new(3.0, 4.0));
        assert_eq!(Complex64::coerce("2").unwrap(), Complex::new(2.0, 0.0));
        assert_eq!(Complex64::coerce("-2i").unwrap(), Complex::new(0.0, -2.0));
        assert_eq!(Complex64::coerce("1-i").unwrap(), Complex::new(1.0, -1.0));
        assert_eq!(Complex64::coerce("1e3+2e-1i").unwrap(), Complex::new(1000.0, 0.2));
        assert_eq!(Complex32::coerce("1+2i").unwrap(), Complex::new(1.0f32, 2.0f32));
        assert!(matches!(
            Complex64::coerce("invalid"),
            Err(CoerceError::Invalid {
                kind: Kind::Complex { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_complex_display_parses_back() {
        let value = Complex::new(1.5, -2.0);
        assert_eq!(Complex64::coerce(&value.to_string()).unwrap(), value);
    }

    #[test]
    fn test_durations() {
        assert_eq!(Duration::coerce("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(Duration::coerce("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(Duration::coerce("250ms").unwrap(), Duration::from_millis(250));
        assert!(matches!(
            Duration::coerce("soon"),
            Err(CoerceError::Invalid {
                kind: Kind::Duration,
                ..
            })
        ));
    }

    #[test]
    fn test_timestamps() {
        let ts = DateTime::<FixedOffset>::coerce("2024-01-02T03:04:05+09:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-02T03:04:05+09:00");

        let utc = DateTime::<Utc>::coerce("2024-01-02T03:04:05+09:00").unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 1, 1, 18, 4, 5).unwrap());

        assert!(matches!(
            DateTime::<Utc>::coerce("2024-01-02"),
            Err(CoerceError::Invalid {
                kind: Kind::Timestamp,
                ..
            })
        ));
    }

    #[test]
    fn test_formatted_values_parse_back() {
        assert_eq!(i64::coerce(&(-42i64).to_string()).unwrap(), -42);
        assert_eq!(u16::coerce(&u16::MAX.to_string()).unwrap(), u16::MAX);
        assert_eq!(f64::coerce(&0.1f64.to_string()).unwrap(), 0.1);
        assert!(bool::coerce(&true.to_string()).unwrap());
        let d = Duration::from_secs(3725);
        assert_eq!(Duration::coerce(&humantime::format_duration(d).to_string()).unwrap(), d);
    }

    #[test]
    fn test_sequences_split_on_comma() {
        assert_eq!(Vec::<i32>::coerce("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(
            Vec::<String>::coerce("a, b,,c").unwrap(),
            vec!["a", " b", "", "c"]
        );
        assert_eq!(
            Vec::<Duration>::coerce("1m,30s").unwrap(),
            vec![Duration::from_secs(60), Duration::from_secs(30)]
        );
    }

    #[test]
    fn test_sequence_fails_on_any_element() {
        assert!(matches!(
            Vec::<i32>::coerce("1,notanint,3"),
            Err(CoerceError::Invalid {
                kind: Kind::Int { .. },
                ..
            })
        ));
        // Empty segments are not skipped.
        assert!(Vec::<u8>::coerce("1,,3").is_err());
    }

    #[test]
    fn test_option_wraps_value() {
        assert_eq!(Option::<u16>::coerce("8080").unwrap(), Some(8080));
        assert!(Option::<u16>::coerce("x").is_err());
    }

    #[derive(Debug, Default, PartialEq)]
    struct Level(u8);

    impl Scan for Level {
        fn scan(&mut self, raw: &str) -> anyhow::Result<()> {
            self.0 = match raw {
                "low" => 1,
                "high" => 2,
                other => anyhow::bail!("unknown level {other}"),
            };
            Ok(())
        }
    }

    #[test]
    fn test_scan_sequence() {
        assert_eq!(
            scan_sequence::<Level>("low,high").unwrap(),
            vec![Level(1), Level(2)]
        );
        match scan_sequence::<Level>("low,mid") {
            Err(CoerceError::Scan { message }) => assert!(message.contains("mid")),
            other => panic!("Expected Scan error, got {other:?}"),
        }
    }

    #[test]
    fn test_unsigned_rejects_plus_sign() {
        assert!(matches!(
            u32::coerce("+5"),
            Err(CoerceError::Invalid {
                kind: Kind::Uint { bits: 32 },
                ..
            })
        ));
        assert!(Vec::<u8>::coerce("1,+2").is_err());
        assert_eq!(i32::coerce("+5").unwrap(), 5);
    }

    #[derive(Debug, Default, PartialEq)]
    struct Tag(String);

    impl UnmarshalText for Tag {
        fn unmarshal_text(&mut self, text: &[u8]) -> anyhow::Result<()> {
            let text = std::str::from_utf8(text)?;
            anyhow::ensure!(!text.is_empty(), "empty tag");
            self.0 = text.to_string();
            Ok(())
        }
    }

    impl UnmarshalJson for Tag {
        fn unmarshal_json(&mut self, data: &[u8]) -> anyhow::Result<()> {
            self.0 = serde_json::from_slice(data)?;
            Ok(())
        }
    }

    #[test]
    fn test_text_sequence() {
        assert_eq!(
            text_sequence::<Tag>("a,b").unwrap(),
            vec![Tag("a".to_string()), Tag("b".to_string())]
        );
        assert!(text_sequence::<Tag>("a,,b").is_err());
    }

    #[test]
    fn test_json_sequence() {
        assert_eq!(
            json_sequence::<Tag>(r#""x","y""#).unwrap(),
            vec![Tag("x".to_string()), Tag("y".to_string())]
        );
        assert!(json_sequence::<Tag>("x,y").is_err());
    }
}
