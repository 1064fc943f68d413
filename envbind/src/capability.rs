//! Extension points a field type may implement to control how it is bound.
//!
//! A type can implement any number of these. When more than one applies the
//! binder picks in this order: a named setter from the tag, [`Scan`], the
//! decoder named by `parser=`, then [`UnmarshalText`] and [`UnmarshalJson`]
//! as silent fallbacks before built-in coercion.
//!
//! `Option<T>` picks up every capability of a default-constructible `T`.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::coerce::{Coerce, CoerceError};

/// Populate a value from the resolved raw string.
///
/// Scan replaces every other mechanism for the field and runs even when the
/// resolved string is empty.
///
/// ```rust
/// use envbind::Scan;
///
/// #[derive(Debug, Default)]
/// struct LogLevel(u8);
///
/// impl Scan for LogLevel {
///     fn scan(&mut self, raw: &str) -> anyhow::Result<()> {
///         self.0 = match raw {
///             "" | "info" => 2,
///             "debug" => 1,
///             other => anyhow::bail!("unknown log level: {other}"),
///         };
///         Ok(())
///     }
/// }
/// ```
pub trait Scan {
    fn scan(&mut self, raw: &str) -> anyhow::Result<()>;
}

/// Decode a value from its textual form.
pub trait UnmarshalText {
    fn unmarshal_text(&mut self, text: &[u8]) -> anyhow::Result<()>;
}

/// Decode a value from JSON.
pub trait UnmarshalJson {
    fn unmarshal_json(&mut self, data: &[u8]) -> anyhow::Result<()>;
}

pub type ScanFn<T> = fn(&mut T, &str) -> anyhow::Result<()>;
pub type UnmarshalFn<T> = fn(&mut T, &[u8]) -> anyhow::Result<()>;
pub type CoerceFn<T> = fn(&str) -> Result<T, CoerceError>;
pub type DecodeFn<T> = fn(&str) -> anyhow::Result<T>;

/// Capabilities detected on a field type.
///
/// Filled in by `#[derive(EnvBind)]`; each entry is `None` when the type does
/// not implement the corresponding trait.
pub struct Capabilities<T> {
    pub scan: Option<ScanFn<T>>,
    pub text: Option<UnmarshalFn<T>>,
    pub json: Option<UnmarshalFn<T>>,
    /// Comma-separated sequence of [`Scan`] elements.
    pub scan_sequence: Option<CoerceFn<T>>,
    /// Comma-separated sequence of [`UnmarshalText`] elements.
    pub text_sequence: Option<DecodeFn<T>>,
    /// Comma-separated sequence of [`UnmarshalJson`] elements.
    pub json_sequence: Option<DecodeFn<T>>,
    /// Built-in [`Coerce`](crate::Coerce) rule.
    pub coerce: Option<CoerceFn<T>>,
}

impl<T> Capabilities<T> {
    /// No capabilities at all.
    pub const fn none() -> Self {
        Self {
            scan: None,
            text: None,
            json: None,
            scan_sequence: None,
            text_sequence: None,
            json_sequence: None,
            coerce: None,
        }
    }
}

impl<T> Default for Capabilities<T> {
    fn default() -> Self {
        Self::none()
    }
}

/// An empty string leaves the value as it is, so an unresolved field stays
/// `None`.
impl<T: Scan + Default> Scan for Option<T> {
    fn scan(&mut self, raw: &str) -> anyhow::Result<()> {
        if raw.is_empty() {
            return Ok(());
        }
        let mut value = T::default();
        value.scan(raw)?;
        *self = Some(value);
        Ok(())
    }
}

impl<T: UnmarshalText + Default> UnmarshalText for Option<T> {
    fn unmarshal_text(&mut self, text: &[u8]) -> anyhow::Result<()> {
        let mut value = T::default();
        value.unmarshal_text(text)?;
        *self = Some(value);
        Ok(())
    }
}

impl<T: UnmarshalJson + Default> UnmarshalJson for Option<T> {
    fn unmarshal_json(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let mut value = T::default();
        value.unmarshal_json(data)?;
        *self = Some(value);
        Ok(())
    }
}

/// JSON-encoded value decoded with `serde_json`.
///
/// ```rust
/// use std::collections::HashMap;
/// use envbind::{EnvBind, Json};
///
/// #[derive(Default, EnvBind)]
/// struct Config {
///     #[env("LABELS,parser=json")]
///     pub labels: Json<HashMap<String, String>>,
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned> UnmarshalJson for Json<T> {
    fn unmarshal_json(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.0 = serde_json::from_slice(data)?;
        Ok(())
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

/// Any `FromStr` type, decoded as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed<T>(pub T);

impl<T> UnmarshalText for Parsed<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fn unmarshal_text(&mut self, text: &[u8]) -> anyhow::Result<()> {
        self.0 = std::str::from_utf8(text)?.parse()?;
        Ok(())
    }
}

/// Lets `Parsed<T>` take part in sequences and options even when `T` has no
/// default value.
impl<T> Coerce for Parsed<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        raw.parse().map(Parsed).map_err(CoerceError::parse)
    }
}

impl<T> Deref for Parsed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Parsed<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

// These have no default value, so they also carry a `Coerce` rule for use
// inside `Vec` and `Option`.
macro_rules! text_via_from_str {
    ($($ty:ty),* $(,)?) => {$(
        impl UnmarshalText for $ty {
            fn unmarshal_text(&mut self, text: &[u8]) -> anyhow::Result<()> {
                *self = std::str::from_utf8(text)?.parse()?;
                Ok(())
            }
        }

        impl Coerce for $ty {
            fn coerce(raw: &str) -> Result<Self, CoerceError> {
                raw.parse().map_err(CoerceError::parse)
            }
        }
    )*};
}

text_via_from_str!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, PathBuf);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_json_wrapper() {
        let mut value: Json<HashMap<String, u32>> = Json::default();
        value.unmarshal_json(br#"{"a":1,"b":2}"#).unwrap();
        assert_eq!(value.get("a"), Some(&1));
        assert_eq!(value.len(), 2);

        assert!(value.unmarshal_json(b"not json").is_err());
    }

    #[test]
    fn test_parsed_wrapper() {
        let mut value: Parsed<u16> = Parsed::default();
        value.unmarshal_text(b"8080").unwrap();
        assert_eq!(*value, 8080);

        assert!(value.unmarshal_text(b"eighty").is_err());
    }

    #[test]
    fn test_std_text_types() {
        let mut addr = IpAddr::from([0, 0, 0, 0]);
        addr.unmarshal_text(b"10.0.0.1").unwrap();
        assert_eq!(addr, IpAddr::from([10, 0, 0, 1]));

        let mut socket: SocketAddr = "0.0.0.0:0".parse().unwrap();
        socket.unmarshal_text(b"127.0.0.1:8080").unwrap();
        assert_eq!(socket.port(), 8080);

        let mut path = PathBuf::new();
        path.unmarshal_text(b"/var/run/app.sock").unwrap();
        assert_eq!(path, PathBuf::from("/var/run/app.sock"));
    }

    #[test]
    fn test_std_text_types_coerce() {
        assert_eq!(IpAddr::coerce("::1").unwrap(), IpAddr::from([0, 0, 0, 0, 0, 0, 0, 1]));
        assert_eq!(Ipv4Addr::coerce("10.1.2.3").unwrap(), Ipv4Addr::new(10, 1, 2, 3));

        let err = SocketAddr::coerce("localhost").unwrap_err();
        assert!(matches!(err, CoerceError::Parse { .. }));
    }

    #[test]
    fn test_parsed_coerce() {
        let value = Parsed::<IpAddr>::coerce("192.168.0.1").unwrap();
        assert_eq!(*value, IpAddr::from([192, 168, 0, 1]));

        assert!(Parsed::<u8>::coerce("256").is_err());
    }

    #[derive(Debug, Default, PartialEq)]
    struct Port(u16);

    impl Scan for Port {
        fn scan(&mut self, raw: &str) -> anyhow::Result<()> {
            self.0 = raw.parse()?;
            Ok(())
        }
    }

    #[test]
    fn test_option_scan() {
        let mut value: Option<Port> = None;
        value.scan("").unwrap();
        assert_eq!(value, None);

        value.scan("8080").unwrap();
        assert_eq!(value, Some(Port(8080)));

        assert!(value.scan("http").is_err());
        assert_eq!(value, Some(Port(8080)));
    }

    #[test]
    fn test_option_unmarshalers() {
        let mut port: Option<Parsed<u16>> = None;
        port.unmarshal_text(b"443").unwrap();
        assert_eq!(port, Some(Parsed(443)));

        let mut labels: Option<Json<HashMap<String, String>>> = None;
        labels.unmarshal_json(br#"{"env":"prod"}"#).unwrap();
        assert_eq!(labels.unwrap().get("env").map(String::as_str), Some("prod"));

        let mut missing: Option<Json<Vec<u8>>> = None;
        assert!(missing.unmarshal_json(b"[1,").is_err());
        assert!(missing.is_none());
    }
}
