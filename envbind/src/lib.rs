//! Bind environment variables to struct fields through tag annotations
//!
//! `envbind` fills the fields of a struct from environment variables. Each
//! field opts in with an `#[env("...")]` tag naming the variable and its
//! options; `#[derive(EnvBind)]` generates the glue.
//!
//! # Features
//!
//! - **Tag driven**: `#[env("PORT,default=8080")]`, `#[env("KEY,required")]`
//! - **Nested structs**: fields whose type derives `EnvBind` are bound
//!   recursively, tagged or not
//! - **Built-in types**: strings, all integer and float widths, booleans,
//!   complex numbers, durations, RFC 3339 timestamps, network addresses,
//!   and comma-separated `Vec`s or `Option`s of any of those
//! - **Extension points**: [`Scan`], [`UnmarshalText`], [`UnmarshalJson`] and
//!   named [`Setters`]
//!
//! # Tag Grammar
//!
//! ```text
//! <KEY>[,required][,default=<value>][,setter=<name>][,parser=<text|json>]
//! ```
//!
//! - `required`: fail with [`BindError::MissingRequired`] when the variable
//!   is unset or empty and no default is given
//! - `default=<value>`: used when the variable is unset or empty
//! - `setter=<name>`: call the setter registered under `name` instead of
//!   converting the value
//! - `parser=text|json`: decode with [`UnmarshalText`] or [`UnmarshalJson`]
//!
//! A key of `_` never reads the environment; only a default can populate
//! such a field. A field whose variable is unset, optional and without a
//! default keeps its current value.
//!
//! # Resolution Order
//!
//! For each tagged field:
//!
//! 1. A named setter (`setter=`) replaces everything else
//! 2. A [`Scan`] impl on the field type replaces everything else
//! 3. An explicit `parser=` decodes the value
//! 4. [`UnmarshalText`], then [`UnmarshalJson`], are tried silently
//! 5. Built-in coercion ([`Coerce`]) converts the value
//!
//! # Example
//!
//! ```rust
//! use envbind::EnvBind;
//! use std::time::Duration;
//!
//! #[derive(Debug, Default, EnvBind)]
//! struct Config {
//!     #[env("PORT,default=9090")]
//!     pub port: u16,
//!
//!     #[env("DEBUG")]
//!     pub debug: bool,
//!
//!     #[env("HOST,default=localhost")]
//!     pub host: String,
//!
//!     #[env("TIMEOUT,default=30s")]
//!     pub timeout: Duration,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! #     std::env::set_var("PORT", "8080");
//! #     std::env::set_var("DEBUG", "true");
//! let config = Config::from_env()?;
//! assert_eq!(config.port, 8080);
//! assert!(config.debug);
//! assert_eq!(config.host, "localhost");
//! assert_eq!(config.timeout, Duration::from_secs(30));
//! #     Ok(())
//! # }
//! ```
//!
//! # Custom Lookups
//!
//! Anything implementing [`Lookup`] can stand in for the process
//! environment, including a `HashMap<String, String>`:
//!
//! ```rust
//! use envbind::{Binder, EnvBind};
//! use std::collections::HashMap;
//!
//! #[derive(Debug, Default, EnvBind)]
//! struct Config {
//!     #[env("KEY,required")]
//!     pub key: String,
//! }
//!
//! let env: HashMap<String, String> = HashMap::new();
//! let mut config = Config::default();
//! let err = Binder::new(&env).bind(&mut config).unwrap_err();
//! assert!(matches!(err, envbind::BindError::MissingRequired { .. }));
//! ```

mod binder;
mod capability;
mod coerce;
mod error;
mod lookup;
mod probe;
mod setter;
mod tag;

// Re-export for macro-generated code
#[doc(hidden)]
pub mod __private {
    pub use crate::probe::*;
}

use std::any::Any;

pub use binder::{Binder, Field};
pub use capability::{
    Capabilities, CoerceFn, DecodeFn, Json, Parsed, Scan, ScanFn, UnmarshalFn, UnmarshalJson,
    UnmarshalText,
};
pub use coerce::{
    json_sequence, scan_sequence, text_sequence, Coerce, CoerceError, Complex, Complex32,
    Complex64, Kind, Scalar,
};
pub use envbind_derive::EnvBind;
pub use error::BindError;
pub use lookup::{Env, Lookup};
pub use setter::Setters;
pub use tag::{FieldSpec, ParserHint, SENTINEL_KEY};

/// A struct whose fields can be bound from the environment.
///
/// Implemented by `#[derive(EnvBind)]`; implementing it by hand means calling
/// [`Binder::bind_field`] for each tagged field and [`EnvBind::bind_fields`]
/// on each nested record, in declaration order.
pub trait EnvBind: Any {
    /// Bind every field of `self` using `binder`.
    fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError>;

    /// Bind `self` from the process environment.
    fn bind_env(&mut self) -> Result<(), BindError>
    where
        Self: Sized,
    {
        crate::bind(self)
    }

    /// Build a default value and bind it from the process environment.
    fn from_env() -> Result<Self, BindError>
    where
        Self: Sized + Default,
    {
        crate::from_env()
    }
}

/// Bind `record` from the process environment.
///
/// # Errors
///
/// See [`Binder::bind`].
pub fn bind<R: EnvBind>(record: &mut R) -> Result<(), BindError> {
    Binder::new(&Env).bind(record)
}

/// Build `R::default()` and bind it from the process environment.
pub fn from_env<R: EnvBind + Default>() -> Result<R, BindError> {
    let mut record = R::default();
    bind(&mut record)?;
    Ok(record)
}
