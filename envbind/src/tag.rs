//! Parsing of `#[env("...")]` tag strings.
//!
//! A tag is a comma-separated list whose first segment is the environment
//! variable name. The remaining segments are options:
//!
//! ```text
//! <KEY>[,required][,default=<value>][,setter=<name>][,parser=<text|json>]
//! ```
//!
//! Unknown segments are ignored so that newer tags keep working with older
//! versions of the library.

/// Environment key that never consults the environment.
pub const SENTINEL_KEY: &str = "_";

/// Explicit unmarshal hint given with `parser=...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParserHint {
    /// No `parser=` segment.
    #[default]
    None,
    /// `parser=text`: decode through [`UnmarshalText`](crate::UnmarshalText).
    Text,
    /// `parser=json`: decode through [`UnmarshalJson`](crate::UnmarshalJson).
    Json,
    /// `parser=<anything else>`. Rejected by the binder when a value is present.
    Unknown(String),
}

impl ParserHint {
    fn from_name(name: &str) -> Self {
        match name {
            "text" => Self::Text,
            "json" => Self::Json,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Binding options parsed from a single field tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    /// Environment variable name, possibly empty or [`SENTINEL_KEY`].
    pub key: String,
    /// Fail when neither the environment nor a default provides a value.
    pub required: bool,
    /// Value used when the environment variable is unset or empty.
    ///
    /// `default=` with nothing after the `=` is treated as no default.
    pub default: Option<String>,
    /// Name of a registered setter that populates the field instead.
    pub setter: Option<String>,
    /// Explicit unmarshal hint.
    pub parser: ParserHint,
}

impl FieldSpec {
    /// Parse a tag string. Never fails; missing options keep their defaults.
    pub fn parse(tag: &str) -> Self {
        let mut segments = tag.split(',');
        let mut spec = Self {
            key: segments.next().unwrap_or_default().to_string(),
            ..Self::default()
        };

        for segment in segments {
            if segment == "required" {
                spec.required = true;
            } else if let Some(value) = segment.strip_prefix("default=") {
                spec.default = (!value.is_empty()).then(|| value.to_string());
            } else if let Some(name) = segment.strip_prefix("setter=") {
                spec.setter = (!name.is_empty()).then(|| name.to_string());
            } else if let Some(name) = segment.strip_prefix("parser=") {
                spec.parser = if name.is_empty() {
                    ParserHint::None
                } else {
                    ParserHint::from_name(name)
                };
            }
        }

        spec
    }

    /// Whether the key refers to a real environment variable.
    pub fn reads_env(&self) -> bool {
        self.key != SENTINEL_KEY
    }
}
