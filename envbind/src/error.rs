//! Error types for environment binding

use crate::coerce::Kind;

/// Errors that can occur while binding environment variables to a struct.
///
/// Binding stops at the first error. Fields bound before the failing one keep
/// their new values, so a struct whose binding failed should be discarded.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// Required environment variable is not set and no default is declared.
    #[error("Environment variable '{key}' is required by field '{field}' but not set")]
    MissingRequired {
        /// Name of the field being bound
        field: String,
        /// Name of the missing environment variable
        key: String,
    },

    /// The field is private and nothing but built-in coercion could fill it.
    #[error("Field '{field}' is not settable (bound to '{key}')")]
    FieldNotSettable {
        /// Name of the private field
        field: String,
        /// Environment variable the field is bound to
        key: String,
    },

    /// `setter=` names a setter that is not registered for the record.
    #[error("Setter '{setter}' for field '{field}' not found")]
    SetterNotFound {
        /// Name of the field being bound
        field: String,
        /// Setter name from the tag
        setter: String,
    },

    /// A registered setter returned an error.
    #[error("Setter '{setter}' for field '{field}' failed: {message}")]
    SetterFailed {
        /// Name of the field being bound
        field: String,
        /// Setter name from the tag
        setter: String,
        /// Raw value handed to the setter
        value: String,
        /// Error reported by the setter
        message: String,
    },

    /// The field type's [`Scan`](crate::Scan) implementation returned an error.
    #[error("Failed to scan environment variable '{key}' into field '{field}': {message}")]
    ScanFailed {
        /// Name of the field being bound
        field: String,
        /// Environment variable the value came from
        key: String,
        /// Raw value that was scanned
        value: String,
        /// Error reported by the scanner
        message: String,
    },

    /// `parser=` names a decoder the field type does not implement.
    #[error("Field '{field}' does not implement the unmarshaler required by parser={parser}")]
    UnsupportedParserHint {
        /// Name of the field being bound
        field: String,
        /// Environment variable the field is bound to
        key: String,
        /// Parser name from the tag
        parser: String,
    },

    /// An explicitly requested text or JSON decoder returned an error.
    #[error("Failed to unmarshal {parser} for field '{field}' from '{key}': {message}")]
    UnmarshalFailed {
        /// Name of the field being bound
        field: String,
        /// Environment variable the value came from
        key: String,
        /// Parser name from the tag
        parser: String,
        /// Raw value that was decoded
        value: String,
        /// Error reported by the decoder
        message: String,
    },

    /// Value is not a valid signed integer of the field's width.
    #[error("Invalid int value '{value}' for field '{field}', env var '{key}': {message}")]
    InvalidInt {
        field: String,
        key: String,
        value: String,
        message: String,
    },

    /// Value is not a valid unsigned integer of the field's width.
    #[error("Invalid unsigned integer value '{value}' for field '{field}', env var '{key}': {message}")]
    InvalidUint {
        field: String,
        key: String,
        value: String,
        message: String,
    },

    /// Value is not a valid floating point number.
    #[error("Invalid float value '{value}' for field '{field}', env var '{key}': {message}")]
    InvalidFloat {
        field: String,
        key: String,
        value: String,
        message: String,
    },

    /// Value is not a recognized boolean spelling.
    #[error("Invalid boolean value '{value}' for field '{field}', env var '{key}': {message}")]
    InvalidBool {
        field: String,
        key: String,
        value: String,
        message: String,
    },

    /// Value is not a complex number in `a+bi` form.
    #[error("Invalid complex value '{value}' for field '{field}', env var '{key}': {message}")]
    InvalidComplex {
        field: String,
        key: String,
        value: String,
        message: String,
    },

    /// Value is not a duration such as `5m` or `1h30m`.
    #[error("Invalid duration value '{value}' for field '{field}', env var '{key}': {message}")]
    InvalidDuration {
        field: String,
        key: String,
        value: String,
        message: String,
    },

    /// Value is not an RFC 3339 timestamp.
    #[error("Invalid timestamp value '{value}' for field '{field}', env var '{key}': {message}")]
    InvalidTimestamp {
        field: String,
        key: String,
        value: String,
        message: String,
    },

    /// Value is rejected by a parsing rule outside the built-in kinds, such
    /// as `FromStr` or a custom [`Coerce`](crate::Coerce) impl.
    #[error("Invalid value '{value}' for field '{field}', env var '{key}': {message}")]
    InvalidValue {
        field: String,
        key: String,
        value: String,
        message: String,
    },

    /// The field type has no coercion rule and no unmarshaler accepted the value.
    #[error("Unsupported type {type_name} for field '{field}'")]
    UnsupportedType {
        /// Name of the field being bound
        field: String,
        /// Environment variable the field is bound to
        key: String,
        /// Fully qualified name of the field type
        type_name: String,
    },
}

impl BindError {
    /// Name of the field that caused the error.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequired { field, .. }
            | Self::FieldNotSettable { field, .. }
            | Self::SetterNotFound { field, .. }
            | Self::SetterFailed { field, .. }
            | Self::ScanFailed { field, .. }
            | Self::UnsupportedParserHint { field, .. }
            | Self::UnmarshalFailed { field, .. }
            | Self::InvalidInt { field, .. }
            | Self::InvalidUint { field, .. }
            | Self::InvalidFloat { field, .. }
            | Self::InvalidBool { field, .. }
            | Self::InvalidComplex { field, .. }
            | Self::InvalidDuration { field, .. }
            | Self::InvalidTimestamp { field, .. }
            | Self::InvalidValue { field, .. }
            | Self::UnsupportedType { field, .. } => field,
        }
    }

    /// Create an invalid value error for the kind that failed to parse.
    pub(crate) fn invalid(
        kind: Kind,
        field: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        let field = field.into();
        let key = key.into();
        let value = value.into();
        let message = message.to_string();
        match kind {
            Kind::Int { .. } => Self::InvalidInt { field, key, value, message },
            Kind::Uint { .. } => Self::InvalidUint { field, key, value, message },
            Kind::Float { .. } => Self::InvalidFloat { field, key, value, message },
            Kind::Bool => Self::InvalidBool { field, key, value, message },
            Kind::Complex { .. } => Self::InvalidComplex { field, key, value, message },
            Kind::Duration => Self::InvalidDuration { field, key, value, message },
            Kind::Timestamp => Self::InvalidTimestamp { field, key, value, message },
            // Text coercion cannot fail; only a custom `Coerce` impl reports it.
            Kind::Text => Self::InvalidValue { field, key, value, message },
        }
    }

    /// Create a setter failure error, keeping the full error chain.
    pub(crate) fn setter_failed(
        field: impl Into<String>,
        setter: impl Into<String>,
        value: impl Into<String>,
        error: anyhow::Error,
    ) -> Self {
        Self::SetterFailed {
            field: field.into(),
            setter: setter.into(),
            value: value.into(),
            message: format!("{error:#}"),
        }
    }

    /// Create a scan failure error from a rendered message.
    pub(crate) fn scan_failed(
        field: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::ScanFailed {
            field: field.into(),
            key: key.into(),
            value: value.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_maps_kind_to_variant() {
        let err = BindError::invalid(Kind::Uint { bits: 8 }, "port", "PORT", "-1", "bad");
        assert!(matches!(err, BindError::InvalidUint { .. }));

        let err = BindError::invalid(Kind::Duration, "timeout", "TIMEOUT", "soon", "bad");
        assert!(matches!(err, BindError::InvalidDuration { .. }));
    }

    #[test]
    fn test_text_kind_is_invalid_value() {
        let err = BindError::invalid(Kind::Text, "mode", "MODE", "x", "unknown mode");
        match err {
            BindError::InvalidValue { field, value, message, .. } => {
                assert_eq!(field, "mode");
                assert_eq!(value, "x");
                assert_eq!(message, "unknown mode");
            }
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_message_mentions_field_and_key() {
        let err = BindError::invalid(Kind::Int { bits: 32 }, "port", "PORT", "abc", "invalid digit");
        let message = err.to_string();
        assert!(message.contains("port"));
        assert!(message.contains("PORT"));
        assert!(message.contains("abc"));
        assert_eq!(err.field(), "port");
    }

    #[test]
    fn test_setter_failed_keeps_context() {
        let error = anyhow::anyhow!("inner").context("outer");
        let err = BindError::setter_failed("host", "SetHost", "x", error);
        match err {
            BindError::SetterFailed { message, .. } => assert_eq!(message, "outer: inner"),
            other => panic!("Expected SetterFailed, got {other:?}"),
        }
    }
}
