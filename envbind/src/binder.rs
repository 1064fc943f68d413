//! Binding of tagged struct fields from a [`Lookup`].

use crate::capability::Capabilities;
use crate::coerce::CoerceError;
use crate::error::BindError;
use crate::lookup::Lookup;
use crate::setter::Setters;
use crate::tag::{FieldSpec, ParserHint};
use crate::EnvBind;

/// Description of one tagged field, generated by `#[derive(EnvBind)]`.
pub struct Field<R, T> {
    /// Field name as declared in the struct.
    pub name: &'static str,
    /// Raw `#[env("...")]` tag.
    pub tag: &'static str,
    /// Whether built-in coercion and unmarshalers may write the field.
    ///
    /// Private fields are not settable; they can still be filled by the
    /// field type's [`Scan`](crate::Scan) impl or by a named setter.
    pub settable: bool,
    /// Borrow the field out of its record.
    pub access: fn(&mut R) -> &mut T,
    pub capabilities: Capabilities<T>,
}

/// Binds records against a [`Lookup`] and an optional [`Setters`] registry.
///
/// A binder holds no state between calls and can be reused for any number of
/// records.
pub struct Binder<'a> {
    lookup: &'a dyn Lookup,
    setters: Option<&'a Setters>,
}

impl<'a> Binder<'a> {
    pub fn new(lookup: &'a dyn Lookup) -> Self {
        Self {
            lookup,
            setters: None,
        }
    }

    /// Use `setters` to resolve `setter=<name>` tag options.
    pub fn with_setters(mut self, setters: &'a Setters) -> Self {
        self.setters = Some(setters);
        self
    }

    /// Populate every tagged field of `record`, recursing into nested records.
    ///
    /// # Errors
    ///
    /// Returns the first error in declaration order (depth first for nested
    /// records). Fields bound before the failure keep their new values.
    pub fn bind<R: EnvBind>(&self, record: &mut R) -> Result<(), BindError> {
        record.bind_fields(self)
    }

    /// Bind a single field of `record`.
    ///
    /// Called by generated code once per tagged field.
    pub fn bind_field<R: EnvBind, T>(
        &self,
        record: &mut R,
        field: Field<R, T>,
    ) -> Result<(), BindError> {
        if field.tag.is_empty() {
            return Ok(());
        }

        let spec = FieldSpec::parse(field.tag);
        let raw = self.resolve(field.name, &spec)?;

        if let Some(setter) = &spec.setter {
            return self.apply_setter(record, field.name, setter, &raw);
        }

        let Field {
            name,
            settable,
            access,
            capabilities,
            ..
        } = field;
        let value = access(record);

        if let Some(scan) = capabilities.scan {
            tracing::debug!(field = name, key = %spec.key, "binding field through Scan");
            return scan(value, &raw)
                .map_err(|e| BindError::scan_failed(name, &spec.key, &raw, format!("{e:#}")));
        }

        if !settable {
            return Err(BindError::FieldNotSettable {
                field: name.to_string(),
                key: spec.key,
            });
        }

        if raw.is_empty() {
            tracing::trace!(field = name, key = %spec.key, "no value; keeping zero value");
            return Ok(());
        }

        match &spec.parser {
            ParserHint::None => {}
            ParserHint::Text => {
                let Some(text) = capabilities.text else {
                    return Err(unsupported_hint(name, &spec, "text"));
                };
                tracing::debug!(field = name, key = %spec.key, "binding field through parser=text");
                return text(value, raw.as_bytes())
                    .map_err(|e| unmarshal_failed(name, &spec, "text", &raw, e));
            }
            ParserHint::Json => {
                let Some(json) = capabilities.json else {
                    return Err(unsupported_hint(name, &spec, "json"));
                };
                tracing::debug!(field = name, key = %spec.key, "binding field through parser=json");
                return json(value, raw.as_bytes())
                    .map_err(|e| unmarshal_failed(name, &spec, "json", &raw, e));
            }
            ParserHint::Unknown(parser) => {
                return Err(unsupported_hint(name, &spec, parser));
            }
        }

        // Implicit decoders are tried silently; a failure falls through.
        if let Some(text) = capabilities.text {
            if text(value, raw.as_bytes()).is_ok() {
                tracing::debug!(field = name, key = %spec.key, "binding field through UnmarshalText");
                return Ok(());
            }
        }
        if let Some(json) = capabilities.json {
            if json(value, raw.as_bytes()).is_ok() {
                tracing::debug!(field = name, key = %spec.key, "binding field through UnmarshalJson");
                return Ok(());
            }
        }

        if capabilities.scan_sequence.is_none() {
            let sequences = [
                ("UnmarshalText", capabilities.text_sequence),
                ("UnmarshalJson", capabilities.json_sequence),
            ];
            for (via, decode) in sequences {
                let Some(decode) = decode else { continue };
                if let Ok(decoded) = decode(&raw) {
                    *value = decoded;
                    tracing::debug!(field = name, key = %spec.key, via, "binding sequence element by element");
                    return Ok(());
                }
            }
        }

        let Some(coerce) = capabilities.scan_sequence.or(capabilities.coerce) else {
            return Err(BindError::UnsupportedType {
                field: name.to_string(),
                key: spec.key,
                type_name: std::any::type_name::<T>().to_string(),
            });
        };
        *value = coerce(&raw).map_err(|e| match e {
            CoerceError::Invalid { kind, message } => {
                BindError::invalid(kind, name, &spec.key, &raw, message)
            }
            CoerceError::Scan { message } => BindError::scan_failed(name, &spec.key, &raw, message),
            CoerceError::Parse { message } => BindError::InvalidValue {
                field: name.to_string(),
                key: spec.key.clone(),
                value: raw.clone(),
                message,
            },
        })?;
        tracing::debug!(field = name, key = %spec.key, "binding field through built-in coercion");
        Ok(())
    }

    /// Resolve the raw string for a field: environment, then default.
    ///
    /// An empty result means nothing was found and the field is optional.
    fn resolve(&self, field: &str, spec: &FieldSpec) -> Result<String, BindError> {
        let from_env = if spec.reads_env() {
            self.lookup.lookup(&spec.key).filter(|value| !value.is_empty())
        } else {
            None
        };

        if let Some(value) = from_env {
            tracing::trace!(field, key = %spec.key, "value found in environment");
            return Ok(value);
        }
        if let Some(default) = &spec.default {
            tracing::trace!(field, key = %spec.key, "using default value");
            return Ok(default.clone());
        }
        if spec.required {
            return Err(BindError::MissingRequired {
                field: field.to_string(),
                key: spec.key.clone(),
            });
        }
        tracing::trace!(field, key = %spec.key, "no value and no default");
        Ok(String::new())
    }

    fn apply_setter<R: EnvBind>(
        &self,
        record: &mut R,
        field: &str,
        setter: &str,
        raw: &str,
    ) -> Result<(), BindError> {
        let not_found = || BindError::SetterNotFound {
            field: field.to_string(),
            setter: setter.to_string(),
        };
        let result = self
            .setters
            .and_then(|setters| setters.call(record, setter, raw))
            .ok_or_else(not_found)?;
        tracing::debug!(field, setter, "binding field through named setter");
        result.map_err(|e| BindError::setter_failed(field, setter, raw, e))
    }
}

fn unsupported_hint(field: &str, spec: &FieldSpec, parser: &str) -> BindError {
    BindError::UnsupportedParserHint {
        field: field.to_string(),
        key: spec.key.clone(),
        parser: parser.to_string(),
    }
}

fn unmarshal_failed(
    field: &str,
    spec: &FieldSpec,
    parser: &str,
    raw: &str,
    error: anyhow::Error,
) -> BindError {
    BindError::UnmarshalFailed {
        field: field.to_string(),
        key: spec.key.clone(),
        parser: parser.to_string(),
        value: raw.to_string(),
        message: format!("{error:#}"),
    }
}
