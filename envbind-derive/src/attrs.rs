//! Attribute parsing for `#[env("...")]` annotations.
//!
//! The tag string itself is interpreted at runtime by `envbind::FieldSpec`;
//! this module only extracts it from the field.

use syn::{Field, LitStr, Visibility};

/// Parsed `#[env(...)]` attribute of a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Raw tag string. `None` for untagged fields.
    pub tag: Option<String>,
}

impl FieldAttrs {
    /// Extract the `#[env("...")]` tag from a struct field.
    ///
    /// Attributes other than `env` are left to other macros. A field may carry
    /// at most one `env` attribute.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            if attrs.tag.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "duplicate env attribute; combine the options into one tag",
                ));
            }

            let tag: LitStr = attr.parse_args().map_err(|e| {
                syn::Error::new(
                    e.span(),
                    r#"expected a tag string, e.g. #[env("PORT,default=8080")]"#,
                )
            })?;
            attrs.tag = Some(tag.value());
        }

        Ok(attrs)
    }
}

/// Whether generated code may write the field directly.
///
/// Private fields are only written through a named setter or the field
/// type's `Scan` impl.
pub fn is_settable(field: &Field) -> bool {
    !matches!(field.vis, Visibility::Inherited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_tag() {
        let field: Field = parse_quote! {
            #[env("PORT,default=9090")]
            pub port: u16
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.tag, Some("PORT,default=9090".to_string()));
    }

    #[test]
    fn test_untagged_field() {
        let field: Field = parse_quote! {
            pub nested: Inner
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.tag, None);
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let field: Field = parse_quote! {
            #[serde(rename = "x")]
            #[env("X")]
            pub x: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.tag, Some("X".to_string()));
    }

    #[test]
    fn test_empty_tag_is_kept() {
        let field: Field = parse_quote! {
            #[env("")]
            pub x: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.tag, Some(String::new()));
    }

    #[test]
    fn test_duplicate_attribute() {
        let field: Field = parse_quote! {
            #[env("A")]
            #[env("B")]
            pub x: String
        };

        assert!(FieldAttrs::from_field(&field).is_err());
    }

    #[test]
    fn test_non_string_tag() {
        let field: Field = parse_quote! {
            #[env(name = "A")]
            pub x: String
        };

        let err = FieldAttrs::from_field(&field).unwrap_err();
        assert!(err.to_string().contains("expected a tag string"));
    }

    #[test]
    fn test_settable() {
        let public: Field = parse_quote! { pub a: String };
        let crate_visible: Field = parse_quote! { pub(crate) b: String };
        let private: Field = parse_quote! { c: String };

        assert!(is_settable(&public));
        assert!(is_settable(&crate_visible));
        assert!(!is_settable(&private));
    }
}
