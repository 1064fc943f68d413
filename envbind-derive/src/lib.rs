//! Derive macro implementation for envbind

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields};

mod attrs;

use attrs::FieldAttrs;

/// `EnvBind` derive macro
///
/// Implements `envbind::EnvBind` for a struct with named fields.
///
/// # Supported Attributes
///
/// **Field-level**:
/// - `#[env("KEY")]`: Bind the field to environment variable `KEY`
/// - `#[env("KEY,required")]`: Fail when `KEY` is unset and has no default
/// - `#[env("KEY,default=value")]`: Use `value` when `KEY` is unset
/// - `#[env("KEY,setter=name")]`: Populate through a registered setter
/// - `#[env("KEY,parser=text")]` / `#[env("KEY,parser=json")]`: Decode with
///   the field type's text or JSON unmarshaler
///
/// Fields whose type implements `EnvBind` are bound recursively whether or not
/// they carry a tag. Untagged fields of other types are left untouched.
///
/// # Example
///
/// See the `envbind` crate documentation for usage examples.
#[proc_macro_derive(EnvBind, attributes(env))]
pub fn derive_envbind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    // Struct name
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "EnvBind does not support generic structs",
        ));
    }

    // Extract fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "EnvBind only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "EnvBind only supports structs",
            ));
        }
    };

    // Generate binding code for each field, in declaration order
    let bindings = fields
        .iter()
        .map(field_binding)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl ::envbind::EnvBind for #struct_name {
            fn bind_fields(
                &mut self,
                binder: &::envbind::Binder<'_>,
            ) -> ::core::result::Result<(), ::envbind::BindError> {
                #[allow(unused_imports)]
                use ::envbind::__private::{
                    CoerceProbe as _, JsonProbe as _, JsonSequenceProbe as _, NestedProbe as _,
                    NoCoerce as _, NoJson as _, NoJsonSequence as _, NoNested as _, NoScan as _,
                    NoScanSequence as _, NoText as _, NoTextSequence as _, ScanProbe as _,
                    ScanSequenceProbe as _, TextProbe as _, TextSequenceProbe as _,
                };

                #(#bindings)*

                ::core::result::Result::Ok(())
            }
        }
    })
}

fn field_binding(field: &Field) -> syn::Result<TokenStream2> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let ty = &field.ty;

    // Parse attributes
    let attrs = FieldAttrs::from_field(field)?;

    // Nested records are visited first, tagged or not
    let nested = quote! {
        if let ::core::option::Option::Some(__nested) =
            (&::envbind::__private::Probe::<#ty>::new()).nested_capability()
        {
            __nested(&mut self.#ident, binder)?;
        }
    };

    let Some(tag) = attrs.tag else {
        return Ok(nested);
    };

    let name = ident.to_string();
    let settable = attrs::is_settable(field);

    Ok(quote! {
        #nested
        {
            let __probe = ::envbind::__private::Probe::<#ty>::new();
            binder.bind_field(
                self,
                ::envbind::Field::<Self, #ty> {
                    name: #name,
                    tag: #tag,
                    settable: #settable,
                    access: |__record| &mut __record.#ident,
                    capabilities: ::envbind::Capabilities {
                        scan: (&__probe).scan_capability(),
                        text: (&__probe).text_capability(),
                        json: (&__probe).json_capability(),
                        scan_sequence: (&__probe).scan_sequence_capability(),
                        text_sequence: (&__probe).text_sequence_capability(),
                        json_sequence: (&__probe).json_sequence_capability(),
                        coerce: (&__probe).coerce_capability(),
                    },
                },
            )?;
        }
    })
}
