//! Derive macros for Unistate
//!
//! This crate provides procedural macros to reduce boilerplate when defining
//! typed actions.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `unistate_core::Action` for an enum
//!
//! # Example
//!
//! ```ignore
//! use unistate_core::ReservedAction;
//! use unistate_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     AddTodo { title: String },
//!
//!     #[action(rename = "todos/toggle")]
//!     ToggleTodo(usize),
//!
//!     #[action(reserved)]
//!     Reserved(ReservedAction),
//! }
//!
//! // Generated:
//! assert_eq!(TodoAction::ToggleTodo(0).action_type().as_deref(), Some("todos/toggle"));
//! assert!(TodoAction::from_reserved(ReservedAction::Init).is_reserved());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Variant, parse_macro_input};

/// Parsed `#[action(...)]` options of one variant
#[derive(Default)]
struct VariantOptions {
    reserved: bool,
    rename: Option<LitStr>,
}

fn variant_options(attrs: &[Attribute]) -> syn::Result<VariantOptions> {
    let mut options = VariantOptions::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("reserved") {
                options.reserved = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `reserved` or `rename = \"...\"`"))
            }
        })?;
    }

    if options.reserved && options.rename.is_some() {
        return Err(syn::Error::new_spanned(
            attrs.first(),
            "a reserved variant reports the store's reserved type and cannot be renamed",
        ));
    }

    Ok(options)
}

fn check_reserved_shape(variant: &Variant) -> syn::Result<()> {
    match &variant.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => Ok(()),
        _ => Err(syn::Error::new_spanned(
            variant,
            "#[action(reserved)] must be a tuple variant holding one `ReservedAction`",
        )),
    }
}

/// Derive macro for Action enums
///
/// Implements `unistate_core::Action`:
/// - `action_type()` - the variant name, or the `rename` value
/// - `from_reserved()` - wraps a reserved action in the `#[action(reserved)]` variant
///
/// and adds inherent helpers:
/// - `is_reserved()` - true for the reserved variant
/// - `ACTION_TYPES` - every non-reserved type string, in declaration order
///
/// # Attributes
///
/// - `#[action(reserved)]` - Exactly one tuple variant holding a `ReservedAction`
/// - `#[action(rename = "...")]` - Override the type string of a variant
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - No variant, or more than one variant, is marked `#[action(reserved)]`
/// - The reserved variant is not a single-field tuple variant
/// - Two variants report the same type string
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_action(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_action(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    let mut reserved_variant = None;
    let mut type_arms = Vec::new();
    let mut type_names: Vec<String> = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let options = variant_options(&variant.attrs)?;

        if options.reserved {
            check_reserved_shape(variant)?;
            if reserved_variant.replace(variant_name).is_some() {
                return Err(syn::Error::new_spanned(
                    variant,
                    "only one variant may be marked #[action(reserved)]",
                ));
            }
            type_arms.push(quote! {
                Self::#variant_name(reserved) => ::std::option::Option::Some(
                    ::std::borrow::Cow::Borrowed(
                        ::unistate_core::action::ReservedAction::action_type(*reserved)
                    )
                ),
            });
            continue;
        }

        let type_name = options
            .rename
            .map_or_else(|| variant_name.to_string(), |lit| lit.value());

        if type_names.contains(&type_name) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate action type \"{type_name}\""),
            ));
        }

        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
            Fields::Unit => quote! { Self::#variant_name },
        };
        type_arms.push(quote! {
            #pattern => ::std::option::Option::Some(::std::borrow::Cow::Borrowed(#type_name)),
        });
        type_names.push(type_name);
    }

    let Some(reserved_variant) = reserved_variant else {
        return Err(syn::Error::new_spanned(
            name,
            "#[derive(Action)] needs one variant marked #[action(reserved)] \
             to carry store bootstrap actions",
        ));
    };

    Ok(quote! {
        impl #impl_generics ::unistate_core::action::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> ::std::option::Option<::std::borrow::Cow<'_, str>> {
                match self {
                    #(#type_arms)*
                }
            }

            fn from_reserved(reserved: ::unistate_core::action::ReservedAction) -> Self {
                Self::#reserved_variant(reserved)
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// Every non-reserved action type, in declaration order
            pub const ACTION_TYPES: &'static [&'static str] = &[#(#type_names),*];

            /// Returns true if this is a reserved store action
            #[must_use]
            pub const fn is_reserved(&self) -> bool {
                matches!(self, Self::#reserved_variant(..))
            }
        }
    })
}
