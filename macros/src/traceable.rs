use crate::variant::{EnumInput, Variant, snake_case};
use proc_macro::TokenStream;
use quote::quote;
use syn::{LitStr, parse_macro_input};

impl Variant {
    // Source-carrying variants render as "<message>: <source>".
    fn display(&self) -> LitStr {
        if self.no_source {
            self.message.clone()
        } else {
            LitStr::new(&format!("{}: {{err}}", self.message.value()), self.message.span())
        }
    }

    fn has_constructor(&self) -> bool {
        !self.no_source || !self.fields.is_empty()
    }
}

pub fn traceable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as EnumInput);

    let enum_name = &input.name;
    let variants = &input.variants;

    let enum_variants = variants.iter().map(|variant| {
        let docs = &variant.docs;
        let name = &variant.name;
        let display = variant.display();
        let fields = variant.fields.iter().map(|(field, ty)| quote! { #field: #ty });

        match (variant.no_source, variant.fields.is_empty()) {
            (true, true) => quote! {
                #(#docs)*
                #[error(#display)]
                #name
            },
            (true, false) => quote! {
                #(#docs)*
                #[error(#display)]
                #name { #(#fields,)* }
            },
            (false, _) => quote! {
                #(#docs)*
                #[error(#display)]
                #name { #(#fields,)* err: String }
            },
        }
    });

    let level_arms = variants.iter().map(|variant| {
        let name = &variant.name;
        let level = &variant.level;
        if variant.no_source && variant.fields.is_empty() {
            quote! { Self::#name => #level }
        } else {
            quote! { Self::#name { .. } => #level }
        }
    });

    let constructors = variants
        .iter()
        .filter(|variant| variant.has_constructor())
        .map(|variant| {
            let name = &variant.name;
            let constructor = snake_case(name);
            let params = variant
                .fields
                .iter()
                .map(|(field, ty)| quote! { #field: impl Into<#ty> });
            let assignments = variant
                .fields
                .iter()
                .map(|(field, _)| quote! { #field: #field.into() });

            if variant.no_source {
                quote! {
                    pub fn #constructor(#(#params),*) -> Self {
                        Self::#name { #(#assignments,)* }
                    }
                }
            } else {
                quote! {
                    pub fn #constructor(#(#params,)* source: impl std::fmt::Display) -> Self {
                        Self::#name {
                            #(#assignments,)*
                            err: source.to_string(),
                        }
                    }
                }
            }
        });

    quote! {
        #[allow(dead_code)]
        #[derive(Debug, Clone, thiserror::Error, serde::Serialize, serde::Deserialize)]
        pub enum #enum_name {
            #(#enum_variants,)*
        }

        #[allow(dead_code)]
        impl #enum_name {
            pub fn level(&self) -> tracing::Level {
                match self {
                    #(#level_arms,)*
                }
            }

            #(#constructors)*
        }
    }
    .into()
}
