use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Expr, Ident, Token, parse_macro_input};

struct Field {
    key: Ident,
    value: Expr,
}

impl Parse for Field {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key = input.parse::<Ident>()?;
        input.parse::<Token![=]>()?;
        let value = input.parse::<Expr>()?;
        Ok(Field { key, value })
    }
}

struct LogInput {
    event: Expr,
    fields: Punctuated<Field, Token![,]>,
}

impl Parse for LogInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let event = input.parse::<Expr>()?;
        let fields = if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            Punctuated::parse_terminated(input)?
        } else {
            Punctuated::new()
        };
        Ok(LogInput { event, fields })
    }
}

/// Emits `event` at the level it declares, attaching `key = value` pairs as
/// display-formatted tracing fields.
pub fn log_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as LogInput);

    let event = &input.event;
    let keys: Vec<_> = input.fields.iter().map(|field| &field.key).collect();
    let values: Vec<_> = input.fields.iter().map(|field| &field.value).collect();

    let emit = |level: proc_macro2::TokenStream| {
        quote! {
            tracing::#level!(#(#keys = %#values,)* "{}", __log_message)
        }
    };
    let error = emit(quote! { error });
    let warn = emit(quote! { warn });
    let info = emit(quote! { info });
    let debug = emit(quote! { debug });
    let trace = emit(quote! { trace });

    quote! {
        {
            let __log_event = &(#event);
            let __log_message = __log_event.to_string();
            match __log_event.level() {
                tracing::Level::ERROR => #error,
                tracing::Level::WARN => #warn,
                tracing::Level::INFO => #info,
                tracing::Level::DEBUG => #debug,
                _ => #trace,
            }
        }
    }
    .into()
}
