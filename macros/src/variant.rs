use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Error, Expr, Ident, LitStr, Result, Token, Type, braced};

pub struct Variant {
    pub docs: Vec<Attribute>,
    pub message: LitStr,
    pub no_source: bool,
    pub name: Ident,
    pub fields: Vec<(Ident, Type)>,
    pub level: Expr,
}

pub struct EnumInput {
    pub name: Ident,
    pub variants: Vec<Variant>,
}

impl Parse for EnumInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse::<Ident>()?;

        let content;
        braced!(content in input);

        let mut variants = Vec::new();
        while !content.is_empty() {
            variants.push(content.parse::<Variant>()?);
            if content.peek(Token![,]) {
                content.parse::<Token![,]>()?;
            }
        }

        Ok(EnumInput { name, variants })
    }
}

impl Parse for Variant {
    fn parse(input: ParseStream) -> Result<Self> {
        let attributes = input.call(Attribute::parse_outer)?;

        let mut docs = Vec::new();
        let mut message = None;
        let mut no_source = false;
        for attribute in attributes {
            let path = attribute.path();
            if path.is_ident("error") {
                message = Some(attribute.parse_args::<LitStr>()?);
            } else if path.is_ident("no_source") {
                no_source = true;
            } else if path.is_ident("doc") {
                docs.push(attribute);
            } else {
                return Err(Error::new_spanned(attribute, "unsupported attribute"));
            }
        }

        let name = input.parse::<Ident>()?;
        let message =
            message.ok_or_else(|| Error::new(name.span(), "missing #[error(...)] attribute"))?;

        let mut fields = Vec::new();
        if input.peek(syn::token::Brace) {
            let field_content;
            braced!(field_content in input);
            while !field_content.is_empty() {
                let field_name = field_content.parse::<Ident>()?;
                field_content.parse::<Token![:]>()?;
                let field_type = field_content.parse::<Type>()?;
                fields.push((field_name, field_type));
                if field_content.peek(Token![,]) {
                    field_content.parse::<Token![,]>()?;
                }
            }
        }

        input.parse::<Token![=>]>()?;
        let level = input.parse::<Expr>()?;

        Ok(Variant {
            docs,
            message,
            no_source,
            name,
            fields,
            level,
        })
    }
}

pub fn snake_case(ident: &Ident) -> Ident {
    let source = ident.to_string();
    let mut output = String::with_capacity(source.len() + 4);
    let mut previous_lower = false;
    for character in source.chars() {
        if character.is_ascii_uppercase() {
            if previous_lower {
                output.push('_');
            }
            output.push(character.to_ascii_lowercase());
            previous_lower = false;
        } else {
            output.push(character);
            previous_lower = character.is_ascii_lowercase() || character.is_ascii_digit();
        }
    }
    Ident::new(&output, ident.span())
}
