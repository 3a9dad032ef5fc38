use crate::attributes::GonerAliasAttributes;
use crate::component::{expand_goner, register_goner_alias};
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error, Item};

mod attributes;
mod component;

#[proc_macro_derive(Goner, attributes(goner, gone))]
pub fn generate_goner(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_goner(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

#[proc_macro_attribute]
pub fn goner_alias(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut attributes = GonerAliasAttributes::default();
    let parser = syn::meta::parser(|meta| attributes.parse(meta));
    parse_macro_input!(attr with parser);

    let item = parse_macro_input!(item as Item);
    register_goner_alias(&item, &attributes)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
