use crate::attributes::{FieldAttributes, GonerAliasAttributes, GonerAttributes, NameDefinition};
use convert_case::{Case, Casing};
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use std::ops::Deref;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DataStruct, DeriveInput, Error, Fields, Index, Item, Member, Result, Type,
};

const GONER: &str = "goner";
const GONE: &str = "gone";

fn extract_goner_attributes(attributes: &[Attribute]) -> Result<GonerAttributes> {
    attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(GONER))
        .map(GonerAttributes::try_from)
        .next()
        .transpose()
        .map(Option::unwrap_or_default)
}

fn extract_field_attributes(attributes: &[Attribute]) -> Result<Option<FieldAttributes>> {
    attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(GONE))
        .map(FieldAttributes::try_from)
        .next()
        .transpose()
}

fn generate_fields(fields: &Fields) -> Result<Vec<TokenStream>> {
    let members = fields.iter().enumerate().map(|(index, field)| {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index {
                index: index as u32,
                span: field.span(),
            }),
        };

        (member, field)
    });

    members
        .filter_map(|(member, field)| {
            extract_field_attributes(&field.attrs)
                .transpose()
                .map(|attributes| attributes.map(|attributes| (member, attributes)))
        })
        .map(|attributes| -> Result<TokenStream> {
            let (member, attributes) = attributes?;
            let name = match &member {
                Member::Named(ident) => ident.to_string(),
                Member::Unnamed(index) => index.index.to_string(),
            };
            let tag = attributes.tag();
            let options = attributes.options();

            Ok(quote! {
                gone_di::field::Field::new(#name, &self.#member)
                    .tag(#tag)
                    .options(#options)
            })
        })
        .try_collect()
}

fn generate_hooks(attributes: &GonerAttributes) -> Vec<TokenStream> {
    let flags = [
        (attributes.init, quote!(with_initiator)),
        (attributes.infallible_init, quote!(with_infallible_initiator)),
        (attributes.before_fill, quote!(with_before_fill)),
        (attributes.field_injector, quote!(with_field_injector)),
        (attributes.daemon, quote!(with_daemon)),
    ];

    let capabilities = flags
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, method)| quote!(.#method(this.clone())));

    let providers = attributes.providers.iter().map(|ty| {
        quote!(.with_provider(gone_di::provider::ProviderAdapter::typed::<#ty, _>(this.clone())))
    });

    let none_param_providers = attributes.none_param_providers.iter().map(|ty| {
        quote!(.with_provider(gone_di::provider::ProviderAdapter::none_param::<#ty, _>(this.clone())))
    });

    let named_provider = attributes
        .named_provider
        .then(|| quote!(.with_provider(gone_di::provider::ProviderAdapter::named(this.clone()))));

    capabilities
        .chain(providers)
        .chain(none_param_providers)
        .chain(named_provider)
        .collect()
}

pub fn expand_goner(input: &DeriveInput) -> Result<TokenStream> {
    if let Data::Struct(DataStruct { fields, .. }) = &input.data {
        let ident = &input.ident;
        let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
        let attributes = extract_goner_attributes(&input.attrs)?;

        let fields = generate_fields(fields)?;
        let fields = (!fields.is_empty()).then(|| {
            quote! {
                fn fields(&self) -> Vec<gone_di::field::Field<'_>> {
                    vec![#(#fields),*]
                }
            }
        });

        let name = attributes.name.as_ref().map(|name| {
            let name = match name {
                NameDefinition::Explicit(name) => name.value(),
                NameDefinition::Derived => ident.to_string().to_case(Case::Snake),
            };

            quote! {
                fn goner_name(&self) -> Option<String> {
                    Some(#name.to_string())
                }
            }
        });

        let hooks = generate_hooks(&attributes);
        let hooks = (!hooks.is_empty()).then(|| {
            quote! {
                fn hooks(this: &gone_di::instance_provider::ComponentInstancePtr<Self>) -> gone_di::component::Hooks {
                    gone_di::component::Hooks::default()
                        #(#hooks)*
                }
            }
        });

        Ok(quote! {
            #[automatically_derived]
            impl #impl_generics gone_di::component::Goner for #ident #ty_generics #where_clause {
                #fields
                #name
                #hooks
            }
        })
    } else {
        Err(Error::new(input.span(), "Can only derive Goner on structs!"))
    }
}

pub fn register_goner_alias(item: &Item, args: &GonerAliasAttributes) -> Result<TokenStream> {
    if let Item::Impl(item_impl) = item {
        let trait_type = item_impl
            .trait_
            .as_ref()
            .map(|(_, path, ..)| path)
            .ok_or_else(|| Error::new(item.span(), "Missing trait identifier!"))?;

        let target_type = if let Type::Path(path) = item_impl.self_ty.deref() {
            &path.path
        } else {
            return Err(Error::new(
                item.span(),
                "Registering aliases is only available for goners!",
            ));
        };

        let is_default = args.is_default;

        Ok(quote! {
            #item

            const _: () = {
                fn cast(
                    instance: &gone_di::instance_provider::ComponentInstanceAnyPtr,
                ) -> Option<gone_di::instance_provider::AnyValue> {
                    instance
                        .clone()
                        .downcast::<#target_type>()
                        .ok()
                        .map(|instance| {
                            Box::new(instance as gone_di::instance_provider::ComponentInstancePtr<dyn #trait_type + Send + Sync>)
                                as gone_di::instance_provider::AnyValue
                        })
                }

                fn register() -> gone_di::component_registry::internal::ComponentAliasDefinition {
                    gone_di::component_registry::internal::ComponentAliasDefinition {
                        target_type: std::any::TypeId::of::<#target_type>(),
                        binding: gone_di::component::TypeBinding::of::<dyn #trait_type + Send + Sync>(cast)
                            .default_if(#is_default),
                    }
                }

                gone_di::component_registry::internal::submit! {
                    gone_di::component_registry::internal::ComponentAliasRegisterer {
                        register
                    }
                }
            };
        })
    } else {
        Err(Error::new(
            item.span(),
            "Registering aliases for goners is possible only on trait implementations!",
        ))
    }
}
