use syn::meta::ParseNestedMeta;
use syn::{Attribute, Error, LitStr, Meta, Result, Token, Type};

pub enum NameDefinition {
    Explicit(LitStr),
    Derived,
}

#[derive(Default)]
pub struct GonerAttributes {
    pub name: Option<NameDefinition>,
    pub init: bool,
    pub infallible_init: bool,
    pub before_fill: bool,
    pub field_injector: bool,
    pub daemon: bool,
    pub named_provider: bool,
    pub providers: Vec<Type>,
    pub none_param_providers: Vec<Type>,
}

impl TryFrom<&Attribute> for GonerAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut result = Self::default();
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = Some(if meta.input.peek(Token![=]) {
                    NameDefinition::Explicit(meta.value()?.parse()?)
                } else {
                    NameDefinition::Derived
                });
            } else if meta.path.is_ident("init") {
                result.init = true;
            } else if meta.path.is_ident("infallible_init") {
                result.infallible_init = true;
            } else if meta.path.is_ident("before_fill") {
                result.before_fill = true;
            } else if meta.path.is_ident("field_injector") {
                result.field_injector = true;
            } else if meta.path.is_ident("daemon") {
                result.daemon = true;
            } else if meta.path.is_ident("named_provider") {
                result.named_provider = true;
            } else if meta.path.is_ident("provider") {
                result.providers.push(parse_type(&meta)?);
            } else if meta.path.is_ident("none_param_provider") {
                result.none_param_providers.push(parse_type(&meta)?);
            } else {
                return Err(meta.error("unsupported goner attribute"));
            }

            Ok(())
        })?;

        if result.init && result.infallible_init {
            return Err(Error::new_spanned(
                value,
                "`init` and `infallible_init` are mutually exclusive",
            ));
        }

        Ok(result)
    }
}

fn parse_type(meta: &ParseNestedMeta) -> Result<Type> {
    let value: LitStr = meta.value()?.parse()?;
    value.parse()
}

#[derive(Default)]
pub struct FieldAttributes {
    pub name: Option<LitStr>,
    pub extend: Option<LitStr>,
    pub tag: Option<LitStr>,
    pub allow_nil: bool,
    pub lazy: bool,
}

impl FieldAttributes {
    /// Raw dependency annotation: `name-or-pattern[,extend]`.
    pub fn tag(&self) -> String {
        if let Some(tag) = &self.tag {
            return tag.value();
        }

        let name = self.name.as_ref().map(LitStr::value).unwrap_or_default();
        match &self.extend {
            Some(extend) => format!("{name},{}", extend.value()),
            None => name,
        }
    }

    pub fn options(&self) -> String {
        [(self.allow_nil, "allow_nil"), (self.lazy, "lazy")]
            .into_iter()
            .filter_map(|(enabled, option)| enabled.then_some(option))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<&Attribute> for FieldAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut result = Self::default();
        if let Meta::Path(_) = value.meta {
            return Ok(result);
        }

        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("extend") {
                result.extend = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("tag") {
                result.tag = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("allow_nil") {
                result.allow_nil = true;
            } else if meta.path.is_ident("lazy") {
                result.lazy = true;
            } else {
                return Err(meta.error("unsupported gone attribute"));
            }

            Ok(())
        })?;

        if result.tag.is_some() && (result.name.is_some() || result.extend.is_some()) {
            return Err(Error::new_spanned(
                value,
                "`tag` cannot be combined with `name` or `extend`",
            ));
        }

        Ok(result)
    }
}

#[derive(Default)]
pub struct GonerAliasAttributes {
    pub is_default: bool,
}

impl GonerAliasAttributes {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("default") {
            self.is_default = true;
            Ok(())
        } else {
            Err(meta.error("unsupported goner_alias attribute"))
        }
    }
}
