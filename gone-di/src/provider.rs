//! Components which synthesize values on demand, rather than being injected by reference.
//!
//! There are three provider shapes, all adapted into a uniform [ProviderAdapter]:
//!
//! * [Provider] - provides a single type, given a configuration string
//! * [NoneParamProvider] - provides a single type without any configuration
//! * [NamedProvider] - provides any requested type; usable only by referring to its name
//!
//! Typed providers are fallback candidates when no component of the requested type is
//! registered.
//!
//! ```
//! use gone_di::cemetery::Cemetery;
//! use gone_di::component_registry::GonerOptions;
//! use gone_di::field::Inject;
//! use gone_di::instance_provider::ErrorPtr;
//! use gone_di::provider::Provider;
//! use gone_di::Goner;
//!
//! #[derive(Goner)]
//! #[goner(provider = "String")]
//! struct Greeting;
//!
//! impl Provider<String> for Greeting {
//!     fn provide(&self, conf: &str) -> Result<String, ErrorPtr> {
//!         Ok(format!("hello {conf}"))
//!     }
//! }
//!
//! #[derive(Goner, Default)]
//! struct Greeted {
//!     #[gone(extend = "world")]
//!     greeting: Inject<String>,
//! }
//!
//! let mut cemetery = Cemetery::new();
//! cemetery.register(Greeting, GonerOptions::new()).unwrap();
//! let greeted = cemetery.register(Greeted::default(), GonerOptions::new()).unwrap();
//! cemetery.install().unwrap();
//!
//! assert_eq!(*greeted.greeting, "hello world");
//! ```

use crate::instance_provider::{AnyValue, ComponentInstancePtr, ErrorPtr, TypeInfo};
use derivative::Derivative;
use std::any::Any;
#[cfg(test)]
use mockall::automock;

/// Provides values of type `T`, given a configuration string.
#[cfg_attr(test, automock)]
pub trait Provider<T: Send + Sync + 'static>: Send + Sync {
    fn provide(&self, conf: &str) -> Result<T, ErrorPtr>;
}

/// Provides values of type `T` without any configuration.
#[cfg_attr(test, automock)]
pub trait NoneParamProvider<T: Send + Sync + 'static>: Send + Sync {
    fn provide(&self) -> Result<T, ErrorPtr>;
}

/// Provides values of any requested type. Since it can't be matched by type, it's only used when
/// referred to by name.
#[cfg_attr(test, automock)]
pub trait NamedProvider: Send + Sync {
    fn provide(&self, conf: &str, requested: TypeInfo) -> Result<AnyValue, ErrorPtr>;
}

type ProvideFunction =
    ComponentInstancePtr<dyn Fn(&str, TypeInfo) -> Result<AnyValue, ErrorPtr> + Send + Sync>;

/// Uniform `(conf, requested type) -> value` view of any provider shape.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct ProviderAdapter {
    output: Option<TypeInfo>,
    #[derivative(Debug = "ignore")]
    provide: ProvideFunction,
}

impl ProviderAdapter {
    pub fn typed<T, P>(provider: ComponentInstancePtr<P>) -> Self
    where
        T: Any + Send + Sync,
        P: Provider<T> + ?Sized + 'static,
    {
        Self {
            output: Some(TypeInfo::of::<T>()),
            provide: ComponentInstancePtr::new(move |conf: &str, _: TypeInfo| {
                <P as Provider<T>>::provide(&provider, conf).map(|value| Box::new(value) as AnyValue)
            }),
        }
    }

    pub fn none_param<T, P>(provider: ComponentInstancePtr<P>) -> Self
    where
        T: Any + Send + Sync,
        P: NoneParamProvider<T> + ?Sized + 'static,
    {
        Self {
            output: Some(TypeInfo::of::<T>()),
            provide: ComponentInstancePtr::new(move |_: &str, _: TypeInfo| {
                <P as NoneParamProvider<T>>::provide(&provider)
                    .map(|value| Box::new(value) as AnyValue)
            }),
        }
    }

    pub fn named<P>(provider: ComponentInstancePtr<P>) -> Self
    where
        P: NamedProvider + ?Sized + 'static,
    {
        Self {
            output: None,
            provide: ComponentInstancePtr::new(move |conf: &str, requested: TypeInfo| {
                provider.provide(conf, requested)
            }),
        }
    }

    /// The declared output type; `None` for named providers.
    #[inline]
    pub fn output(&self) -> Option<TypeInfo> {
        self.output
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        self.output.is_none()
    }

    /// Checks if this provider can be asked for the given type. Named providers accept any type
    /// and their output is verified after providing.
    pub fn can_provide(&self, requested: TypeInfo) -> bool {
        self.output.map_or(true, |output| output == requested)
    }

    pub fn provide(&self, conf: &str, requested: TypeInfo) -> Result<AnyValue, ErrorPtr> {
        (self.provide)(conf, requested)
    }
}
