//! The basic building block of dependency injection is a [Goner]. Goners are injectable
//! components, which declare their own dependencies through annotated fields.
//!
//! ## Declaring components
//!
//! Any type which wants to be managed by the DI system needs to implement `Goner`. For
//! convenience, the trait can be derived if the `derive` feature is enabled:
//!
//! ```
//! use gone_di::component::Initiator;
//! use gone_di::field::{Inject, InjectMap, InjectVec};
//! use gone_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
//! use gone_di::{goner_alias, Goner};
//!
//! trait Greeter {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Goner)]
//! #[goner(name = "english")]
//! struct EnglishGreeter;
//!
//! #[goner_alias(default)]
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! #[derive(Goner, Default)]
//! #[goner(init)]
//! struct Greeting {
//!     // the default `dyn Greeter`
//!     #[gone]
//!     greeter: Inject<ComponentInstancePtr<dyn Greeter + Send + Sync>>,
//!     // a component named "english"
//!     #[gone(name = "english")]
//!     english: Inject<ComponentInstancePtr<EnglishGreeter>>,
//!     // every greeter with a name matching the pattern, keyed by name
//!     #[gone(name = "*")]
//!     by_name: InjectMap<ComponentInstancePtr<dyn Greeter + Send + Sync>>,
//!     // all greeters; left empty if there are none
//!     #[gone]
//!     all: InjectVec<ComponentInstancePtr<dyn Greeter + Send + Sync>>,
//!     // optional dependency
//!     #[gone(allow_nil)]
//!     missing: Inject<ComponentInstancePtr<Greeting>>,
//!     // not injected
//!     counter: u32,
//! }
//!
//! impl Initiator for Greeting {
//!     fn init(&self) -> Result<(), ErrorPtr> {
//!         Ok(())
//!     }
//! }
//! ```
//!
//! ### Supported `#[goner]` struct configuration
//!
//! * `name = "name"` - report the given name as the component name
//! * `name` - report the struct name converted to snake case as the component name
//! * `init` - the component implements [Initiator]
//! * `infallible_init` - the component implements [InfallibleInitiator]
//! * `before_fill` - the component implements [BeforeFill]
//! * `field_injector` - the component implements [FieldInjector]
//! * `daemon` - the component implements [Daemon]
//! * `provider = "Type"` - the component implements [Provider<Type>](crate::provider::Provider)
//! (can be repeated)
//! * `none_param_provider = "Type"` - the component implements
//! [NoneParamProvider<Type>](crate::provider::NoneParamProvider) (can be repeated)
//! * `named_provider` - the component implements [NamedProvider](crate::provider::NamedProvider)
//!
//! ### Supported `#[gone]` field configuration
//!
//! * `name = "name"` - inject the component named `name`; `*` and `?` make it a wildcard pattern
//! * `extend = "conf"` - configuration string passed to providers and field injectors
//! * `tag = "name,conf"` - the raw annotation, as an alternative to `name` and `extend`
//! * `allow_nil` - leave the field empty instead of failing when nothing can be resolved
//! * `lazy` - resolve the field without taking part in install ordering
//!
//! Fields without `#[gone]` are not touched by the container.
//!
//! ## Registering component aliases
//!
//! Aliases are `dyn Trait` types which can refer to a concrete component. Use `#[goner_alias]` on a
//! trait implementation to make `ComponentInstancePtr<dyn Trait + Send + Sync>` injectable. With
//! `#[goner_alias(default)]` the component becomes the default one for the trait type.

use crate::field::{Field, FieldMeta, FieldSlot};
use crate::instance_provider::{
    AnyValue, CastFunction, ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr, TypeInfo,
};
use crate::provider::ProviderAdapter;
use std::any::Any;
use std::fmt::{Debug, Formatter};
#[cfg(test)]
use mockall::automock;

/// Base trait for components managed by a [Cemetery](crate::cemetery::Cemetery).
///
/// Implementations are normally derived. Please see the module-level documentation for more
/// information.
pub trait Goner: Any + Send + Sync {
    /// Returns the accessor table of all injectable fields.
    fn fields(&self) -> Vec<Field<'_>> {
        Vec::new()
    }

    /// Returns the name this component should be registered under, if not given explicitly.
    fn goner_name(&self) -> Option<String> {
        None
    }

    /// Returns the capability table of a registered instance.
    fn hooks(this: &ComponentInstancePtr<Self>) -> Hooks
    where
        Self: Sized,
    {
        let _ = this;
        Hooks::default()
    }
}

/// Called before any field of the component is filled.
#[cfg_attr(test, automock)]
pub trait BeforeFill: Send + Sync {
    fn before_fill(&self) -> Result<(), ErrorPtr>;
}

/// Called after the component has been filled and every dependency needing initialization has
/// been initialized.
#[cfg_attr(test, automock)]
pub trait Initiator: Send + Sync {
    fn init(&self) -> Result<(), ErrorPtr>;
}

/// Initialization hook which cannot fail.
#[cfg_attr(test, automock)]
pub trait InfallibleInitiator: Send + Sync {
    fn init(&self);
}

/// A component which knows how to populate arbitrary fields of other components, rather than
/// being injected by reference. Fields referring to it by name are handed over whole, so slice
/// and map fields get all their values from a single [FieldSlot::fill] call.
pub trait FieldInjector: Send + Sync {
    fn inject(&self, conf: &str, field: &FieldMeta, slot: &dyn FieldSlot) -> Result<(), ErrorPtr>;
}

/// A long-running component started after install and stopped on shutdown.
#[cfg_attr(test, automock)]
pub trait Daemon: Send + Sync {
    fn start(&self) -> Result<(), ErrorPtr>;

    fn stop(&self) -> Result<(), ErrorPtr>;
}

struct InfallibleAdapter<I: ?Sized>(ComponentInstancePtr<I>);

impl<I: InfallibleInitiator + ?Sized> Initiator for InfallibleAdapter<I> {
    fn init(&self) -> Result<(), ErrorPtr> {
        self.0.init();
        Ok(())
    }
}

/// Optional capabilities of a single component instance.
#[derive(Clone, Default)]
pub struct Hooks {
    pub before_fill: Option<ComponentInstancePtr<dyn BeforeFill>>,
    pub initiator: Option<ComponentInstancePtr<dyn Initiator>>,
    pub field_injector: Option<ComponentInstancePtr<dyn FieldInjector>>,
    pub daemon: Option<ComponentInstancePtr<dyn Daemon>>,
    pub providers: Vec<ProviderAdapter>,
}

impl Hooks {
    pub fn with_before_fill<B: BeforeFill + 'static>(mut self, hook: ComponentInstancePtr<B>) -> Self {
        self.before_fill = Some(hook);
        self
    }

    pub fn with_initiator<I: Initiator + 'static>(mut self, hook: ComponentInstancePtr<I>) -> Self {
        self.initiator = Some(hook);
        self
    }

    pub fn with_infallible_initiator<I: InfallibleInitiator + 'static>(
        mut self,
        hook: ComponentInstancePtr<I>,
    ) -> Self {
        self.initiator = Some(ComponentInstancePtr::new(InfallibleAdapter(hook)));
        self
    }

    pub fn with_field_injector<F: FieldInjector + 'static>(
        mut self,
        injector: ComponentInstancePtr<F>,
    ) -> Self {
        self.field_injector = Some(injector);
        self
    }

    pub fn with_daemon<D: Daemon + 'static>(mut self, daemon: ComponentInstancePtr<D>) -> Self {
        self.daemon = Some(daemon);
        self
    }

    pub fn with_provider(mut self, provider: ProviderAdapter) -> Self {
        self.providers.push(provider);
        self
    }
}

impl Debug for Hooks {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("before_fill", &self.before_fill.is_some())
            .field("initiator", &self.initiator.is_some())
            .field("field_injector", &self.field_injector.is_some())
            .field("daemon", &self.daemon.is_some())
            .field("providers", &self.providers)
            .finish()
    }
}

/// A type exposed by a component, along with a way to cast the component instance into it.
#[derive(Clone, Copy, Debug)]
pub struct TypeBinding {
    /// The element type a field would hold, e.g. `ComponentInstancePtr<dyn Trait + Send + Sync>`.
    pub exposed: TypeInfo,
    pub cast: CastFunction,
    pub is_default: bool,
}

impl TypeBinding {
    /// Creates a binding exposing `ComponentInstancePtr<T>`.
    pub fn of<T: ?Sized + 'static>(cast: CastFunction) -> Self {
        Self {
            exposed: TypeInfo::of::<ComponentInstancePtr<T>>(),
            cast,
            is_default: false,
        }
    }

    /// Creates a binding exposing the concrete component type itself.
    pub fn of_self<C: Goner>() -> Self {
        Self::of::<C>(cast_self::<C>)
    }

    /// Marks the binding as the default one for its exposed type.
    pub fn default_if(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

fn cast_self<C: Goner>(instance: &ComponentInstanceAnyPtr) -> Option<AnyValue> {
    instance
        .clone()
        .downcast::<C>()
        .ok()
        .map(|instance| Box::new(instance) as AnyValue)
}
