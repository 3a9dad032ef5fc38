//! Functionality related to registering components and looking them up.
//!
//! Every registered component is wrapped in a [Coffin], which holds the instance together with its
//! name, the types it exposes, its capabilities and its install state. Coffins are never removed;
//! a forced replacement swaps a coffin in place, keeping its position.

use crate::component::{Goner, Hooks, TypeBinding};
use crate::error::RegistryError;
use crate::instance_provider::{
    AnyValue, ComponentInstanceAnyPtr, ComponentInstancePtr, TypeInfo,
};
use crate::provider::ProviderAdapter;
use derivative::Derivative;
use fxhash::{FxHashMap, FxHashSet};
use glob::Pattern;
use itertools::Itertools;
use std::any::TypeId;
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

/// Start order of daemons which should be started before others.
pub const HIGH_START_PRIORITY: i32 = -100;

/// Start order of daemons without an explicit order.
pub const MEDIUM_START_PRIORITY: i32 = 0;

/// Start order of daemons which should be started after others.
pub const LOW_START_PRIORITY: i32 = 100;

/// Handle of a registered coffin. Handles are assigned in registration order.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct CoffinId(usize);

impl CoffinId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for CoffinId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registration options of a single component.
#[derive(Clone, Debug, Default)]
pub struct GonerOptions {
    name: Option<String>,
    default_for_all: bool,
    default_types: Vec<TypeInfo>,
    force_replace: bool,
    only_for_name: bool,
    order: i32,
    lazy_fill: bool,
    bindings: Vec<TypeBinding>,
}

impl GonerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the component under the given name, instead of its self-reported one.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks the component as the primary one for every type it exposes or provides.
    pub fn primary(mut self) -> Self {
        self.default_for_all = true;
        self
    }

    /// Marks the component as the default one for `ComponentInstancePtr<T>`.
    pub fn default_for<T: ?Sized + 'static>(self) -> Self {
        self.default_for_type(TypeInfo::of::<ComponentInstancePtr<T>>())
    }

    /// Marks the component as the default one for the given element type, which can also be a
    /// provided type.
    pub fn default_for_type(mut self, type_info: TypeInfo) -> Self {
        self.default_types.push(type_info);
        self
    }

    /// Replaces an already registered component with the same name or, if unnamed, the same
    /// concrete type.
    pub fn force_replace(mut self) -> Self {
        self.force_replace = true;
        self
    }

    /// Makes the component reachable only by name, never by type alone.
    pub fn only_for_name(mut self) -> Self {
        self.only_for_name = true;
        self
    }

    /// Sets the daemon start order; lower starts first.
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn high_start_priority(self) -> Self {
        self.order(HIGH_START_PRIORITY)
    }

    pub fn medium_start_priority(self) -> Self {
        self.order(MEDIUM_START_PRIORITY)
    }

    pub fn low_start_priority(self) -> Self {
        self.order(LOW_START_PRIORITY)
    }

    /// Fills the component after everything else, without taking part in install ordering.
    pub fn lazy_fill(mut self) -> Self {
        self.lazy_fill = true;
        self
    }

    /// Exposes the component as an additional type.
    pub fn implements(mut self, binding: TypeBinding) -> Self {
        self.bindings.push(binding);
        self
    }
}

/// A registered component with its metadata and install state.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Coffin {
    name: Option<String>,
    type_info: TypeInfo,
    #[derivative(Debug = "ignore")]
    goner: ComponentInstancePtr<dyn Goner>,
    #[derivative(Debug = "ignore")]
    instance: ComponentInstanceAnyPtr,
    exposed: Vec<TypeBinding>,
    defaults: FxHashSet<TypeId>,
    hooks: Hooks,
    only_for_name: bool,
    force_replace: bool,
    lazy_fill: bool,
    order: i32,
    pub(crate) is_filled: bool,
    pub(crate) is_initialized: bool,
}

impl Coffin {
    fn new<C: Goner>(goner: ComponentInstancePtr<C>, options: GonerOptions) -> Self {
        let name = options.name.or_else(|| goner.goner_name());
        let hooks = C::hooks(&goner);

        let exposed = [TypeBinding::of_self::<C>()]
            .into_iter()
            .chain(internal::aliases_of(TypeId::of::<C>()))
            .chain(options.bindings)
            .unique_by(|binding| binding.exposed)
            .collect_vec();

        let mut defaults: FxHashSet<TypeId> = options
            .default_types
            .iter()
            .map(|type_info| type_info.id)
            .chain(
                exposed
                    .iter()
                    .filter(|binding| binding.is_default)
                    .map(|binding| binding.exposed.id),
            )
            .collect();

        if options.default_for_all {
            defaults.extend(exposed.iter().map(|binding| binding.exposed.id));
            defaults.extend(
                hooks
                    .providers
                    .iter()
                    .filter_map(|provider| provider.output())
                    .map(|type_info| type_info.id),
            );
        }

        Self {
            name,
            type_info: TypeInfo::of::<C>(),
            goner: goner.clone(),
            instance: goner,
            exposed,
            defaults,
            hooks,
            only_for_name: options.only_for_name,
            force_replace: options.force_replace,
            lazy_fill: options.lazy_fill,
            order: options.order,
            is_filled: false,
            is_initialized: false,
        }
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name, or concrete type name for unnamed components.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.type_info.name)
    }

    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    pub fn goner(&self) -> &ComponentInstancePtr<dyn Goner> {
        &self.goner
    }

    #[inline]
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    #[inline]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[inline]
    pub fn is_only_for_name(&self) -> bool {
        self.only_for_name
    }

    #[inline]
    pub fn is_force_replace(&self) -> bool {
        self.force_replace
    }

    #[inline]
    pub fn is_lazy_fill(&self) -> bool {
        self.lazy_fill
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.is_filled
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// Checks if the component itself can be injected as the given element type.
    pub fn exposes(&self, type_info: TypeInfo) -> bool {
        self.exposed
            .iter()
            .any(|binding| binding.exposed == type_info)
    }

    pub fn is_default_for(&self, type_info: TypeInfo) -> bool {
        self.defaults.contains(&type_info.id)
    }

    /// Casts the component into the given element type.
    pub fn cast(&self, type_info: TypeInfo) -> Option<AnyValue> {
        self.exposed
            .iter()
            .find(|binding| binding.exposed == type_info)
            .and_then(|binding| (binding.cast)(&self.instance))
    }

    /// Returns a typed provider for the given type.
    pub fn typed_provider_for(&self, type_info: TypeInfo) -> Option<&ProviderAdapter> {
        self.hooks
            .providers
            .iter()
            .find(|provider| !provider.is_named() && provider.can_provide(type_info))
    }

    /// Returns a provider which can be asked for the given type, preferring typed ones.
    pub fn provider_for(&self, type_info: TypeInfo) -> Option<&ProviderAdapter> {
        self.typed_provider_for(type_info).or_else(|| {
            self.hooks
                .providers
                .iter()
                .find(|provider| provider.is_named() && provider.can_provide(type_info))
        })
    }

    /// Checks if the component needs to be initialized before anything can safely read it.
    pub fn needs_init_before_use(&self) -> bool {
        self.hooks.initiator.is_some()
            || self.hooks.field_injector.is_some()
            || !self.hooks.providers.is_empty()
    }
}

/// Registry of all coffins, indexed by name, default markers and provided types.
#[derive(Default, Debug)]
pub struct ComponentRegistry {
    coffins: Vec<Coffin>,
    names: FxHashMap<String, CoffinId>,
    defaults: FxHashMap<TypeId, CoffinId>,
    providers: FxHashMap<TypeId, Vec<CoffinId>>,
}

impl ComponentRegistry {
    /// Registers a component. Conflicting names (or, for unnamed components, types) are rejected
    /// unless the component is registered with [GonerOptions::force_replace].
    pub fn register<C: Goner>(
        &mut self,
        goner: ComponentInstancePtr<C>,
        options: GonerOptions,
    ) -> Result<CoffinId, RegistryError> {
        let coffin = Coffin::new(goner, options);

        let replaced = match &coffin.name {
            Some(name) => match self.names.get(name) {
                Some(id) if coffin.force_replace => Some(*id),
                Some(_) => {
                    return Err(RegistryError::AlreadyRegistered { name: name.clone() });
                }
                None => None,
            },
            None if coffin.force_replace => self
                .coffins
                .iter()
                .position(|existing| existing.type_info == coffin.type_info)
                .map(CoffinId),
            None => None,
        };

        for type_id in &coffin.defaults {
            if let Some(existing) = self.defaults.get(type_id) {
                if Some(*existing) != replaced {
                    let type_name = coffin
                        .exposed
                        .iter()
                        .map(|binding| binding.exposed)
                        .chain(coffin.hooks.providers.iter().filter_map(|p| p.output()))
                        .find(|type_info| type_info.id == *type_id)
                        .map_or("<unknown>", |type_info| type_info.name);

                    return Err(RegistryError::DuplicateDefault {
                        type_name: type_name.to_string(),
                        existing: describe(&self.coffins[existing.0]),
                        incoming: describe(&coffin),
                    });
                }
            }
        }

        let id = match replaced {
            Some(id) => {
                debug!(
                    component = %describe(&coffin),
                    replaced = %describe(&self.coffins[id.0]),
                    "Replacing component."
                );

                self.unindex(id);
                self.coffins[id.0] = coffin;
                id
            }
            None => {
                debug!(component = %describe(&coffin), "Registering component.");

                self.coffins.push(coffin);
                CoffinId(self.coffins.len() - 1)
            }
        };

        self.index(id);
        Ok(id)
    }

    fn index(&mut self, id: CoffinId) {
        let coffin = &self.coffins[id.0];
        if let Some(name) = &coffin.name {
            self.names.insert(name.clone(), id);
        }

        for type_id in &coffin.defaults {
            self.defaults.insert(*type_id, id);
        }

        for output in coffin.hooks.providers.iter().filter_map(|p| p.output()) {
            let providers = self.providers.entry(output.id).or_default();
            if let Err(position) = providers.binary_search(&id) {
                providers.insert(position, id);
            }
        }
    }

    fn unindex(&mut self, id: CoffinId) {
        self.names.retain(|_, existing| *existing != id);
        self.defaults.retain(|_, existing| *existing != id);
        for providers in self.providers.values_mut() {
            providers.retain(|existing| *existing != id);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coffins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coffins.is_empty()
    }

    /// # Panics
    ///
    /// Panics if the id does not come from this registry.
    #[inline]
    pub fn coffin(&self, id: CoffinId) -> &Coffin {
        &self.coffins[id.0]
    }

    #[inline]
    pub(crate) fn coffin_mut(&mut self, id: CoffinId) -> &mut Coffin {
        &mut self.coffins[id.0]
    }

    /// All coffins in registration order.
    pub fn coffins(&self) -> impl Iterator<Item = (CoffinId, &Coffin)> {
        self.coffins
            .iter()
            .enumerate()
            .map(|(index, coffin)| (CoffinId(index), coffin))
    }

    pub fn coffin_by_name(&self, name: &str) -> Option<CoffinId> {
        self.names.get(name).copied()
    }

    /// Coffins which can be injected directly as the given type, excluding name-only ones.
    pub fn coffins_by_type(&self, type_info: TypeInfo) -> Vec<CoffinId> {
        self.coffins()
            .filter(|(_, coffin)| !coffin.only_for_name && coffin.exposes(type_info))
            .map(|(id, _)| id)
            .collect()
    }

    /// Coffins with a typed provider of the given type, excluding name-only ones.
    pub fn providers_by_type(&self, type_info: TypeInfo) -> Vec<CoffinId> {
        self.providers
            .get(&type_info.id)
            .map(|providers| {
                providers
                    .iter()
                    .copied()
                    .filter(|id| !self.coffins[id.0].only_for_name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Type-compatible coffins whose name matches a glob-style pattern. Unnamed coffins are
    /// matched as an empty name.
    pub fn coffins_by_type_and_pattern(
        &self,
        type_info: TypeInfo,
        pattern: &str,
    ) -> Result<Vec<CoffinId>, glob::PatternError> {
        let pattern = Pattern::new(pattern)?;
        Ok(self
            .coffins()
            .filter(|(_, coffin)| {
                (coffin.exposes(type_info) || coffin.typed_provider_for(type_info).is_some())
                    && pattern.matches(coffin.name().unwrap_or_default())
            })
            .map(|(id, _)| id)
            .collect())
    }

    /// Selects the default coffin for a type: a direct candidate if there is any, otherwise a
    /// typed provider.
    pub fn select_default(&self, type_info: TypeInfo) -> Option<CoffinId> {
        let candidates = self.coffins_by_type(type_info);
        if candidates.is_empty() {
            self.pick_default(type_info, &self.providers_by_type(type_info))
        } else {
            self.pick_default(type_info, &candidates)
        }
    }

    /// Picks a coffin among candidates, preferring one marked as default for the type. Ambiguous
    /// candidates resolve to the first one.
    pub fn pick_default(&self, type_info: TypeInfo, candidates: &[CoffinId]) -> Option<CoffinId> {
        match candidates {
            [] => None,
            [single] => Some(*single),
            [first, ..] => {
                if let Some(default) = self.defaults.get(&type_info.id) {
                    if candidates.contains(default) {
                        return Some(*default);
                    }
                }

                warn!(
                    type_name = type_info.name,
                    candidates = candidates.len(),
                    selected = %describe(&self.coffins[first.0]),
                    "Multiple components found without a default; selecting the first one."
                );

                Some(*first)
            }
        }
    }
}

/// Human-readable identification of a coffin used in diagnostics.
pub fn describe(coffin: &Coffin) -> String {
    format!("\"{}\"", coffin.label())
}

#[doc(hidden)]
pub mod internal {
    use crate::component::TypeBinding;
    use inventory::collect;
    pub use inventory::submit;
    use std::any::TypeId;

    #[derive(Clone, Copy, Debug)]
    pub struct ComponentAliasDefinition {
        pub target_type: TypeId,
        pub binding: TypeBinding,
    }

    pub struct ComponentAliasRegisterer {
        pub register: fn() -> ComponentAliasDefinition,
    }

    collect!(ComponentAliasRegisterer);

    pub(crate) fn aliases_of(target_type: TypeId) -> impl Iterator<Item = TypeBinding> {
        inventory::iter::<ComponentAliasRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
            .filter(move |definition| definition.target_type == target_type)
            .map(|definition| definition.binding)
    }
}

#[cfg(test)]
mod tests {
    use crate::component::{Goner, Hooks, TypeBinding};
    use crate::component_registry::{ComponentRegistry, GonerOptions};
    use crate::error::RegistryError;
    use crate::instance_provider::{
        AnyValue, ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr, TypeInfo,
    };
    use crate::provider::{NamedProvider, NoneParamProvider, ProviderAdapter};

    trait Service {}

    struct Worker(i8);

    impl Goner for Worker {}

    impl Service for Worker {}

    struct Named;

    impl Goner for Named {
        fn goner_name(&self) -> Option<String> {
            Some("self-named".to_string())
        }
    }

    struct Counter;

    impl Goner for Counter {
        fn hooks(this: &ComponentInstancePtr<Self>) -> Hooks {
            Hooks::default().with_provider(ProviderAdapter::none_param::<u32, _>(this.clone()))
        }
    }

    impl NoneParamProvider<u32> for Counter {
        fn provide(&self) -> Result<u32, ErrorPtr> {
            Ok(42)
        }
    }

    struct Catalog;

    impl Goner for Catalog {
        fn hooks(this: &ComponentInstancePtr<Self>) -> Hooks {
            Hooks::default()
                .with_provider(ProviderAdapter::named(this.clone()))
                .with_provider(ProviderAdapter::none_param::<u32, _>(this.clone()))
        }
    }

    impl NoneParamProvider<u32> for Catalog {
        fn provide(&self) -> Result<u32, ErrorPtr> {
            Ok(7)
        }
    }

    impl NamedProvider for Catalog {
        fn provide(&self, _conf: &str, _requested: TypeInfo) -> Result<AnyValue, ErrorPtr> {
            Ok(Box::new(8_u8))
        }
    }

    fn cast_service(instance: &ComponentInstanceAnyPtr) -> Option<AnyValue> {
        instance.clone().downcast::<Worker>().ok().map(|worker| {
            Box::new(worker as ComponentInstancePtr<dyn Service + Send + Sync>) as AnyValue
        })
    }

    fn service_binding() -> TypeBinding {
        TypeBinding::of::<dyn Service + Send + Sync>(cast_service)
    }

    fn worker_type() -> TypeInfo {
        TypeInfo::of::<ComponentInstancePtr<Worker>>()
    }

    fn service_type() -> TypeInfo {
        TypeInfo::of::<ComponentInstancePtr<dyn Service + Send + Sync>>()
    }

    fn worker(
        registry: &mut ComponentRegistry,
        value: i8,
        options: GonerOptions,
    ) -> Result<crate::component_registry::CoffinId, RegistryError> {
        registry.register(ComponentInstancePtr::new(Worker(value)), options)
    }

    fn worker_value(registry: &ComponentRegistry, id: crate::component_registry::CoffinId) -> i8 {
        registry
            .coffin(id)
            .cast(worker_type())
            .unwrap()
            .downcast::<ComponentInstancePtr<Worker>>()
            .unwrap()
            .0
    }

    #[test]
    fn should_register_by_name() {
        let mut registry = ComponentRegistry::default();
        let id = worker(&mut registry, 1, GonerOptions::new().name("w1")).unwrap();

        assert_eq!(registry.coffin_by_name("w1"), Some(id));
        assert_eq!(registry.coffin(id).name(), Some("w1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_use_self_reported_name() {
        let mut registry = ComponentRegistry::default();
        let id = registry
            .register(ComponentInstancePtr::new(Named), GonerOptions::new())
            .unwrap();

        assert_eq!(registry.coffin_by_name("self-named"), Some(id));
    }

    #[test]
    fn should_not_register_duplicate_name() {
        let mut registry = ComponentRegistry::default();
        worker(&mut registry, 1, GonerOptions::new().name("w")).unwrap();

        assert_eq!(
            worker(&mut registry, 2, GonerOptions::new().name("w")),
            Err(RegistryError::AlreadyRegistered {
                name: "w".to_string()
            })
        );
    }

    #[test]
    fn should_replace_duplicate_name_in_place() {
        let mut registry = ComponentRegistry::default();
        worker(&mut registry, 0, GonerOptions::new()).unwrap();
        let first = worker(&mut registry, 1, GonerOptions::new().name("w")).unwrap();
        let second = worker(&mut registry, 2, GonerOptions::new().name("w").force_replace()).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 2);
        assert_eq!(worker_value(&registry, second), 2);
        assert_eq!(registry.coffin_by_name("w"), Some(second));
    }

    #[test]
    fn should_replace_unnamed_by_type() {
        let mut registry = ComponentRegistry::default();
        let first = worker(&mut registry, 1, GonerOptions::new()).unwrap();
        let second = worker(&mut registry, 2, GonerOptions::new().force_replace()).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.coffins_by_type(worker_type()), vec![second]);
    }

    #[test]
    fn should_reject_duplicate_default() {
        let mut registry = ComponentRegistry::default();
        worker(&mut registry, 1, GonerOptions::new().name("a").primary()).unwrap();

        assert!(matches!(
            worker(&mut registry, 2, GonerOptions::new().name("b").primary()),
            Err(RegistryError::DuplicateDefault { .. })
        ));
    }

    #[test]
    fn should_allow_default_when_replacing_default() {
        let mut registry = ComponentRegistry::default();
        worker(&mut registry, 1, GonerOptions::new().name("a").primary()).unwrap();

        let id = worker(
            &mut registry,
            2,
            GonerOptions::new().name("a").primary().force_replace(),
        )
        .unwrap();

        assert_eq!(registry.select_default(worker_type()), Some(id));
    }

    #[test]
    fn should_select_marked_default_regardless_of_order() {
        for default_first in [true, false] {
            let mut registry = ComponentRegistry::default();
            let (first_options, second_options) = if default_first {
                (GonerOptions::new().primary(), GonerOptions::new())
            } else {
                (GonerOptions::new(), GonerOptions::new().primary())
            };

            let first = worker(&mut registry, 1, first_options).unwrap();
            let second = worker(&mut registry, 2, second_options).unwrap();

            assert_eq!(
                registry.select_default(worker_type()),
                Some(if default_first { first } else { second })
            );
        }
    }

    #[test]
    fn should_select_first_without_default() {
        let mut registry = ComponentRegistry::default();
        let first = worker(&mut registry, 1, GonerOptions::new()).unwrap();
        worker(&mut registry, 2, GonerOptions::new()).unwrap();

        assert_eq!(registry.select_default(worker_type()), Some(first));
    }

    #[test]
    fn should_expose_implemented_types() {
        let mut registry = ComponentRegistry::default();
        let id = worker(
            &mut registry,
            1,
            GonerOptions::new().implements(service_binding()),
        )
        .unwrap();

        assert_eq!(registry.coffins_by_type(service_type()), vec![id]);
        assert!(registry
            .coffin(id)
            .cast(service_type())
            .unwrap()
            .downcast::<ComponentInstancePtr<dyn Service + Send + Sync>>()
            .is_ok());
    }

    #[test]
    fn should_mark_default_for_given_type_only() {
        let mut registry = ComponentRegistry::default();
        worker(
            &mut registry,
            1,
            GonerOptions::new().implements(service_binding()),
        )
        .unwrap();
        let second = worker(
            &mut registry,
            2,
            GonerOptions::new()
                .implements(service_binding())
                .default_for::<dyn Service + Send + Sync>(),
        )
        .unwrap();

        assert_eq!(registry.select_default(service_type()), Some(second));
        assert!(!registry.coffin(second).is_default_for(worker_type()));
    }

    #[test]
    fn should_exclude_only_for_name_from_type_lookup() {
        let mut registry = ComponentRegistry::default();
        let hidden = worker(&mut registry, 1, GonerOptions::new().name("hidden").only_for_name())
            .unwrap();

        assert!(registry.coffins_by_type(worker_type()).is_empty());
        assert_eq!(registry.select_default(worker_type()), None);
        assert_eq!(registry.coffin_by_name("hidden"), Some(hidden));
        assert_eq!(
            registry
                .coffins_by_type_and_pattern(worker_type(), "hid*")
                .unwrap(),
            vec![hidden]
        );
    }

    #[test]
    fn should_match_wildcard_patterns() {
        let mut registry = ComponentRegistry::default();
        let foo_a = worker(&mut registry, 1, GonerOptions::new().name("foo-a")).unwrap();
        let foo_123 = worker(&mut registry, 2, GonerOptions::new().name("foo-123")).unwrap();
        worker(&mut registry, 3, GonerOptions::new().name("bar-a")).unwrap();
        let foo_abc = worker(&mut registry, 4, GonerOptions::new().name("foo-abc")).unwrap();
        registry
            .register(ComponentInstancePtr::new(Named), GonerOptions::new().name("foo-x"))
            .unwrap();

        assert_eq!(
            registry
                .coffins_by_type_and_pattern(worker_type(), "foo-*")
                .unwrap(),
            vec![foo_a, foo_123, foo_abc]
        );
        assert_eq!(
            registry
                .coffins_by_type_and_pattern(worker_type(), "foo-?23")
                .unwrap(),
            vec![foo_123]
        );
        assert_eq!(
            registry
                .coffins_by_type_and_pattern(worker_type(), "foo-?")
                .unwrap(),
            vec![foo_a]
        );
    }

    #[test]
    fn should_reject_invalid_pattern() {
        let registry = ComponentRegistry::default();

        assert!(registry
            .coffins_by_type_and_pattern(worker_type(), "[*")
            .is_err());
    }

    #[test]
    fn should_index_typed_providers() {
        let mut registry = ComponentRegistry::default();
        let id = registry
            .register(ComponentInstancePtr::new(Counter), GonerOptions::new())
            .unwrap();

        let u32_type = TypeInfo::of::<u32>();
        assert_eq!(registry.providers_by_type(u32_type), vec![id]);
        assert_eq!(registry.select_default(u32_type), Some(id));
        assert!(registry.coffin(id).needs_init_before_use());
        assert!(registry.coffin(id).provider_for(u32_type).is_some());
        assert!(registry.coffin(id).provider_for(TypeInfo::of::<u8>()).is_none());
    }

    #[test]
    fn should_prefer_typed_provider_over_named() {
        let mut registry = ComponentRegistry::default();
        let id = registry
            .register(ComponentInstancePtr::new(Catalog), GonerOptions::new())
            .unwrap();
        let coffin = registry.coffin(id);

        let typed = coffin.provider_for(TypeInfo::of::<u32>()).unwrap();
        assert_eq!(typed.output(), Some(TypeInfo::of::<u32>()));

        let named = coffin.provider_for(TypeInfo::of::<u8>()).unwrap();
        assert!(named.is_named());
        assert!(coffin.typed_provider_for(TypeInfo::of::<u8>()).is_none());
        assert!(registry.providers_by_type(TypeInfo::of::<u8>()).is_empty());
    }

    #[test]
    fn should_not_mark_primary_when_built_with_new() {
        let mut registry = ComponentRegistry::default();
        let first = worker(&mut registry, 1, GonerOptions::new()).unwrap();
        worker(&mut registry, 2, GonerOptions::default()).unwrap();
        let primary = worker(&mut registry, 3, GonerOptions::new().primary()).unwrap();

        assert!(!registry.coffin(first).is_default_for(worker_type()));
        assert!(registry.coffin(primary).is_default_for(worker_type()));
        assert_eq!(registry.select_default(worker_type()), Some(primary));
    }
}
