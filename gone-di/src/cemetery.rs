//! The container holding all registered components.
//!
//! A [Cemetery] is populated with components (goners) through [Cemetery::register], installed
//! once with [Cemetery::install] and then queried through [ComponentInstanceProvider] or the
//! typed helpers in [TypedComponentInstanceProvider](crate::instance_provider::TypedComponentInstanceProvider).

use crate::component::{Daemon, Goner};
use crate::component_registry::{CoffinId, ComponentRegistry, GonerOptions};
use crate::error::{ComponentInstanceProviderError, InstallError, RegistryError};
use crate::installer::Installer;
use crate::instance_provider::{
    AnyValue, ComponentInstanceProvider, ComponentInstancePtr, TypeInfo,
};
use fxhash::FxHashSet;
use itertools::Itertools;
use tracing::{debug, info};

/// Keys of loader functions which have already been executed.
#[derive(Clone, Default, Debug)]
pub struct LoadedSet(FxHashSet<&'static str>);

impl LoadedSet {
    pub fn is_loaded(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Marks the key as loaded. Returns `false` if it was already loaded.
    pub fn mark_loaded(&mut self, key: &'static str) -> bool {
        self.0.insert(key)
    }
}

/// Component container: registration, installation and lookup.
#[derive(Default, Debug)]
pub struct Cemetery {
    registry: ComponentRegistry,
    loaded: LoadedSet,
}

impl Cemetery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component and returns a pointer to it. The pointer can be kept, since fields
    /// are filled in place during install.
    pub fn register<C: Goner>(
        &mut self,
        goner: C,
        options: GonerOptions,
    ) -> Result<ComponentInstancePtr<C>, RegistryError> {
        let goner = ComponentInstancePtr::new(goner);
        self.register_ptr(goner.clone(), options)?;
        Ok(goner)
    }

    /// Registers an already shared component.
    pub fn register_ptr<C: Goner>(
        &mut self,
        goner: ComponentInstancePtr<C>,
        options: GonerOptions,
    ) -> Result<CoffinId, RegistryError> {
        self.registry.register(goner, options)
    }

    /// Runs a loader function unless a loader with the same key has already run.
    pub fn load_once<F>(&mut self, key: &'static str, load: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut Cemetery) -> Result<(), RegistryError>,
    {
        if self.loaded.is_loaded(key) {
            debug!(key, "Skipping already loaded components.");
            return Ok(());
        }

        load(self)?;
        self.loaded.mark_loaded(key);
        Ok(())
    }

    #[inline]
    pub fn loaded(&self) -> &LoadedSet {
        &self.loaded
    }

    /// Analyzes, orders, fills and initializes all registered components. Fails on the first
    /// error; components which have already been filled or initialized are skipped when called
    /// again.
    pub fn install(&mut self) -> Result<(), InstallError> {
        info!(components = self.registry.len(), "Installing components.");
        Installer::new(&mut self.registry).install()?;
        info!("Components installed.");
        Ok(())
    }

    #[inline]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// All registered daemons, ordered by start order and then by registration.
    pub fn daemons(&self) -> Vec<(String, ComponentInstancePtr<dyn Daemon>)> {
        self.registry
            .coffins()
            .filter_map(|(_, coffin)| {
                coffin
                    .hooks()
                    .daemon
                    .as_ref()
                    .map(|daemon| (coffin.order(), coffin.label().to_string(), daemon.clone()))
            })
            .sorted_by_key(|(order, _, _)| *order)
            .map(|(_, label, daemon)| (label, daemon))
            .collect()
    }
}

impl ComponentInstanceProvider for Cemetery {
    fn primary_instance(
        &self,
        type_info: TypeInfo,
    ) -> Result<AnyValue, ComponentInstanceProviderError> {
        let id = self
            .registry
            .pick_default(type_info, &self.registry.coffins_by_type(type_info))
            .ok_or_else(|| {
                ComponentInstanceProviderError::NoPrimaryInstance(type_info.name.to_string())
            })?;

        self.registry.coffin(id).cast(type_info).ok_or_else(|| {
            ComponentInstanceProviderError::IncompatibleComponent(type_info.name.to_string())
        })
    }

    fn instances(
        &self,
        type_info: TypeInfo,
    ) -> Result<Vec<AnyValue>, ComponentInstanceProviderError> {
        self.registry
            .coffins_by_type(type_info)
            .into_iter()
            .map(|id| {
                self.registry.coffin(id).cast(type_info).ok_or_else(|| {
                    ComponentInstanceProviderError::IncompatibleComponent(
                        type_info.name.to_string(),
                    )
                })
            })
            .try_collect()
    }

    fn instance_by_name(
        &self,
        name: &str,
        type_info: TypeInfo,
    ) -> Result<AnyValue, ComponentInstanceProviderError> {
        let id = self
            .registry
            .coffin_by_name(name)
            .ok_or_else(|| ComponentInstanceProviderError::NoNamedInstance(name.to_string()))?;

        self.registry.coffin(id).cast(type_info).ok_or_else(|| {
            ComponentInstanceProviderError::IncompatibleComponent(type_info.name.to_string())
        })
    }
}
