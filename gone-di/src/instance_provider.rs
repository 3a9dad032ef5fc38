//! Pointer types shared by the whole crate and type-erased access to registered instances.

use crate::error::ComponentInstanceProviderError;
use std::any::{type_name, Any, TypeId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub type ComponentInstancePtr<T> = Arc<T>;

pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + Send + Sync + 'static>;

/// A single injectable value: a component pointer, a `dyn Trait` pointer or a provided value.
pub type AnyValue = Box<dyn Any + Send + Sync>;

/// Error type returned by user hooks and providers.
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

/// Converts a type-erased component instance into a boxed pointer of one of its exposed types.
/// Returns `None` if the instance is not of the expected concrete type.
pub type CastFunction = fn(instance: &ComponentInstanceAnyPtr) -> Option<AnyValue>;

/// Runtime type identity paired with a readable name for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct TypeInfo {
    pub id: TypeId,
    pub name: &'static str,
}

impl TypeInfo {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Generic provider for registered instances. Lookups work on element types, i.e. the type a
/// field would hold, such as `ComponentInstancePtr<Worker>` or
/// `ComponentInstancePtr<dyn Trait + Send + Sync>`.
pub trait ComponentInstanceProvider {
    /// Tries to return a primary instance of a given type. A primary instance is either the only
    /// one registered or one marked as default for that type.
    fn primary_instance(
        &self,
        type_info: TypeInfo,
    ) -> Result<AnyValue, ComponentInstanceProviderError>;

    /// Returns all instances of a given type, in registration order.
    fn instances(&self, type_info: TypeInfo) -> Result<Vec<AnyValue>, ComponentInstanceProviderError>;

    /// Returns an instance with the given name, cast to the given type.
    fn instance_by_name(
        &self,
        name: &str,
        type_info: TypeInfo,
    ) -> Result<AnyValue, ComponentInstanceProviderError>;
}

/// Helper trait for [ComponentInstanceProvider] providing strongly-typed access.
pub trait TypedComponentInstanceProvider {
    /// Typesafe version of [ComponentInstanceProvider::primary_instance].
    fn primary_instance_typed<T: ?Sized + 'static>(
        &self,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError>;

    /// Tries to get an instance like [TypedComponentInstanceProvider::primary_instance_typed] does,
    /// but returns `None` on missing instance.
    fn primary_instance_option<T: ?Sized + 'static>(
        &self,
    ) -> Result<Option<ComponentInstancePtr<T>>, ComponentInstanceProviderError>;

    /// Typesafe version of [ComponentInstanceProvider::instances].
    fn instances_typed<T: ?Sized + 'static>(
        &self,
    ) -> Result<Vec<ComponentInstancePtr<T>>, ComponentInstanceProviderError>;

    /// Typesafe version of [ComponentInstanceProvider::instance_by_name].
    fn instance_by_name_typed<T: ?Sized + 'static>(
        &self,
        name: &str,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError>;
}

fn downcast<T: ?Sized + 'static>(
    value: AnyValue,
) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
    value
        .downcast::<ComponentInstancePtr<T>>()
        .map(|pointer| *pointer)
        .map_err(|_| {
            ComponentInstanceProviderError::IncompatibleComponent(
                TypeInfo::of::<ComponentInstancePtr<T>>().name.to_string(),
            )
        })
}

impl<CIP: ComponentInstanceProvider + ?Sized> TypedComponentInstanceProvider for CIP {
    fn primary_instance_typed<T: ?Sized + 'static>(
        &self,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        self.primary_instance(TypeInfo::of::<ComponentInstancePtr<T>>())
            .and_then(downcast)
    }

    fn primary_instance_option<T: ?Sized + 'static>(
        &self,
    ) -> Result<Option<ComponentInstancePtr<T>>, ComponentInstanceProviderError> {
        match self.primary_instance_typed::<T>() {
            Ok(instance) => Ok(Some(instance)),
            Err(ComponentInstanceProviderError::NoPrimaryInstance(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn instances_typed<T: ?Sized + 'static>(
        &self,
    ) -> Result<Vec<ComponentInstancePtr<T>>, ComponentInstanceProviderError> {
        self.instances(TypeInfo::of::<ComponentInstancePtr<T>>())?
            .into_iter()
            .map(downcast)
            .collect()
    }

    fn instance_by_name_typed<T: ?Sized + 'static>(
        &self,
        name: &str,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        self.instance_by_name(name, TypeInfo::of::<ComponentInstancePtr<T>>())
            .and_then(downcast)
    }
}

#[cfg(test)]
mod tests {
    use crate::instance_provider::{ComponentInstancePtr, TypeInfo};

    trait TestTrait {}

    #[test]
    fn should_compare_type_info_by_id() {
        assert_eq!(TypeInfo::of::<i8>(), TypeInfo::of::<i8>());
        assert_ne!(TypeInfo::of::<i8>(), TypeInfo::of::<u8>());
        assert_ne!(
            TypeInfo::of::<ComponentInstancePtr<dyn TestTrait + Send + Sync>>(),
            TypeInfo::of::<ComponentInstancePtr<dyn TestTrait>>()
        );
    }

    #[test]
    fn should_display_type_name() {
        assert_eq!(TypeInfo::of::<u32>().to_string(), "u32");
    }
}
