//! Injectable field slots and their annotations.
//!
//! Components hold their dependencies in write-once slots, which lets the container share a
//! component before its fields are filled:
//!
//! * [Inject] - a single value
//! * [InjectVec] - all resolved values, in resolution order
//! * [InjectMap] - all resolved values, keyed by the name of the component they come from
//!
//! A slot which has not been filled represents a missing (`allow_nil`) dependency.

use crate::instance_provider::{AnyValue, TypeInfo};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use thiserror::Error;

/// How many values a field takes.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum FieldShape {
    Single,
    Slice,
    Map,
}

/// Errors returned when filling a slot.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum SlotError {
    #[error("Value #{index} is not of type {expected}")]
    TypeMismatch { expected: TypeInfo, index: usize },
    #[error("Slot has already been filled")]
    AlreadyFilled,
    #[error("A single value slot cannot be filled with {0} values")]
    InvalidArity(usize),
}

/// Type-erased access to an injectable field.
pub trait FieldSlot: Send + Sync {
    fn shape(&self) -> FieldShape;

    /// The type of a single value held by the slot.
    fn element_type(&self) -> TypeInfo;

    fn is_filled(&self) -> bool;

    /// Fills the slot with `(source name, value)` pairs. Source names are used as keys by map
    /// slots.
    fn fill(&self, values: Vec<(String, AnyValue)>) -> Result<(), SlotError>;
}

fn downcast_value<T: Any>(value: AnyValue, index: usize) -> Result<T, SlotError> {
    value
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| SlotError::TypeMismatch {
            expected: TypeInfo::of::<T>(),
            index,
        })
}

/// A single injected value.
pub struct Inject<T> {
    cell: OnceCell<T>,
}

impl<T> Inject<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the injected value, or `None` if nothing has been injected.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Injects a value manually. Returns the value back if the slot was already filled.
    pub fn set(&self, value: T) -> Result<(), T> {
        self.cell.set(value)
    }
}

impl<T> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for Inject<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Inject").field(&self.cell.get()).finish()
    }
}

/// # Panics
///
/// Dereferencing an empty slot panics. Use [Inject::get] for optional dependencies.
impl<T> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.cell.get() {
            Some(value) => value,
            None => panic!(
                "Dependency of type {} has not been injected",
                std::any::type_name::<T>()
            ),
        }
    }
}

impl<T: Any + Send + Sync> FieldSlot for Inject<T> {
    fn shape(&self) -> FieldShape {
        FieldShape::Single
    }

    fn element_type(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn is_filled(&self) -> bool {
        self.cell.get().is_some()
    }

    fn fill(&self, values: Vec<(String, AnyValue)>) -> Result<(), SlotError> {
        if values.len() != 1 {
            return Err(SlotError::InvalidArity(values.len()));
        }

        let Some((_, value)) = values.into_iter().next() else {
            return Err(SlotError::InvalidArity(0));
        };

        self.cell
            .set(downcast_value::<T>(value, 0)?)
            .map_err(|_| SlotError::AlreadyFilled)
    }
}

/// All injected values of a given type.
pub struct InjectVec<T> {
    cell: OnceCell<Vec<T>>,
}

impl<T> InjectVec<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Option<&Vec<T>> {
        self.cell.get()
    }
}

impl<T> Default for InjectVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for InjectVec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("InjectVec").field(&self.cell.get()).finish()
    }
}

/// # Panics
///
/// Dereferencing a slot which has not been filled panics. Slices are always filled during
/// install, possibly with no values.
impl<T> Deref for InjectVec<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        match self.cell.get() {
            Some(values) => values,
            None => panic!(
                "Dependencies of type {} have not been injected",
                std::any::type_name::<T>()
            ),
        }
    }
}

impl<T: Any + Send + Sync> FieldSlot for InjectVec<T> {
    fn shape(&self) -> FieldShape {
        FieldShape::Slice
    }

    fn element_type(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn is_filled(&self) -> bool {
        self.cell.get().is_some()
    }

    fn fill(&self, values: Vec<(String, AnyValue)>) -> Result<(), SlotError> {
        let values = values
            .into_iter()
            .enumerate()
            .map(|(index, (_, value))| downcast_value::<T>(value, index))
            .collect::<Result<Vec<_>, _>>()?;

        self.cell.set(values).map_err(|_| SlotError::AlreadyFilled)
    }
}

/// All injected values of a given type, keyed by source component name.
pub struct InjectMap<T> {
    cell: OnceCell<HashMap<String, T>>,
}

impl<T> InjectMap<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Option<&HashMap<String, T>> {
        self.cell.get()
    }
}

impl<T> Default for InjectMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for InjectMap<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("InjectMap").field(&self.cell.get()).finish()
    }
}

/// # Panics
///
/// Dereferencing a slot which has not been filled panics.
impl<T> Deref for InjectMap<T> {
    type Target = HashMap<String, T>;

    fn deref(&self) -> &HashMap<String, T> {
        match self.cell.get() {
            Some(values) => values,
            None => panic!(
                "Dependencies of type {} have not been injected",
                std::any::type_name::<T>()
            ),
        }
    }
}

impl<T: Any + Send + Sync> FieldSlot for InjectMap<T> {
    fn shape(&self) -> FieldShape {
        FieldShape::Map
    }

    fn element_type(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn is_filled(&self) -> bool {
        self.cell.get().is_some()
    }

    fn fill(&self, values: Vec<(String, AnyValue)>) -> Result<(), SlotError> {
        let values = values
            .into_iter()
            .enumerate()
            .map(|(index, (key, value))| downcast_value::<T>(value, index).map(|value| (key, value)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        self.cell.set(values).map_err(|_| SlotError::AlreadyFilled)
    }
}

/// Static description of an injectable field.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct FieldMeta {
    pub name: &'static str,
    /// Dependency annotation: `name-or-pattern[,extend]`.
    pub tag: &'static str,
    /// Comma-separated option flags: `allow_nil`, `lazy`.
    pub options: &'static str,
}

/// An injectable field of a concrete component instance.
pub struct Field<'a> {
    pub meta: FieldMeta,
    pub slot: &'a dyn FieldSlot,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, slot: &'a dyn FieldSlot) -> Self {
        Self {
            meta: FieldMeta {
                name,
                tag: "",
                options: "",
            },
            slot,
        }
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.meta.tag = tag;
        self
    }

    pub fn options(mut self, options: &'static str) -> Self {
        self.meta.options = options;
        self
    }
}

impl Debug for Field<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("meta", &self.meta)
            .field("shape", &self.slot.shape())
            .field("element_type", &self.slot.element_type())
            .finish()
    }
}

/// Parsed dependency annotation.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct DependencyTag<'a> {
    /// Explicit name, wildcard pattern or empty for type-only lookup.
    pub pattern: &'a str,
    /// Configuration passed to providers and field injectors.
    pub extend: &'a str,
}

impl<'a> DependencyTag<'a> {
    pub fn parse(tag: &'a str) -> Self {
        let (pattern, extend) = tag.split_once(',').unwrap_or((tag, ""));
        Self {
            pattern: pattern.trim(),
            extend: extend.trim(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.pattern.contains(['*', '?'])
    }
}

/// Parsed field options.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash, Debug)]
pub struct FieldOptions {
    pub allow_nil: bool,
    pub lazy: bool,
}

impl FieldOptions {
    /// Parses a comma-separated option list. Unknown options are returned as errors.
    pub fn parse(options: &str) -> Result<Self, String> {
        options
            .split(',')
            .map(str::trim)
            .filter(|option| !option.is_empty())
            .try_fold(Self::default(), |mut result, option| {
                match option {
                    "allow_nil" | "allowNil" => result.allow_nil = true,
                    "lazy" => result.lazy = true,
                    _ => return Err(format!("unknown field option '{option}'")),
                }

                Ok(result)
            })
    }
}
