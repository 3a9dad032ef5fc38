//! Turns annotated fields into a graph of fill/init dependencies.
//!
//! Every coffin is represented by two nodes: its [Action::Fill] and its [Action::Init]. A coffin's
//! fill depends on the init of every resolved dependency which needs initialization before use,
//! and its init depends on its own fill. Coffins registered with `lazy_fill` have no fill node and
//! are filled after everything else.

use crate::component_registry::{describe, CoffinId, ComponentRegistry};
use crate::error::InstallError;
use crate::field::{DependencyTag, Field, FieldOptions, FieldShape};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Install phase of a single coffin.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Action {
    Fill,
    Init,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Fill => "fill",
            Action::Init => "init",
        })
    }
}

/// A coffin which needs to reach the given phase.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Dependency {
    pub coffin: CoffinId,
    pub action: Action,
}

impl Dependency {
    #[inline]
    pub fn fill(coffin: CoffinId) -> Self {
        Self {
            coffin,
            action: Action::Fill,
        }
    }

    #[inline]
    pub fn init(coffin: CoffinId) -> Self {
        Self {
            coffin,
            action: Action::Init,
        }
    }

    /// Formats the dependency as `<action of "name">`.
    pub fn describe(&self, registry: &ComponentRegistry) -> String {
        format!(
            "<{} of {}>",
            self.action,
            describe(registry.coffin(self.coffin))
        )
    }
}

/// Parsed annotation of a field.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldDescriptor<'a> {
    pub tag: DependencyTag<'a>,
    pub options: FieldOptions,
}

pub(crate) fn describe_field<'a>(
    registry: &ComponentRegistry,
    owner: CoffinId,
    field: &Field<'a>,
) -> Result<FieldDescriptor<'a>, InstallError> {
    let options = FieldOptions::parse(field.meta.options).map_err(|reason| {
        InstallError::MalformedComponent {
            component: describe(registry.coffin(owner)),
            reason: format!("field '{}': {reason}", field.meta.name),
        }
    })?;

    Ok(FieldDescriptor {
        tag: DependencyTag::parse(field.meta.tag),
        options,
    })
}

/// Resolves a field to the coffins its value(s) should come from. A single value field resolves
/// to at most one coffin; an empty result is only returned if it's not an error.
pub(crate) fn resolve_field(
    registry: &ComponentRegistry,
    owner: CoffinId,
    field: &Field,
    descriptor: &FieldDescriptor,
) -> Result<Vec<CoffinId>, InstallError> {
    let element_type = field.slot.element_type();
    let shape = field.slot.shape();
    let pattern = descriptor.tag.pattern;

    let sources = if descriptor.tag.is_wildcard() {
        let candidates = registry
            .coffins_by_type_and_pattern(element_type, pattern)
            .map_err(|error| InstallError::MalformedComponent {
                component: describe(registry.coffin(owner)),
                reason: format!("field '{}': invalid pattern '{pattern}': {error}", field.meta.name),
            })?;

        match shape {
            FieldShape::Single => registry
                .pick_default(element_type, &candidates)
                .into_iter()
                .collect(),
            FieldShape::Slice | FieldShape::Map => candidates,
        }
    } else if !pattern.is_empty() {
        match registry.coffin_by_name(pattern) {
            Some(id) => {
                let coffin = registry.coffin(id);
                let compatible = coffin.exposes(element_type)
                    || coffin.provider_for(element_type).is_some()
                    || coffin.hooks().field_injector.is_some();

                if !compatible {
                    return Err(InstallError::TypeMismatch {
                        component: describe(registry.coffin(owner)),
                        field: field.meta.name.to_string(),
                        expected: element_type.name.to_string(),
                        actual: format!("{} {}", coffin.type_info(), describe(coffin)),
                    });
                }

                vec![id]
            }
            None => vec![],
        }
    } else {
        match shape {
            FieldShape::Single => registry.select_default(element_type).into_iter().collect(),
            FieldShape::Slice | FieldShape::Map => registry
                .coffins_by_type(element_type)
                .into_iter()
                .chain(registry.providers_by_type(element_type))
                .unique()
                .collect(),
        }
    };

    if sources.is_empty() && shape == FieldShape::Single && !descriptor.options.allow_nil {
        return Err(InstallError::UnsatisfiedDependency {
            component: describe(registry.coffin(owner)),
            field: field.meta.name.to_string(),
            requested: if pattern.is_empty() {
                element_type.name.to_string()
            } else {
                format!("{} named \"{pattern}\"", element_type.name)
            },
        });
    }

    Ok(sources)
}

/// Builds the dependency graph of all registered coffins, mapping each node to its prerequisites.
pub fn analyze(
    registry: &ComponentRegistry,
) -> Result<BTreeMap<Dependency, Vec<Dependency>>, InstallError> {
    let mut graph = BTreeMap::new();

    for (id, coffin) in registry.coffins() {
        if coffin.is_lazy_fill() {
            graph.insert(Dependency::init(id), vec![]);
            continue;
        }

        let goner = coffin.goner().clone();
        let mut prerequisites = Vec::new();

        for field in goner.fields() {
            let descriptor = describe_field(registry, id, &field)?;
            if descriptor.options.lazy {
                continue;
            }

            for source in resolve_field(registry, id, &field, &descriptor)? {
                if registry.coffin(source).needs_init_before_use() {
                    prerequisites.push(Dependency::init(source));
                }
            }
        }

        prerequisites.sort();
        prerequisites.dedup();

        debug!(
            component = %describe(coffin),
            prerequisites = prerequisites.len(),
            "Analyzed component dependencies."
        );

        graph.insert(Dependency::fill(id), prerequisites);
        graph.insert(Dependency::init(id), vec![Dependency::fill(id)]);
    }

    Ok(graph)
}
