use crate::analyzer::Action;
use crate::instance_provider::ErrorPtr;
use itertools::Itertools;
use std::backtrace::Backtrace;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// Errors related to retrieving registered instances.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ComponentInstanceProviderError {
    #[error("Cannot find a primary instance for type '{0}' - no compatible component is registered.")]
    NoPrimaryInstance(String),
    #[error("Tried to downcast component to incompatible type: {0}")]
    IncompatibleComponent(String),
    #[error("Cannot find named component: {0}")]
    NoNamedInstance(String),
}

/// Errors related to component registration.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum RegistryError {
    #[error("Attempted to register a duplicated component with name: {name}")]
    AlreadyRegistered { name: String },
    #[error("Component {incoming} cannot be the default for {type_name} - {existing} already is")]
    DuplicateDefault {
        type_name: String,
        existing: String,
        incoming: String,
    },
}

/// An ordered dependency cycle, where the first and last links are the same.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CycleChain(pub Vec<String>);

impl Display for CycleChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(" depends on "))
    }
}

/// Errors related to analyzing and installing registered components.
#[derive(Error, Clone, Debug)]
pub enum InstallError {
    #[error("Cannot satisfy dependency '{requested}' of field '{field}' in {component}")]
    UnsatisfiedDependency {
        component: String,
        field: String,
        requested: String,
    },
    #[error("Field '{field}' in {component} expects {expected}, but got {actual}")]
    TypeMismatch {
        component: String,
        field: String,
        expected: String,
        actual: String,
    },
    #[error("Circular dependency detected: {0}")]
    CircularDependency(CycleChain),
    #[error("Malformed component {component}: {reason}")]
    MalformedComponent { component: String, reason: String },
    #[error("Panic during {phase} of {component}: {message}")]
    PanicDuringInstall {
        component: String,
        phase: Action,
        message: String,
        backtrace: Arc<Backtrace>,
    },
    #[error("The {phase} hook of {component} failed: {source}")]
    HookFailed {
        component: String,
        phase: &'static str,
        source: ErrorPtr,
    },
    #[error("Provider {provider} failed to provide {requested} for field '{field}' in {component}: {source}")]
    ProviderFailed {
        component: String,
        field: String,
        provider: String,
        requested: String,
        source: ErrorPtr,
    },
    #[error("Install aborted at step #{index} ({action} of {component}): {source}")]
    Aborted {
        index: usize,
        action: Action,
        component: String,
        source: Box<InstallError>,
    },
}

impl InstallError {
    /// Returns the underlying error, skipping any [InstallError::Aborted] wrappers.
    pub fn cause(&self) -> &InstallError {
        match self {
            InstallError::Aborted { source, .. } => source.cause(),
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::Action;
    use crate::error::{CycleChain, InstallError};

    #[test]
    fn should_display_cycle_chain() {
        let chain = CycleChain(vec![
            "<init of \"a\">".to_string(),
            "<fill of \"b\">".to_string(),
            "<init of \"a\">".to_string(),
        ]);

        assert_eq!(
            chain.to_string(),
            "<init of \"a\"> depends on <fill of \"b\"> depends on <init of \"a\">"
        );
    }

    #[test]
    fn should_return_root_cause() {
        let error = InstallError::Aborted {
            index: 3,
            action: Action::Fill,
            component: "\"boss\"".to_string(),
            source: Box::new(InstallError::UnsatisfiedDependency {
                component: "\"boss\"".to_string(),
                field: "worker".to_string(),
                requested: "Worker".to_string(),
            }),
        };

        assert!(matches!(
            error.cause(),
            InstallError::UnsatisfiedDependency { field, .. } if field == "worker"
        ));
        assert!(error.to_string().starts_with("Install aborted at step #3"));
    }
}
