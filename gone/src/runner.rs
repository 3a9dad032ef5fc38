//! Runners executing actual application logic.

pub use gone_di::instance_provider::ErrorPtr;
#[cfg(test)]
use mockall::automock;

pub type ApplicationRunnerPtr = dyn ApplicationRunner + Send + Sync;

/// Runs application logic. Runners are run by the [Application](crate::application::Application)
/// after install and are discovered by their `ApplicationRunner` alias, so register them with
/// `#[goner_alias]` on the trait implementation.
#[cfg_attr(test, automock)]
pub trait ApplicationRunner {
    /// Runs any application code.
    fn run(&self) -> Result<(), ErrorPtr>;

    /// Returns the priority for this runner. Higher priorities get run first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}
