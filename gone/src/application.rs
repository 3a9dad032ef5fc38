//! Core application framework functionality.

use crate::config::{
    convert_error, load_config, ApplicationConfig, ConfigProvider, CONFIG_PROVIDER_NAME,
};
use crate::daemon::DaemonRunner;
use crate::logger::{install_tracing_logger, TracingLogger, LOGGER_NAME};
use crate::runner::ApplicationRunnerPtr;
use config::Config;
use derive_more::Constructor;
use gone_di::cemetery::Cemetery;
use gone_di::component_registry::GonerOptions;
use gone_di::error::{ComponentInstanceProviderError, InstallError, RegistryError};
use gone_di::instance_provider::{ErrorPtr, TypedComponentInstanceProvider};
use std::cmp::Reverse;
use thiserror::Error;
use tracing::info;

const DEFAULTS_KEY: &str = "gone::defaults";

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Error loading configuration: {0}")]
    ConfigurationError(ErrorPtr),
    #[error("Error registering components: {0}")]
    RegistryError(#[from] RegistryError),
    #[error("Error installing components: {0}")]
    InstallError(#[from] InstallError),
    #[error("Error retrieving runners: {0}")]
    RunnerInjectionError(ComponentInstanceProviderError),
    #[error("Daemon {name} failed to {action}: {source}")]
    DaemonError {
        name: String,
        action: &'static str,
        source: ErrorPtr,
    },
    #[error("Runner error: {0}")]
    RunnerError(ErrorPtr),
}

/// Registers the framework components: the `config` provider and the default logger. Runs only
/// once per cemetery.
pub fn load_defaults(cemetery: &mut Cemetery, config: Config) -> Result<(), RegistryError> {
    cemetery.load_once(DEFAULTS_KEY, move |cemetery| {
        cemetery.register(
            ConfigProvider::new(config),
            GonerOptions::new().name(CONFIG_PROVIDER_NAME),
        )?;
        cemetery.register(TracingLogger, GonerOptions::new().name(LOGGER_NAME))?;
        Ok(())
    })
}

/// Creates an application with configuration loaded from the environment (see
/// [config](crate::config)) and default components registered.
pub fn create_default() -> Result<Application, ApplicationError> {
    let config =
        load_config().map_err(|error| ApplicationError::ConfigurationError(convert_error(error)))?;
    let application_config = ApplicationConfig::from_config(&config)
        .map_err(|error| ApplicationError::ConfigurationError(convert_error(error)))?;

    if application_config.install_tracing_logger {
        install_tracing_logger();
    }

    let mut cemetery = Cemetery::new();
    load_defaults(&mut cemetery, config)?;

    Ok(Application::new(cemetery))
}

/// Main entrypoint for the application. Installs registered components, starts daemons and runs
/// [ApplicationRunners](crate::runner::ApplicationRunner).
#[derive(Constructor, Default, Debug)]
pub struct Application {
    cemetery: Cemetery,
}

impl Application {
    #[inline]
    pub fn cemetery(&self) -> &Cemetery {
        &self.cemetery
    }

    /// Gives access to the underlying cemetery for registering application components.
    #[inline]
    pub fn cemetery_mut(&mut self) -> &mut Cemetery {
        &mut self.cemetery
    }

    /// Runs all registered runners, in order of descending priority.
    pub fn run(&mut self) -> Result<(), ApplicationError> {
        self.run_with(|cemetery| {
            info!("Searching for application runners...");

            let mut runners = cemetery
                .instances_typed::<ApplicationRunnerPtr>()
                .map_err(ApplicationError::RunnerInjectionError)?;

            runners.sort_by_key(|runner| Reverse(runner.priority()));

            info!(runners = runners.len(), "Running application runners...");

            runners
                .iter()
                .try_for_each(|runner| runner.run().map_err(ApplicationError::RunnerError))
        })
    }

    /// Installs components, starts daemons, runs the given body and stops the daemons again. The
    /// daemons are stopped even if the body fails.
    pub fn run_with<F>(&mut self, body: F) -> Result<(), ApplicationError>
    where
        F: FnOnce(&Cemetery) -> Result<(), ApplicationError>,
    {
        self.cemetery.install()?;

        let daemons = DaemonRunner::new(self.cemetery.daemons());
        info!(daemons = daemons.len(), "Starting daemons...");
        daemons.start()?;

        let result = body(&self.cemetery);

        info!("Stopping daemons...");
        let stopped = daemons.stop();

        result.and(stopped)
    }
}
