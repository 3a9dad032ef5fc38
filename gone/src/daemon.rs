//! Starting and stopping [Daemons](Daemon) around the application body.

use crate::application::ApplicationError;
use derive_more::Constructor;
use gone_di::component::Daemon;
use gone_di::instance_provider::ComponentInstancePtr;
use tracing::{error, info};

/// Starts daemons in the given order and stops them in reverse.
#[derive(Constructor)]
pub struct DaemonRunner {
    daemons: Vec<(String, ComponentInstancePtr<dyn Daemon>)>,
}

impl DaemonRunner {
    #[inline]
    pub fn len(&self) -> usize {
        self.daemons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.daemons.is_empty()
    }

    /// Starts all daemons. When one fails, the ones started before it are stopped in reverse
    /// order and the start error is returned.
    pub fn start(&self) -> Result<(), ApplicationError> {
        for (index, (name, daemon)) in self.daemons.iter().enumerate() {
            info!(daemon = %name, "Starting daemon.");

            if let Err(source) = daemon.start() {
                error!(daemon = %name, %source, "Daemon failed to start.");

                // stop errors are already logged and the start error takes precedence
                let _ = Self::stop_all(&self.daemons[..index]);

                return Err(ApplicationError::DaemonError {
                    name: name.clone(),
                    action: "start",
                    source,
                });
            }
        }

        Ok(())
    }

    /// Stops all daemons in reverse start order. Every daemon is asked to stop, even when a
    /// previous one failed; the first failure is returned.
    pub fn stop(&self) -> Result<(), ApplicationError> {
        Self::stop_all(&self.daemons)
    }

    fn stop_all(daemons: &[(String, ComponentInstancePtr<dyn Daemon>)]) -> Result<(), ApplicationError> {
        let mut result = Ok(());

        for (name, daemon) in daemons.iter().rev() {
            info!(daemon = %name, "Stopping daemon.");

            if let Err(source) = daemon.stop() {
                error!(daemon = %name, %source, "Daemon failed to stop.");

                if result.is_ok() {
                    result = Err(ApplicationError::DaemonError {
                        name: name.clone(),
                        action: "stop",
                        source,
                    });
                }
            }
        }

        result
    }
}
