//! Default logger component, available to other components by the `dyn Logger` alias or the
//! [LOGGER_NAME] name.

use gone_di::{goner_alias, Goner};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Name under which [TracingLogger] is registered.
pub const LOGGER_NAME: &str = "gone-logger";

pub type LoggerPtr = dyn Logger + Send + Sync;

pub trait Logger {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// [Logger] writing to [tracing].
#[derive(Goner, Default, Debug)]
pub struct TracingLogger;

#[goner_alias]
impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn warn(&self, message: &str) {
        warn!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}

/// Installs a global fmt subscriber filtered by `RUST_LOG`. Does nothing if a global subscriber
/// has already been set.
pub fn install_tracing_logger() {
    if tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already installed.");
    }
}
