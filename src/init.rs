use crate::layer::StructuredLayer;
use crate::logger::Logger;
use crate::manager::LoggerManager;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::Registry;

/// Subscriber that writes every `tracing` event through `logger`.
///
/// Useful with `tracing::subscriber::with_default` to scope the bridge to
/// a block instead of the whole process.
pub fn subscriber(logger: Logger) -> Layered<StructuredLayer, Registry> {
    Registry::default().with(StructuredLayer::new(logger))
}

/// Install the bridge for `logger` as the global default subscriber.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed. Nothing is
///   replaced in that case.
pub fn install(logger: Logger) -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(subscriber(logger))
}

/// Install the bridge for the global manager's logger called `name`
/// (resolved the same way as [`crate::get_logger`]).
pub fn install_default(name: Option<&str>) -> Result<Logger, SetGlobalDefaultError> {
    let logger = LoggerManager::global().get_or_create_logger(name);
    install(logger.clone())?;
    Ok(logger)
}
