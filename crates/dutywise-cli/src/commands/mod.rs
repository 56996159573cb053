//! Command implementations.

pub mod assess;
pub mod classify;
pub mod config;
pub mod fallback;
pub mod import;
pub mod qualify;
pub mod resolve;
pub mod watch;

pub use self::assess::execute_assess;
pub use self::classify::execute_classify;
pub use self::config::execute_config;
pub use self::fallback::execute_fallback;
pub use self::import::execute_import;
pub use self::qualify::execute_qualify;
pub use self::resolve::execute_resolve;
pub use self::watch::execute_watch;

use crate::config::Config;
use crate::error::{CliError, Result};
use dutywise_pipeline::Pipeline;
use dutywise_store::{CachedStore, SqliteStore};
use std::path::Path;
use tracing::debug;

/// The store every lookup command reads from.
pub type Store = CachedStore<SqliteStore>;

/// Open the reference database read-only behind the lookup cache.
pub fn open_store(config: &Config, db: Option<&Path>) -> Result<Store> {
    let path = config.database_path(db)?;
    if !path.exists() {
        return Err(CliError::NoDatabase(path.display().to_string()));
    }
    debug!("Opening reference database {}", path.display());
    let store = SqliteStore::open_read_only(&path)?;
    Ok(CachedStore::new(store, config.store.cache_capacity))
}

/// Build every engine from the configuration.
pub fn build_pipeline(config: &Config) -> Result<Pipeline<Store>> {
    Ok(Pipeline::new(config.pipeline.clone())?)
}

/// Run a lookup against the reference database.
///
/// The engines are built before the database is opened, so a bad
/// configuration is reported even when no database exists yet.
pub fn with_reference<T, F>(config: &Config, db: Option<&Path>, lookup: F) -> Result<T>
where
    F: FnOnce(&Pipeline<Store>, &Store) -> Result<T>,
{
    let pipeline = build_pipeline(config)?;
    let store = open_store(config, db)?;
    lookup(&pipeline, &store)
}
