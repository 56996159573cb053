//! Import command implementation.
//!
//! The only command that writes to the reference database.

use crate::cli::ImportArgs;
use crate::error::Result;
use crate::output::Formatter;
use dutywise_store::{ReferenceData, SqliteStore};
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the import command.
pub fn execute_import(args: ImportArgs, database: &Path, formatter: &Formatter) -> Result<()> {
    let data = ReferenceData::from_file(&args.file)?;

    if let Some(parent) = database.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut store = SqliteStore::new(database)?;
    let (records, rules) = store.import_data(&data)?;
    info!(
        "Imported {} record(s) and {} rule(s) from {} into {}",
        records,
        rules,
        args.file.display(),
        database.display()
    );

    println!(
        "{}",
        formatter.success(&format!(
            "Imported {} record(s) and {} rule(s); database now holds {} record(s)",
            records,
            rules,
            store.record_count()?
        ))
    );

    Ok(())
}
