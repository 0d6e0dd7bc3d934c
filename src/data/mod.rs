//! Tabular inputs for the offline tables.
//!
//! Both tables are CSV files with a header row:
//! - personal: `user_id,track_id,score`, grouped by user, best first
//! - default: `track_id,rank`
//!
//! Extra columns are ignored. Row order is preserved exactly as read.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{
    error::DataLoadError,
    models::{DefaultRecord, PersonalRecord},
    services::offline::{OfflineStore, TableSource},
};

/// Builds the offline store from whichever table files are configured
///
/// A table without a path is left unloaded and is reported by
/// [`OfflineStore::validate`]. Unreadable or malformed files are errors.
pub fn load_offline_store(
    personal: Option<&Path>,
    default: Option<&Path>,
) -> Result<OfflineStore, DataLoadError> {
    let mut store = OfflineStore::new();

    match personal {
        Some(path) => {
            store.load(TableSource::Personal(read_personal(path)?));
        }
        None => tracing::warn!(table = "personal", "No path configured, table not loaded"),
    }
    match default {
        Some(path) => {
            store.load(TableSource::Default(read_default(path)?));
        }
        None => tracing::warn!(table = "default", "No path configured, table not loaded"),
    }

    Ok(store)
}

pub fn read_personal(path: &Path) -> Result<Vec<PersonalRecord>, DataLoadError> {
    read_personal_from(open(path)?)
}

pub fn read_default(path: &Path) -> Result<Vec<DefaultRecord>, DataLoadError> {
    read_default_from(open(path)?)
}

pub fn read_personal_from<R: Read>(reader: R) -> Result<Vec<PersonalRecord>, DataLoadError> {
    read_records(reader)
}

pub fn read_default_from<R: Read>(reader: R) -> Result<Vec<DefaultRecord>, DataLoadError> {
    read_records(reader)
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_records<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;

    Ok(records)
}
