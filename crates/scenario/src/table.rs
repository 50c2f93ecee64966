use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::object::ObjectId;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write table file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("table file {path} has an invalid row at line {line}: {message}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        message: String,
    },
    #[error("table file {path} has an invalid object {id}: {message}")]
    InvalidObject {
        path: PathBuf,
        id: ObjectId,
        message: String,
    },
    #[error("duplicate id {id} in table file {path}")]
    DuplicateRow { path: PathBuf, id: ObjectId },
}

/// Reads every data row of a table file, skipping the header line and
/// deserializing each record positionally. Any malformed row aborts the
/// whole read; there is no row-level recovery.
pub(crate) fn read_rows<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map_or(0, csv::Position::line);
        let row = record
            .deserialize(None)
            .map_err(|err| TableError::InvalidRow {
                path: path.to_path_buf(),
                line,
                message: err.to_string(),
            })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Writes the localized header line followed by one row per entity, in
/// collection order.
pub(crate) fn write_rows<R, I>(path: &Path, header: &str, rows: I) -> Result<(), TableError>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let write_error = |source: csv::Error| TableError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(write_error)?;
    writer.write_record(header.split(',')).map_err(write_error)?;
    for row in rows {
        writer.serialize(row).map_err(write_error)?;
    }
    writer
        .flush()
        .map_err(|source| write_error(csv::Error::from(source)))?;
    Ok(())
}

/// Lightweight listing entry produced by the quick load variant. A distinct
/// type from the entity kinds, so quick-loaded data cannot be mixed into a
/// running scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickEntry {
    pub id: ObjectId,
    pub name: String,
}

/// Quick load: reads only the id column and one name column, skipping all
/// link columns. Used to populate selection lists before the full
/// dependency graph is available.
pub(crate) fn read_quick(path: &Path, name_column: usize) -> Result<Vec<QuickEntry>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map_or(0, csv::Position::line);
        let invalid = |message: String| TableError::InvalidRow {
            path: path.to_path_buf(),
            line,
            message,
        };
        let id = record
            .get(0)
            .ok_or_else(|| invalid("missing id column".to_string()))?
            .parse::<i32>()
            .map_err(|err| invalid(format!("bad id: {err}")))?;
        let name = record
            .get(name_column)
            .ok_or_else(|| invalid(format!("missing name column {name_column}")))?;
        entries.push(QuickEntry {
            id: ObjectId(id),
            name: name.to_string(),
        });
    }
    Ok(entries)
}
