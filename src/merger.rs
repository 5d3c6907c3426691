use log::{debug, info};
use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::loader::Sources;
use crate::records::PatientRecord;

/// Renames `df`'s columns positionally to `names` and casts the known ones
/// to their canonical dtype.
fn conform(df: &DataFrame, names: &[String], source_name: &str) -> Result<DataFrame> {
    if df.width() != names.len() {
        return Err(PipelineError::SchemaMismatch {
            source_name: source_name.to_string(),
            expected: names.len(),
            found: df.width(),
        });
    }

    let schema = PatientRecord::schema();
    let mut columns = Vec::with_capacity(names.len());
    for (series, name) in df.get_columns().iter().zip(names) {
        let mut series = match schema.get(name) {
            Some(dtype) if series.dtype() != dtype => series.cast(dtype)?,
            _ => series.clone(),
        };
        series.rename(name);
        columns.push(series);
    }

    Ok(DataFrame::new(columns)?)
}

/// Stacks general, prenatal and sports under general's headers and drops the
/// leading index column.
pub fn merge(sources: Sources) -> Result<DataFrame> {
    let names: Vec<String> = sources
        .general
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let index_column = match names.first() {
        Some(name) => name.clone(),
        None => {
            return Err(PipelineError::SchemaMismatch {
                source_name: "general".to_string(),
                expected: 1,
                found: 0,
            })
        }
    };

    let general = conform(&sources.general, &names, "general")?;
    let prenatal = conform(&sources.prenatal, &names, "prenatal")?;
    let sports = conform(&sources.sports, &names, "sports")?;

    let merged = general.vstack(&prenatal)?.vstack(&sports)?;
    debug!("dropping index column {:?}", index_column);
    let merged = merged.drop(&index_column)?;

    info!("merged table: {} rows, {} columns", merged.height(), merged.width());
    Ok(merged)
}
