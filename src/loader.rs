use std::fs::File;
use std::path::Path;

use log::{debug, info};
use polars::prelude::*;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::records::Hospital;

/// The three raw row-sets, each with its native column names.
#[derive(Debug)]
pub struct Sources {
    pub general: DataFrame,
    pub prenatal: DataFrame,
    pub sports: DataFrame,
}

/// Cell values read as missing, the same set pandas uses by default.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PipelineError::MissingFile {
        path: path.to_path_buf(),
        source,
    })?;

    let null_values = NA_TOKENS.iter().map(|token| token.to_string()).collect();
    CsvReader::new(file)
        .has_header(true)
        .infer_schema(None)
        .with_null_values(Some(NullValues::AllColumns(null_values)))
        .finish()
        .map_err(|source| PipelineError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

pub fn load_sources(config: &Config) -> Result<Sources> {
    let load = |hospital: Hospital| -> Result<DataFrame> {
        let path = config.source_path(hospital);
        let df = read_csv(&path)?;
        info!("loaded {} rows from {}", df.height(), path.display());
        debug!("{} columns: {:?}", hospital.key(), df.get_column_names());
        Ok(df)
    };

    Ok(Sources {
        general: load(Hospital::General)?,
        prenatal: load(Hospital::Prenatal)?,
        sports: load(Hospital::Sports)?,
    })
}
