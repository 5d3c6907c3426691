use std::collections::BTreeMap;

use log::debug;
use polars::prelude::*;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::records::Hospital;

pub const AGE_BIN_EDGES: [f64; 6] = [0.0, 15.0, 35.0, 55.0, 70.0, 80.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub busiest_hospital: String,
    pub general_stomach_share: f64,
    pub sports_dislocation_share: f64,
    pub median_age_gap: f64,
    pub most_tested_hospital: TopCount,
    pub modal_age_range: String,
    pub most_common_diagnosis: String,
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Utf8Chunked> {
    Ok(df.column(name)?.utf8()?)
}

/// Value counts of a text column, restricted to rows where `keep` holds.
pub(crate) fn value_counts<F>(df: &DataFrame, name: &str, keep: F) -> Result<BTreeMap<String, usize>>
where
    F: Fn(usize) -> bool,
{
    let mut counts = BTreeMap::new();
    for (row, value) in text_column(df, name)?.into_iter().enumerate() {
        if let Some(value) = value {
            if keep(row) {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
        }
    }
    Ok(counts)
}

/// Largest (count, name) pair, so equal counts go to the greater name.
fn max_entry(counts: BTreeMap<String, usize>) -> Option<TopCount> {
    counts
        .into_iter()
        .max_by(|a, b| (a.1, &a.0).cmp(&(b.1, &b.0)))
        .map(|(name, count)| TopCount { name, count })
}

/// Rounds to 3 places, exact ties going to the even neighbour.
fn round3(value: f64) -> f64 {
    let scaled = value * 1000.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor == 0.5 {
        if floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };
    rounded / 1000.0
}

pub fn busiest_hospital(df: &DataFrame) -> Result<String> {
    let counts = value_counts(df, "hospital", |_| true)?;
    debug!("patients per hospital: {:?}", counts);
    max_entry(counts)
        .map(|top| top.name)
        .ok_or_else(|| PipelineError::empty_group("hospital"))
}

/// Share of `hospital`'s patients diagnosed with `diagnosis`, rounded to 3 places.
pub fn diagnosis_share(df: &DataFrame, hospital: Hospital, diagnosis: &str) -> Result<f64> {
    let hospitals = text_column(df, "hospital")?;
    let diagnoses = text_column(df, "diagnosis")?;

    let mut total = 0usize;
    let mut matching = 0usize;
    for (h, d) in hospitals.into_iter().zip(diagnoses.into_iter()) {
        if h == Some(hospital.key()) {
            total += 1;
            if d == Some(diagnosis) {
                matching += 1;
            }
        }
    }

    if total == 0 {
        return Err(PipelineError::empty_group(format!("hospital == {}", hospital.key())));
    }
    Ok(round3(matching as f64 / total as f64))
}

/// Ages of `hospital`'s patients, nulls kept.
pub fn ages_of(df: &DataFrame, hospital: Hospital) -> Result<Series> {
    let mask = text_column(df, "hospital")?.equal(hospital.key());
    Ok(df.column("age")?.filter(&mask)?)
}

pub fn median_age_gap(df: &DataFrame) -> Result<f64> {
    let median_for = |hospital: Hospital| -> Result<f64> {
        ages_of(df, hospital)?
            .median()
            .ok_or_else(|| PipelineError::empty_group(format!("age of {}", hospital.key())))
    };
    let sports = median_for(Hospital::Sports)?;
    let general = median_for(Hospital::General)?;
    Ok((sports - general).abs())
}

pub fn most_tested_hospital(df: &DataFrame) -> Result<TopCount> {
    let tests = text_column(df, "blood_test")?;
    let taken: Vec<bool> = tests.into_iter().map(|v| v == Some("t")).collect();
    let counts = value_counts(df, "hospital", |row| taken[row])?;
    debug!("blood tests per hospital: {:?}", counts);
    max_entry(counts).ok_or_else(|| PipelineError::empty_group("blood_test == t"))
}

pub fn most_common_diagnosis(df: &DataFrame) -> Result<String> {
    max_entry(value_counts(df, "diagnosis", |_| true)?)
        .map(|top| top.name)
        .ok_or_else(|| PipelineError::empty_group("diagnosis"))
}

/// Index of the age bin holding `age`; the last bin is closed on the right.
pub fn age_bin(age: f64) -> Option<usize> {
    let last = AGE_BIN_EDGES.len() - 2;
    AGE_BIN_EDGES
        .windows(2)
        .enumerate()
        .find(|(i, edge)| age >= edge[0] && (age < edge[1] || (*i == last && age == edge[1])))
        .map(|(i, _)| i)
}

pub fn age_bin_counts(df: &DataFrame) -> Result<Vec<usize>> {
    let mut counts = vec![0usize; AGE_BIN_EDGES.len() - 1];
    for age in df.column("age")?.f64()?.into_iter().flatten() {
        if let Some(bin) = age_bin(age) {
            counts[bin] += 1;
        }
    }
    Ok(counts)
}

pub fn modal_age_range(df: &DataFrame) -> Result<String> {
    let counts = age_bin_counts(df)?;
    // first bin wins on ties
    let (bin, count) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |best, (i, &c)| if c > best.1 { (i, c) } else { best });
    if count == 0 {
        return Err(PipelineError::empty_group("age"));
    }
    Ok(format!("{}-{}", AGE_BIN_EDGES[bin], AGE_BIN_EDGES[bin + 1]))
}

pub fn summarize(df: &DataFrame) -> Result<Summary> {
    Ok(Summary {
        busiest_hospital: busiest_hospital(df)?,
        general_stomach_share: diagnosis_share(df, Hospital::General, "stomach")?,
        sports_dislocation_share: diagnosis_share(df, Hospital::Sports, "dislocation")?,
        median_age_gap: median_age_gap(df)?,
        most_tested_hospital: most_tested_hospital(df)?,
        modal_age_range: modal_age_range(df)?,
        most_common_diagnosis: most_common_diagnosis(df)?,
    })
}
