use std::collections::HashMap;

use lazy_static::lazy_static;
use log::{debug, info};
use polars::prelude::*;

use crate::error::Result;
use crate::records::Hospital;

lazy_static! {
    static ref GENDER_SYNONYMS: HashMap<&'static str, &'static str> = HashMap::from([
        ("female", "f"),
        ("woman", "f"),
        ("male", "m"),
        ("man", "m"),
    ]);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillValue {
    Number(f64),
    Text(&'static str),
}

impl FillValue {
    fn as_expr(self) -> Expr {
        match self {
            FillValue::Number(value) => lit(value),
            FillValue::Text(value) => lit(value),
        }
    }
}

/// Constant fills applied after the gender rules.
pub const FILL_POLICY: [(&str, FillValue); 9] = [
    ("bmi", FillValue::Number(0.0)),
    ("diagnosis", FillValue::Text("0")),
    ("blood_test", FillValue::Text("0")),
    ("ecg", FillValue::Text("0")),
    ("ultrasound", FillValue::Text("0")),
    ("mri", FillValue::Text("0")),
    ("xray", FillValue::Text("0")),
    ("children", FillValue::Number(0.0)),
    ("months", FillValue::Number(0.0)),
];

pub fn drop_empty_rows(df: DataFrame) -> Result<DataFrame> {
    let mut keep = BooleanChunked::full("keep", false, df.height());
    for series in df.get_columns() {
        keep = &keep | &series.is_not_null();
    }

    let cleaned = df.filter(&keep)?;
    debug!("dropped {} empty rows", df.height() - cleaned.height());
    Ok(cleaned)
}

/// Rewrites gender synonyms in every text column.
pub fn normalize_gender(mut df: DataFrame) -> Result<DataFrame> {
    let text_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|s| s.dtype() == &DataType::Utf8)
        .map(|s| s.name().to_string())
        .collect();

    for name in text_columns {
        let values: Vec<Option<&str>> = df
            .column(&name)?
            .utf8()?
            .into_iter()
            .map(|v| v.map(|text| GENDER_SYNONYMS.get(text).copied().unwrap_or(text)))
            .collect();
        let series = Series::new(&name, values);
        df.with_column(series)?;
    }

    Ok(df)
}

pub fn fill_prenatal_gender(df: DataFrame) -> Result<DataFrame> {
    let prenatal_missing = col("hospital")
        .eq(lit(Hospital::Prenatal.key()))
        .and(col("gender").is_null());

    let df = df
        .lazy()
        .with_column(
            when(prenatal_missing)
                .then(lit("f"))
                .otherwise(col("gender"))
                .alias("gender"),
        )
        .collect()?;
    Ok(df)
}

pub fn apply_fill_policy(df: DataFrame) -> Result<DataFrame> {
    let fills: Vec<Expr> = FILL_POLICY
        .iter()
        .map(|(name, value)| col(name).fill_null(value.as_expr()).alias(name))
        .collect();

    Ok(df.lazy().with_columns(fills).collect()?)
}

pub fn clean(df: DataFrame) -> Result<DataFrame> {
    let df = drop_empty_rows(df)?;
    let df = normalize_gender(df)?;
    let df = fill_prenatal_gender(df)?;
    let df = apply_fill_policy(df)?;

    info!("cleaned table: {} rows", df.height());
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> DataFrame {
        df!(
            "hospital" => &[Some("general"), None, Some("prenatal"), Some("prenatal"), Some("sports")],
            "gender" => &[Some("man"), None, None, Some("woman"), None],
            "age" => &[Some(30.0), None, Some(25.0), Some(31.0), Some(19.0)],
            "bmi" => &[Some(22.5), None, None, Some(27.1), None],
            "diagnosis" => &[Some("stomach"), None, Some("pregnancy"), None, Some("sprain")],
            "blood_test" => &[Some("t"), None, None, Some("f"), None],
            "ecg" => &[None::<&str>, None, None, None, None],
            "ultrasound" => &[None::<&str>, None, Some("t"), None, None],
            "mri" => &[None::<&str>, None, None, None, Some("f")],
            "xray" => &[None::<&str>, None, None, None, None],
            "children" => &[None, None, Some(1.0), None, None],
            "months" => &[None, None, Some(3.0), None, None],
        )
        .unwrap()
    }

    fn text(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .utf8()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn empty_rows_are_dropped() {
        let df = drop_empty_rows(raw()).unwrap();
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn gender_synonyms_are_normalized() {
        let df = normalize_gender(raw()).unwrap();
        let gender = text(&df, "gender");
        assert_eq!(gender[0].as_deref(), Some("m"));
        assert_eq!(gender[3].as_deref(), Some("f"));
        assert_eq!(gender[2], None);
    }

    #[test]
    fn gender_normalization_is_idempotent() {
        let once = normalize_gender(raw()).unwrap();
        let twice = normalize_gender(once.clone()).unwrap();
        assert!(once.frame_equal_missing(&twice));
    }

    #[test]
    fn only_prenatal_gender_is_defaulted() {
        let df = fill_prenatal_gender(drop_empty_rows(raw()).unwrap()).unwrap();
        let gender = text(&df, "gender");
        assert_eq!(gender[1].as_deref(), Some("f"));
        assert_eq!(gender[2].as_deref(), Some("woman"));
        // sports row stays missing
        assert_eq!(gender[3], None);
    }

    #[test]
    fn fill_policy_leaves_no_nulls() {
        let df = clean(raw()).unwrap();
        for (name, _) in FILL_POLICY {
            assert_eq!(df.column(name).unwrap().null_count(), 0, "column {name}");
        }
        assert_eq!(text(&df, "ecg")[0].as_deref(), Some("0"));
        let bmi: Vec<_> = df.column("bmi").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(bmi, vec![Some(22.5), Some(0.0), Some(27.1), Some(0.0)]);
    }

    #[test]
    fn prenatal_rows_always_have_gender() {
        let df = clean(raw()).unwrap();
        let hospital = text(&df, "hospital");
        let gender = text(&df, "gender");
        for (h, g) in hospital.iter().zip(&gender) {
            if h.as_deref() == Some("prenatal") {
                assert!(g.is_some());
            }
        }
    }
}
