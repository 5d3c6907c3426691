use polars::prelude::{DataType, Field, Schema};

pub struct PatientRecord {
}


impl PatientRecord {
    /// Canonical columns of the merged table, index column excluded.
    pub fn schema() -> Schema {
        Schema::from_iter(
            vec![
                Field::new("hospital", DataType::Utf8),
                Field::new("gender", DataType::Utf8),
                Field::new("age", DataType::Float64),
                Field::new("height", DataType::Float64),
                Field::new("weight", DataType::Float64),
                Field::new("bmi", DataType::Float64),
                Field::new("diagnosis", DataType::Utf8),
                Field::new("blood_test", DataType::Utf8),
                Field::new("ecg", DataType::Utf8),
                Field::new("ultrasound", DataType::Utf8),
                Field::new("mri", DataType::Utf8),
                Field::new("xray", DataType::Utf8),
                Field::new("children", DataType::Float64),
                Field::new("months", DataType::Float64),
            ])
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hospital {
    General,
    Prenatal,
    Sports,
}

impl Hospital {
    pub const ALL: [Hospital; 3] = [Hospital::General, Hospital::Prenatal, Hospital::Sports];

    /// Value stored in the `hospital` column.
    pub fn key(self) -> &'static str {
        match self {
            Hospital::General => "general",
            Hospital::Prenatal => "prenatal",
            Hospital::Sports => "sports",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Hospital::General => "General",
            Hospital::Prenatal => "Prenatal",
            Hospital::Sports => "Sports",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Hospital::General => "general.csv",
            Hospital::Prenatal => "prenatal.csv",
            Hospital::Sports => "sports.csv",
        }
    }
}
