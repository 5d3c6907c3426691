use std::fs::File;
use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::aggregator::Summary;
use crate::config::{Config, REPORT_FILE_NAME};
use crate::error::Result;

pub static HEIGHT_GAP_EXPLANATION: &str = "It's because one of the hospitals uses imperial units.";

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    #[serde(flatten)]
    pub summary: &'a Summary,
    pub height_gap_explanation: &'static str,
    pub charts: Vec<PathBuf>,
}

pub fn answers(summary: &Summary) -> Vec<String> {
    vec![
        format!("The answer to the 1st question is {}", summary.busiest_hospital),
        format!("The answer to the 2nd question is {:?}", summary.general_stomach_share),
        format!("The answer to the 3rd question is {:?}", summary.sports_dislocation_share),
        format!("The answer to the 4th question is {:?}", summary.median_age_gap),
        format!(
            "The answer to the 5th question is {}, {} blood tests",
            summary.most_tested_hospital.name, summary.most_tested_hospital.count
        ),
        format!("The answer to the 1st question: {}", summary.modal_age_range),
        format!("The answer to the 2nd question: {}", summary.most_common_diagnosis),
        format!("The answer to the 3rd question: {}", HEIGHT_GAP_EXPLANATION),
    ]
}

pub fn write_report(summary: &Summary, charts: Vec<PathBuf>, config: &Config) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.output_dir)?;
    let path = config.output_path(REPORT_FILE_NAME);
    let report = Report {
        summary,
        height_gap_explanation: HEIGHT_GAP_EXPLANATION,
        charts,
    };

    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, &report)?;
    info!("wrote report to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::TopCount;

    fn summary() -> Summary {
        Summary {
            busiest_hospital: "general".into(),
            general_stomach_share: 0.325,
            sports_dislocation_share: 0.285,
            median_age_gap: 19.0,
            most_tested_hospital: TopCount {
                name: "prenatal".into(),
                count: 325,
            },
            modal_age_range: "15-35".into(),
            most_common_diagnosis: "pregnancy".into(),
        }
    }

    #[test]
    fn answers_in_question_order() {
        let lines = answers(&summary());
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "The answer to the 1st question is general");
        assert_eq!(lines[1], "The answer to the 2nd question is 0.325");
        assert_eq!(lines[3], "The answer to the 4th question is 19.0");
        assert_eq!(lines[4], "The answer to the 5th question is prenatal, 325 blood tests");
        assert!(lines[7].ends_with("imperial units."));
    }

    #[test]
    fn report_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("output"),
        };

        let path = write_report(&summary(), vec![], &config).unwrap();
        let value: serde_json::Value =
            serde_json::from_reader(File::open(path).unwrap()).unwrap();
        assert_eq!(value["busiest_hospital"], "general");
        assert_eq!(value["most_tested_hospital"]["count"], 325);
        assert_eq!(value["height_gap_explanation"], HEIGHT_GAP_EXPLANATION);
    }
}
