use std::path::{Path, PathBuf};

use crate::records::Hospital;

static DATA_PATH: &str = "test/";
static OUTPUT_PATH: &str = "output/";
pub static REPORT_FILE_NAME: &str = "report.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(DATA_PATH),
            output_dir: PathBuf::from(OUTPUT_PATH),
        }
    }
}

impl Config {
    pub fn source_path(&self, hospital: Hospital) -> PathBuf {
        self.data_dir.join(hospital.file_name())
    }

    pub fn output_path<P: AsRef<Path>>(&self, file_name: P) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_live_in_data_dir() {
        let config = Config::default();
        assert_eq!(
            config.source_path(Hospital::Sports),
            PathBuf::from("test/sports.csv")
        );
        assert_eq!(
            config.output_path(REPORT_FILE_NAME),
            PathBuf::from("output/report.json")
        );
    }
}
