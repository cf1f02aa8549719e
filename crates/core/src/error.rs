use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset not found at {}; run `generate-dataset` first", path.display())]
    DatasetMissing { path: PathBuf },

    #[error("Dataset at {} could not be read ({source}); run `generate-dataset` first", path.display())]
    DatasetUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed input row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CampaignError {
    /// Classify an I/O failure on the dataset file at `path`.
    pub fn dataset_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::DatasetMissing {
                path: path.to_path_buf(),
            },
            _ => Self::DatasetUnreadable {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// True when the failure means the generator has not been run yet.
    pub fn is_dataset_missing(&self) -> bool {
        matches!(self, Self::DatasetMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dataset_message_points_at_generator() {
        let err = CampaignError::DatasetMissing {
            path: PathBuf::from("data/01_raw/x.csv"),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/01_raw/x.csv"));
        assert!(msg.contains("generate-dataset"));
        assert!(err.is_dataset_missing());
    }

    #[test]
    fn test_dataset_io_classification() {
        let path = Path::new("data/01_raw/x.csv");

        let missing = CampaignError::dataset_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(missing.is_dataset_missing());

        let denied =
            CampaignError::dataset_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, CampaignError::DatasetUnreadable { .. }));
        let msg = denied.to_string();
        assert!(msg.contains("data/01_raw/x.csv"));
        assert!(msg.contains("generate-dataset"));
        assert!(!denied.is_dataset_missing());
    }

    #[test]
    fn test_malformed_row_message() {
        let err = CampaignError::MalformedRow {
            line: 7,
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed input row at line 7: invalid digit found in string"
        );
        assert!(!err.is_dataset_missing());
    }
}
