use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("directory overflow: global depth {global_depth} would exceed limit {limit} (keys are clustering on the same hash suffix)")]
    DirectoryOverflow { global_depth: u8, limit: u8 },

    #[error("page capacity must be at least 1, got {capacity}")]
    InvalidPageCapacity { capacity: usize },

    #[error("alpha_max must be a finite value greater than 0, got {alpha_max}")]
    InvalidLoadFactor { alpha_max: f64 },

    #[error("initial bucket count must be at least 1, got {count}")]
    InvalidInitialBuckets { count: usize },

    #[error("global depth limit must be between 1 and 32, got {limit}")]
    InvalidDepthLimit { limit: u8 },

    #[error("invalid experiment configuration: {reason}")]
    InvalidExperiment { reason: String },

    #[error("data corruption in {component}: page={page_num}, {details}")]
    Corruption {
        component: String,
        page_num: usize,
        details: String,
    },

    #[error("serialization error: {error} ({context})")]
    SerializationError { context: String, error: String },

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    pub(crate) fn corruption(component: &str, page_num: usize, details: impl Into<String>) -> Self {
        Error::Corruption {
            component: component.to_string(),
            page_num,
            details: details.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError {
            context: "experiment results".to_string(),
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_overflow_message() {
        let err = Error::DirectoryOverflow { global_depth: 21, limit: 20 };
        let msg = err.to_string();
        assert!(msg.contains("21"));
        assert!(msg.contains("limit 20"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(ref s) if s.contains("missing.json")));
    }
}
