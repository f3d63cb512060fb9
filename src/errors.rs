use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Input {path} contains {lines} lines, at least 3 are required")]
    TooShort { path: String, lines: usize },

    #[error("Invalid first line: {0}")]
    MalformedHeader(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("failed to process file [{path}]: {source}")]
    FileError {
        path: String,
        #[source]
        source: Box<IngestError>,
    },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl IngestError {
    /// 是否属于可跳过的错误（文件不贡献数据，但批处理继续）
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IngestError::TooShort { .. } | IngestError::MalformedHeader(_))
    }

    /// 给错误附加来源文件路径
    pub fn with_path(self, path: &str) -> Self {
        match self {
            IngestError::FileError { .. } => self,
            other => IngestError::FileError {
                path: path.to_string(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds() {
        assert!(IngestError::TooShort { path: "a".into(), lines: 2 }.is_recoverable());
        assert!(IngestError::MalformedHeader("x".into()).is_recoverable());
        assert!(!IngestError::DataError("x".into()).is_recoverable());
    }

    #[test]
    fn with_path_wraps_once() {
        let err = IngestError::DataError("bad".into()).with_path("a.txt").with_path("b.txt");
        match err {
            IngestError::FileError { path, source } => {
                assert_eq!(path, "a.txt");
                assert!(matches!(*source, IngestError::DataError(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn file_error_message_names_the_path() {
        let err = IngestError::DataError("bad row".into()).with_path("SH600000.txt");
        let text = err.to_string();
        assert!(text.contains("SH600000.txt"));
        assert!(text.contains("bad row"));
    }
}
