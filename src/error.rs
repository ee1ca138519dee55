// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 数据集工具的错误类型

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QcError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{path}: missing <{field}>")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{path}: <{field}> is not a number: {value:?}")]
    InvalidNumber {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    #[error("{path}: image size must be non-zero (got {width}x{height})")]
    InvalidSize {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    #[error("{path}:{line}: invalid YOLO label line: {content:?}")]
    InvalidLabelLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("no .jpg/.png images found in {0}")]
    NoImages(PathBuf),
}

impl QcError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QcError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QcError>;
