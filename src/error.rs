use thiserror::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// 转换过程中的致命错误
///
/// 记录级别的问题（无法解析的十六进制、越界地址等）不在这里出现，
/// 它们只会导致该行被丢弃或被注释掉。
#[derive(Error, Debug, Clone)]
pub enum OvdError {
    #[error("Cannot read input '{path}': {message}")]
    Input { path: PathBuf, message: String },

    #[error("Output directory error at '{path}': {message}")]
    OutputDir { path: PathBuf, message: String },

    #[error("Failed to open file: {path} ({message})")]
    OpenSection { path: PathBuf, message: String },

    #[error("Failed to write '{path}': {message}")]
    Write { path: PathBuf, message: String },
}

pub type OvdResult<T> = Result<T, OvdError>;

impl OvdError {
    /// 出错时涉及的文件或目录路径
    pub fn path(&self) -> &Path {
        match self {
            OvdError::Input { path, .. }
            | OvdError::OutputDir { path, .. }
            | OvdError::OpenSection { path, .. }
            | OvdError::Write { path, .. } => path,
        }
    }
}

/// 输入流中的行位置（从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

pub fn output_dir_error(path: impl AsRef<Path>, err: impl fmt::Display) -> OvdError {
    OvdError::OutputDir {
        path: path.as_ref().to_path_buf(),
        message: err.to_string(),
    }
}

pub fn open_section_error(path: impl AsRef<Path>, err: impl fmt::Display) -> OvdError {
    OvdError::OpenSection {
        path: path.as_ref().to_path_buf(),
        message: err.to_string(),
    }
}

pub fn write_error(path: impl AsRef<Path>, err: impl fmt::Display) -> OvdError {
    OvdError::Write {
        path: path.as_ref().to_path_buf(),
        message: err.to_string(),
    }
}
