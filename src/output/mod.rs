//! 输出目录与分节文件管理
//!
//! 同一时刻只有一个分节文件处于打开状态。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{open_section_error, output_dir_error, write_error, OvdResult};

pub const DEFAULT_OUTPUT_DIR: &str = "./output/";

/// 分节输出的接收端
pub trait SectionSink {
    /// 打开第 `index` 个分节，返回其文件名
    fn open_section(&mut self, name: &str, index: usize) -> OvdResult<String>;
    /// 向当前分节写入一行
    fn emit(&mut self, line: &str) -> OvdResult<()>;
    /// 关闭当前分节，没有打开的分节时什么也不做
    fn close_section(&mut self) -> OvdResult<()>;
}

pub fn section_file_name(name: &str, index: usize) -> String {
    format!("{}_{}.txt", name, index)
}

struct OpenSection {
    path: PathBuf,
    writer: BufWriter<File>,
}

pub struct OutputFileManager {
    dir: PathBuf,
    current: Option<OpenSection>,
}

impl OutputFileManager {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            current: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 当前打开的分节文件路径
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|s| s.path.as_path())
    }

    /// 确保输出目录存在，并删除其中所有普通文件（不递归）
    pub fn prepare(&self) -> OvdResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| output_dir_error(&self.dir, e))?;

        let entries = fs::read_dir(&self.dir).map_err(|e| output_dir_error(&self.dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| output_dir_error(&self.dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| output_dir_error(&path, e))?;
            if file_type.is_file() {
                fs::remove_file(&path).map_err(|e| output_dir_error(&path, e))?;
                debug!(path = %path.display(), "removed stale output");
            }
        }
        Ok(())
    }
}

impl SectionSink for OutputFileManager {
    fn open_section(&mut self, name: &str, index: usize) -> OvdResult<String> {
        self.close_section()?;

        let file_name = section_file_name(name, index);
        let path = self.dir.join(&file_name);
        let file = File::create(&path).map_err(|e| open_section_error(&path, e))?;
        debug!(path = %path.display(), "opened section");

        self.current = Some(OpenSection {
            path,
            writer: BufWriter::new(file),
        });
        Ok(file_name)
    }

    fn emit(&mut self, line: &str) -> OvdResult<()> {
        match self.current.as_mut() {
            Some(section) => writeln!(section.writer, "{}", line)
                .map_err(|e| write_error(&section.path, e)),
            None => Ok(()),
        }
    }

    fn close_section(&mut self) -> OvdResult<()> {
        if let Some(mut section) = self.current.take() {
            section.writer.flush().map_err(|e| write_error(&section.path, e))?;
            debug!(path = %section.path.display(), "closed section");
        }
        Ok(())
    }
}

impl Drop for OutputFileManager {
    fn drop(&mut self) {
        let _ = self.close_section();
    }
}

/// 内存中的分节输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedSection {
    pub file_name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SectionBuffer {
    sections: Vec<BufferedSection>,
    open: bool,
}

impl SectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[BufferedSection] {
        &self.sections
    }

    pub fn get(&self, file_name: &str) -> Option<&BufferedSection> {
        self.sections.iter().find(|s| s.file_name == file_name)
    }
}

impl SectionSink for SectionBuffer {
    fn open_section(&mut self, name: &str, index: usize) -> OvdResult<String> {
        let file_name = section_file_name(name, index);
        self.sections.push(BufferedSection {
            file_name: file_name.clone(),
            lines: Vec::new(),
        });
        self.open = true;
        Ok(file_name)
    }

    fn emit(&mut self, line: &str) -> OvdResult<()> {
        if self.open {
            if let Some(section) = self.sections.last_mut() {
                section.lines.push(line.to_string());
            }
        }
        Ok(())
    }

    fn close_section(&mut self) -> OvdResult<()> {
        self.open = false;
        Ok(())
    }
}
