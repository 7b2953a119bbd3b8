pub mod error;
pub mod types;
pub mod lexer;
pub mod preprocessor;
pub mod translator;
pub mod output;

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use error::{OvdError, OvdResult};
use output::{OutputFileManager, SectionSink, DEFAULT_OUTPUT_DIR};
use preprocessor::{FunctionMatch, Preprocessor};
use translator::SectionTranslator;
use types::{input_lines, BusNumber};

pub use translator::{SectionReport, TranspileSummary};

/// 转换选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOptions {
    pub output_dir: PathBuf,
    pub bus: BusNumber,
    pub function_match: FunctionMatch,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            bus: BusNumber::Placeholder,
            function_match: FunctionMatch::Substring,
        }
    }
}

pub struct Transpiler {
    options: TranspileOptions,
}

impl Transpiler {
    pub fn new(options: TranspileOptions) -> Self {
        Self { options }
    }

    /// 读取 OVD 文件并写出各分节文件
    pub fn transpile_file(&self, input: impl AsRef<Path>) -> OvdResult<TranspileSummary> {
        let input = input.as_ref();
        let bytes = std::fs::read(input).map_err(|e| OvdError::Input {
            path: input.to_path_buf(),
            message: e.to_string(),
        })?;
        self.transpile(&decode_lossy(&bytes))
    }

    /// 清空输出目录后翻译 `source`
    pub fn transpile(&self, source: &str) -> OvdResult<TranspileSummary> {
        let manager = OutputFileManager::new(&self.options.output_dir);
        // 1. 准备输出目录
        manager.prepare()?;
        debug!(dir = %manager.dir().display(), "output directory ready");

        // 2. 预处理 + 分节翻译
        let (_, summary) = self.translate_into(source, manager)?;
        Ok(summary)
    }

    /// 把 `source` 翻译到任意输出端
    pub fn translate_into<S: SectionSink>(&self, source: &str, sink: S) -> OvdResult<(S, TranspileSummary)> {
        let mut preprocessor = Preprocessor::new(self.options.function_match);
        let mut translator = SectionTranslator::new(sink, self.options.bus);

        for line in input_lines(source) {
            if let Some(record) = preprocessor.process_line(&line) {
                translator.translate_line(&record)?;
            }
        }

        if preprocessor.is_eliding() {
            warn!("input ended inside a function definition; trailing lines were discarded");
        }

        // 3. 关闭最后一个分节
        translator.finish()
    }
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new(TranspileOptions::default())
    }
}

/// 按 UTF-8 解码，只丢弃非法字节
pub fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SectionBuffer;

    #[test]
    fn test_sensor_dump() {
        let source = "@@ Sensor\n;; setup\n10 20 FF\n10 21 1234\n80 22 01\n";
        let (buffer, summary) = Transpiler::default()
            .translate_into(source, SectionBuffer::new())
            .unwrap();
        assert_eq!(
            buffer.get("Sensor_0.txt").unwrap().lines,
            vec![
                "SET-BUS PUT_BUS_NUMBER_HERE",
                "SET-ID 0x10",
                "WB-16 0x20 0xFF",
                "WW-16 0x21 0x1234",
                "//80 22 01",
            ]
        );
        assert_eq!(summary.sections.len(), 1);
    }

    #[test]
    fn test_comments_and_functions_removed() {
        let source = r#"/* Vendor dump
10 20 30 inside comment
*/
@@ Init
function reset()
{
    10 99 99
}
10 20 30 // trailing
; Delay 5ms
"#;
        let (buffer, _) = Transpiler::default()
            .translate_into(source, SectionBuffer::new())
            .unwrap();
        assert_eq!(
            buffer.sections()[0].lines,
            vec!["SET-BUS PUT_BUS_NUMBER_HERE", "SET-ID 0x10", "WB-16 0x20 0x30", "DELAY 5"]
        );
    }

    #[test]
    fn test_bus_and_word_boundary_options() {
        let options = TranspileOptions {
            bus: BusNumber::Number(16),
            function_match: FunctionMatch::WordBoundary,
            ..TranspileOptions::default()
        };
        let source = "@@ Bus\nmalfunction_flag\n10 20 30\n";
        let (buffer, _) = Transpiler::new(options)
            .translate_into(source, SectionBuffer::new())
            .unwrap();
        assert_eq!(
            buffer.sections()[0].lines,
            vec!["SET-BUS 16", "SET-ID 0x10", "WB-16 0x20 0x30"]
        );
    }

    #[test]
    fn test_line_comment_kept_when_block_stays_open() {
        let source = "@@ S\n10 20 30 // note /* begins\n*/\n";
        let (buffer, summary) = Transpiler::default()
            .translate_into(source, SectionBuffer::new())
            .unwrap();
        assert_eq!(buffer.sections()[0].lines, vec!["SET-BUS PUT_BUS_NUMBER_HERE"]);
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn test_decode_lossy_drops_invalid_bytes() {
        assert_eq!(decode_lossy(b"10 20 \xff30"), "10 20 30");
        assert_eq!(decode_lossy(b"a\xe2\x28\xa1b"), "a(b");
    }

    #[test]
    fn test_decode_lossy_keeps_real_replacement_char() {
        let text = "@@ \u{FFFD}name\n";
        assert_eq!(decode_lossy(text.as_bytes()), text);
    }
}
