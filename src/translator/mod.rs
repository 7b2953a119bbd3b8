//! 分节翻译器
//!
//! 把预处理后的记录行翻译为 rip 指令，并按 `@@` 分节标记切换输出文件。
//! 每个分节开头写一条 `SET-BUS`，其后的写寄存器指令在从设备地址变化时
//! 先插入 `SET-ID`。不安全的记录（地址 >= 0x7F 或值超过两个字节）
//! 原样注释输出，不影响当前从设备地址。

mod section;

pub use section::{sanitize_section_name, section_name};

use tracing::{debug, trace};

use crate::error::OvdResult;
use crate::lexer::{lex_record, RecordError, RegisterRecord};
use crate::output::SectionSink;
use crate::preprocessor::SECTION_MARKER;
use crate::types::{BusNumber, HexOperand, Instruction};

pub const DELAY_DIRECTIVE: &str = "; Delay ";
const DELAY_SUFFIX: &str = "ms";

/// 从设备地址上限（不含）
pub const MAX_SAFE_ADDRESS: u64 = 0x7F;
const BYTE_DIGITS: usize = 2;
const WORD_DIGITS: usize = 4;

/// 行被丢弃的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// 第一个分节标记之前的内容
    NoSection,
    DelayWithoutSuffix,
    DelayNotNumeric,
    Record(RecordError),
}

/// 单行的翻译结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    SectionOpened(String),
    Emitted,
    Commented,
    Dropped(DropReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    pub name: String,
    pub index: usize,
    pub file_name: String,
    /// 写出的指令行数（含 `SET-BUS` 与注释行）
    pub instructions: usize,
    pub commented: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranspileSummary {
    pub sections: Vec<SectionReport>,
    pub dropped: usize,
}

/// 写寄存器记录的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteClass {
    Byte,
    Word,
    Unsafe,
}

pub fn classify(record: &RegisterRecord) -> WriteClass {
    if record.address.value >= MAX_SAFE_ADDRESS {
        WriteClass::Unsafe
    } else if record.value.width() <= BYTE_DIGITS {
        WriteClass::Byte
    } else if record.value.width() <= WORD_DIGITS {
        WriteClass::Word
    } else {
        WriteClass::Unsafe
    }
}

/// 解析 `; Delay <N>ms`，`Ok(None)` 表示不是延时指令
pub fn parse_delay(line: &str) -> Result<Option<u64>, DropReason> {
    let Some(pos) = line.find(DELAY_DIRECTIVE) else {
        return Ok(None);
    };
    let rest = &line[pos + DELAY_DIRECTIVE.len()..];
    let Some(end) = rest.find(DELAY_SUFFIX) else {
        return Err(DropReason::DelayWithoutSuffix);
    };
    rest[..end]
        .trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| DropReason::DelayNotNumeric)
}

pub struct SectionTranslator<S: SectionSink> {
    sink: S,
    bus: BusNumber,
    file_open: bool,
    section_index: usize,
    last_slave_address: Option<u64>,
    summary: TranspileSummary,
}

impl<S: SectionSink> SectionTranslator<S> {
    pub fn new(sink: S, bus: BusNumber) -> Self {
        Self {
            sink,
            bus,
            file_open: false,
            section_index: 0,
            last_slave_address: None,
            summary: TranspileSummary::default(),
        }
    }

    pub fn last_slave_address(&self) -> Option<u64> {
        self.last_slave_address
    }

    pub fn translate_line(&mut self, line: &str) -> OvdResult<LineOutcome> {
        let outcome = self.translate_inner(line)?;
        if let LineOutcome::Dropped(reason) = outcome {
            self.summary.dropped += 1;
            trace!(?reason, line, "dropped record");
        }
        Ok(outcome)
    }

    fn translate_inner(&mut self, line: &str) -> OvdResult<LineOutcome> {
        if line.contains(SECTION_MARKER) {
            return self.open_section(line);
        }

        if !self.file_open {
            return Ok(LineOutcome::Dropped(DropReason::NoSection));
        }

        match parse_delay(line) {
            Ok(Some(ms)) => {
                self.emit(&Instruction::Delay(ms))?;
                return Ok(LineOutcome::Emitted);
            }
            Ok(None) => {}
            Err(reason) => return Ok(LineOutcome::Dropped(reason)),
        }

        let record = match lex_record(line) {
            Ok(record) => record,
            Err(err) => return Ok(LineOutcome::Dropped(DropReason::Record(err))),
        };

        let instruction = match classify(&record) {
            WriteClass::Unsafe => {
                self.emit(&Instruction::Comment(line.to_string()))?;
                return Ok(LineOutcome::Commented);
            }
            WriteClass::Byte => Instruction::WriteByte(record.register, record.value),
            WriteClass::Word => Instruction::WriteWord(record.register, record.value),
        };

        self.select_slave(record.address)?;
        self.emit(&instruction)?;
        Ok(LineOutcome::Emitted)
    }

    fn open_section(&mut self, line: &str) -> OvdResult<LineOutcome> {
        if self.file_open {
            self.sink.close_section()?;
            self.file_open = false;
        }

        let name = sanitize_section_name(section_name(line));
        let index = self.section_index;
        let file_name = self.sink.open_section(&name, index)?;
        self.section_index += 1;
        self.file_open = true;
        self.last_slave_address = None;
        debug!(%name, index, %file_name, "section started");

        self.summary.sections.push(SectionReport {
            name,
            index,
            file_name: file_name.clone(),
            instructions: 0,
            commented: 0,
        });
        self.emit(&Instruction::SetBus(self.bus))?;
        Ok(LineOutcome::SectionOpened(file_name))
    }

    fn select_slave(&mut self, address: HexOperand) -> OvdResult<()> {
        if self.last_slave_address != Some(address.value) {
            self.last_slave_address = Some(address.value);
            self.emit(&Instruction::SetId(address))?;
        }
        Ok(())
    }

    fn emit(&mut self, instruction: &Instruction) -> OvdResult<()> {
        self.sink.emit(&instruction.to_string())?;
        if let Some(report) = self.summary.sections.last_mut() {
            report.instructions += 1;
            if instruction.is_comment() {
                report.commented += 1;
            }
        }
        Ok(())
    }

    /// 输入结束：关闭最后一个分节
    pub fn finish(mut self) -> OvdResult<(S, TranspileSummary)> {
        if self.file_open {
            self.sink.close_section()?;
            self.file_open = false;
        }
        Ok((self.sink, self.summary))
    }
}
