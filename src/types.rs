use std::fmt;
use crate::error::SourceLocation;

/// 输入流中的一行原始文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    pub loc: SourceLocation,
    pub text: String,
}

impl InputLine {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            loc: SourceLocation { line },
            text: text.into(),
        }
    }
}

/// 把整段文本切成带行号的输入行
pub fn input_lines(source: &str) -> impl Iterator<Item = InputLine> + '_ {
    source
        .lines()
        .enumerate()
        .map(|(i, text)| InputLine::new(i + 1, text))
}

/// 已校验的十六进制操作数
///
/// `digits` 保存去掉 `0x` 前缀后的原始数字文本（保留大小写），
/// 宽度推断按数字文本长度进行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexOperand {
    pub digits: String,
    pub value: u64,
}

impl HexOperand {
    /// 解析 `[0x|0X]<hex digits>`，不接受空数字串
    pub fn parse(token: &str) -> Option<Self> {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        // 前导零不计入数值；超长的数字饱和到 u64::MAX
        let significant = digits.trim_start_matches('0');
        let value = if significant.is_empty() {
            0
        } else {
            u64::from_str_radix(significant, 16).unwrap_or(u64::MAX)
        };

        Some(Self {
            digits: digits.to_string(),
            value,
        })
    }

    pub fn width(&self) -> usize {
        self.digits.len()
    }
}

impl fmt::Display for HexOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.digits)
    }
}

pub const BUS_PLACEHOLDER: &str = "PUT_BUS_NUMBER_HERE";

/// `SET-BUS` 的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusNumber {
    #[default]
    Placeholder,
    Number(u32),
}

impl fmt::Display for BusNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusNumber::Placeholder => f.write_str(BUS_PLACEHOLDER),
            BusNumber::Number(n) => write!(f, "{}", n),
        }
    }
}

/// 输出脚本中的一条指令，`Display` 即输出行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    SetBus(BusNumber),
    SetId(HexOperand),
    WriteByte(HexOperand, HexOperand),
    WriteWord(HexOperand, HexOperand),
    Delay(u64),
    Comment(String),
}

impl Instruction {
    pub fn is_comment(&self) -> bool {
        matches!(self, Instruction::Comment(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::SetBus(bus) => write!(f, "SET-BUS {}", bus),
            Instruction::SetId(addr) => write!(f, "SET-ID {}", addr),
            Instruction::WriteByte(reg, value) => write!(f, "WB-16 {} {}", reg, value),
            Instruction::WriteWord(reg, value) => write!(f, "WW-16 {} {}", reg, value),
            Instruction::Delay(ms) => write!(f, "DELAY {}", ms),
            Instruction::Comment(text) => write!(f, "//{}", text),
        }
    }
}
