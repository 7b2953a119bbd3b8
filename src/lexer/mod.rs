use logos::Logos;
use crate::types::HexOperand;

/// 寄存器记录行的词法单元，字段之间只以单个空格分隔
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordToken {
    #[regex(r"(0[xX])?[0-9a-fA-F]+", priority = 3)]
    Hex,

    // 任何其它非空格片段
    #[regex(r"[^ ]+", priority = 1)]
    Word,

    #[token(" ")]
    Space,
}

/// `<地址> <寄存器> <值>` 三元组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRecord {
    pub address: HexOperand,
    pub register: HexOperand,
    pub value: HexOperand,
}

/// 无法识别为寄存器记录的原因，两种情况都会被静默丢弃
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// 按单空格切分后字段数不是 3
    FieldCount(usize),
    /// 某个字段不是合法的十六进制数
    InvalidHex,
}

const RECORD_FIELDS: usize = 3;

pub fn lex_record(line: &str) -> Result<RegisterRecord, RecordError> {
    let mut lexer = RecordToken::lexer(line);
    let mut fields = 1usize;
    let mut operands: Vec<Option<HexOperand>> = Vec::with_capacity(RECORD_FIELDS);
    // 当前字段是否已经有内容；连续空格之间是空字段
    let mut filled = false;

    while let Some(token) = lexer.next() {
        match token {
            Ok(RecordToken::Space) => {
                if !filled {
                    operands.push(None);
                }
                fields += 1;
                filled = false;
            }
            Ok(RecordToken::Hex) => {
                operands.push(HexOperand::parse(lexer.slice()));
                filled = true;
            }
            Ok(RecordToken::Word) | Err(_) => {
                operands.push(None);
                filled = true;
            }
        }
    }
    if !filled {
        operands.push(None);
    }

    if fields != RECORD_FIELDS {
        return Err(RecordError::FieldCount(fields));
    }

    let mut operands = operands.into_iter();
    let mut next = || operands.next().flatten().ok_or(RecordError::InvalidHex);
    let address = next()?;
    let register = next()?;
    let value = next()?;

    Ok(RegisterRecord { address, register, value })
}
