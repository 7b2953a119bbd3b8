//! 内嵌函数定义的剔除
//!
//! 检测到函数起始行后，先跳到第一个含 `{` 的行，再按花括号平衡计数，
//! 计数回到 0 的那一行为止全部丢弃。若直到输入结束都没有出现 `{`，
//! 剩余的全部行都会被丢弃。

/// 判断一行是否开始一个函数定义
pub trait FunctionDetector {
    fn is_function_start(&self, line: &str) -> bool;
}

const FUNCTION_KEYWORD: &str = "function";

/// 子串匹配：行内任意位置出现 `function` 即视为函数起始（包括更长的标识符内部）
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringDetector;

impl FunctionDetector for SubstringDetector {
    fn is_function_start(&self, line: &str) -> bool {
        line.contains(FUNCTION_KEYWORD)
    }
}

/// 单词边界匹配：`function` 两侧不能紧邻标识符字符
#[derive(Debug, Clone, Copy, Default)]
pub struct WordBoundaryDetector;

impl FunctionDetector for WordBoundaryDetector {
    fn is_function_start(&self, line: &str) -> bool {
        let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
        line.match_indices(FUNCTION_KEYWORD).any(|(pos, kw)| {
            let before = line[..pos].chars().next_back();
            let after = line[pos + kw.len()..].chars().next();
            !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
        })
    }
}

/// 函数检测策略，供配置选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionMatch {
    #[default]
    Substring,
    WordBoundary,
}

impl FunctionMatch {
    pub fn detector(self) -> Box<dyn FunctionDetector> {
        match self {
            FunctionMatch::Substring => Box::new(SubstringDetector),
            FunctionMatch::WordBoundary => Box::new(WordBoundaryDetector),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElisionState {
    Passing,
    /// 已看到函数起始，还没遇到 `{`
    AwaitingBrace,
    /// 当前累计的花括号深度
    InBody(i64),
}

pub struct FunctionBodyElider {
    detector: Box<dyn FunctionDetector>,
    state: ElisionState,
}

impl FunctionBodyElider {
    pub fn new(detector: Box<dyn FunctionDetector>) -> Self {
        Self {
            detector,
            state: ElisionState::Passing,
        }
    }

    pub fn with_match(mode: FunctionMatch) -> Self {
        Self::new(mode.detector())
    }

    /// 正处于被剔除的区域内（输入在此时结束则剩余部分全部丢弃）
    pub fn is_eliding(&self) -> bool {
        self.state != ElisionState::Passing
    }

    /// 输入一行，返回应当保留的行
    pub fn feed<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        if self.state == ElisionState::Passing {
            if !self.detector.is_function_start(line) {
                return Some(line);
            }
            self.state = ElisionState::AwaitingBrace;
        }

        if self.state == ElisionState::AwaitingBrace {
            if !line.contains('{') {
                return None;
            }
            self.state = ElisionState::InBody(0);
        }

        if let ElisionState::InBody(depth) = self.state {
            let depth = depth + brace_balance(line);
            self.state = if depth == 0 {
                ElisionState::Passing
            } else {
                ElisionState::InBody(depth)
            };
        }
        None
    }
}

impl Default for FunctionBodyElider {
    fn default() -> Self {
        Self::with_match(FunctionMatch::default())
    }
}

fn brace_balance(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// 对整段行序列剔除函数定义
pub fn elide_functions<'a>(lines: &[&'a str], mode: FunctionMatch) -> Vec<&'a str> {
    let mut elider = FunctionBodyElider::with_match(mode);
    lines.iter().filter_map(|line| elider.feed(line)).collect()
}
