//! C 风格注释剥离
//!
//! 块注释状态跨行保持，每行只做一次从左到右的处理，不做迭代：
//! 行内只移除一个 `/* ... */`，且块注释处理先于 `//` 截断；
//! 行尾仍处于块注释中时不做 `//` 截断。

const BLOCK_OPEN: &str = "/*";
const BLOCK_CLOSE: &str = "*/";
const LINE_COMMENT: &str = "//";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentState {
    #[default]
    Normal,
    InBlockComment,
}

/// 注释剥离器，自身持有 [`CommentState`]
#[derive(Debug, Default)]
pub struct CommentStripper {
    state: CommentState,
}

impl CommentStripper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CommentState {
        self.state
    }

    /// 处理一行，返回去掉注释后的文本（可能为空串）
    pub fn strip(&mut self, line: &str) -> String {
        let mut text: &str = line;
        let mut joined: Option<String> = None;

        if self.state == CommentState::InBlockComment {
            match text.find(BLOCK_CLOSE) {
                Some(pos) => {
                    text = &text[pos + BLOCK_CLOSE.len()..];
                    self.state = CommentState::Normal;
                }
                None => return String::new(),
            }
        }

        // 刚闭合的块注释之后的剩余部分仍按 Normal 状态处理一次
        if let Some(open) = text.find(BLOCK_OPEN) {
            let prefix = &text[..open];
            let rest = &text[open + BLOCK_OPEN.len()..];
            match rest.find(BLOCK_CLOSE) {
                Some(close) => {
                    let mut s = String::with_capacity(text.len());
                    s.push_str(prefix);
                    s.push_str(&rest[close + BLOCK_CLOSE.len()..]);
                    joined = Some(s);
                }
                None => {
                    text = prefix;
                    self.state = CommentState::InBlockComment;
                }
            }
        }

        let mut out = joined.unwrap_or_else(|| text.to_string());
        // 本行留在块注释中时不再截断 `//`
        if self.state == CommentState::Normal {
            if let Some(pos) = out.find(LINE_COMMENT) {
                out.truncate(pos);
            }
        }
        out
    }
}

/// 对整段行序列剥离注释，输出行数与输入相同
pub fn strip_comments<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stripper = CommentStripper::new();
    lines.into_iter().map(|line| stripper.strip(line)).collect()
}
