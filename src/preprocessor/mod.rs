//! OVD 预处理器模块
//!
//! 把原始寄存器转储文本整理成只含分节标记、延时指令与寄存器记录的行流：
//! - 剥离 `//` 与 `/* */` 注释（块注释跨行）
//! - 剔除内嵌的 `function` 定义及其花括号体
//! - 去空白、丢弃空行/过短行/`;;` 注解行，规整 `@@` 分节标记
//!
//! 三个阶段都逐行流式处理，只依赖当前行和此前的状态。

pub mod comments;
pub mod functions;
pub mod records;

pub use comments::{CommentState, CommentStripper};
pub use functions::{
    FunctionBodyElider, FunctionDetector, FunctionMatch, SubstringDetector, WordBoundaryDetector,
};
pub use records::{filter_record, SECTION_MARKER};

use tracing::trace;
use crate::types::{input_lines, InputLine};

/// 预处理器状态
pub struct Preprocessor {
    stripper: CommentStripper,
    elider: FunctionBodyElider,
}

impl Preprocessor {
    pub fn new(mode: FunctionMatch) -> Self {
        Self {
            stripper: CommentStripper::new(),
            elider: FunctionBodyElider::with_match(mode),
        }
    }

    /// 处理一行输入，返回规整后的记录；`None` 表示该行被丢弃
    pub fn process_line(&mut self, line: &InputLine) -> Option<String> {
        let stripped = self.stripper.strip(&line.text);

        let Some(kept) = self.elider.feed(&stripped) else {
            trace!(loc = %line.loc, "dropped inside function definition");
            return None;
        };

        filter_record(kept)
    }

    /// 输入结束时仍在剔除函数体（函数没有找到 `{` 或没有闭合）
    pub fn is_eliding(&self) -> bool {
        self.elider.is_eliding()
    }

    pub fn comment_state(&self) -> CommentState {
        self.stripper.state()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(FunctionMatch::default())
    }
}

/// 便捷的预处理函数
///
/// # Arguments
/// * `source` - 原始 OVD 文本
/// * `mode` - 函数定义检测策略
///
/// # Returns
/// 规整后的记录行
pub fn preprocess(source: &str, mode: FunctionMatch) -> Vec<String> {
    let mut preprocessor = Preprocessor::new(mode);
    input_lines(source)
        .filter_map(|line| preprocessor.process_line(&line))
        .collect()
}
