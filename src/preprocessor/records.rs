pub const SECTION_MARKER: &str = "@@";
pub const ANNOTATION_PREFIX: &str = ";;";

/// 规整一行记录，返回 `None` 表示丢弃
///
/// 顺序：去空白 → 丢弃空行 → 分节标记前的内容丢掉 → 丢弃过短的行 → 丢弃 `;;` 注解行
pub fn filter_record(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let line = match line.find(SECTION_MARKER) {
        Some(pos) => &line[pos..],
        None => line,
    };

    if line.len() < 2 || line.starts_with(ANNOTATION_PREFIX) {
        return None;
    }

    Some(line.to_string())
}

pub fn filter_records<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().filter_map(filter_record).collect()
}
