use crate::preprocessor::SECTION_MARKER;

const UNNAMED_SECTION: &str = "unnamed";

/// 取分节标记后的名称：第一个 `@@` 之后、下一个 `@@` 之前的文本
pub fn section_name(line: &str) -> &str {
    let rest = match line.find(SECTION_MARKER) {
        Some(pos) => &line[pos + SECTION_MARKER.len()..],
        None => line,
    };
    let name = match rest.find(SECTION_MARKER) {
        Some(end) => &rest[..end],
        None => rest,
    };
    name.trim()
}

/// 把分节名称变成可用的文件名片段
pub fn sanitize_section_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        UNNAMED_SECTION.to_string()
    } else {
        sanitized
    }
}
