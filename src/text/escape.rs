/// 转义XHTML保留字符
///
/// `&` 必须最先替换，否则会把后两步生成的实体再转义一次。
/// 每一行原始文本只能调用一次。
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 把每一行转义后包成 `<p>` 段落，并以空行分隔
pub fn paragraphs<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| format!("<p>{}</p>", escape(line.as_ref())))
        .collect::<Vec<_>>()
        .join("\n\n  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserved_characters() {
        assert_eq!(escape("A & B <tag>"), "A &amp; B &lt;tag&gt;");
    }

    #[test]
    fn test_escape_leaves_other_text_alone() {
        assert_eq!(escape("\"quoted\" 'single' 中文"), "\"quoted\" 'single' 中文");
    }

    #[test]
    fn test_existing_entity_is_escaped_once() {
        assert_eq!(escape("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(
            paragraphs(&["One & two", "Three"]),
            "<p>One &amp; two</p>\n\n  <p>Three</p>"
        );
        let empty: [&str; 0] = [];
        assert_eq!(paragraphs(&empty), "");
    }
}
