//! 断行修复
//!
//! 原始章节文本常在句子中间被硬换行切断（例如由记事本保存的网页文本）。
//! 这里用一条简单的续行规则把它们接回去，而不是做语法分析。

/// 出现在行尾时表示句子尚未结束的标点
const CONTINUATION_MARKS: [char; 2] = [',', ':'];

/// 修复断行
///
/// 先去掉每行首尾空白并丢弃空行，然后逐行判断：若输出中最后一行以
/// 逗号或冒号结尾，或者候选行以小写字母开头，则用一个空格把候选行
/// 接到上一行末尾；否则另起一行。
///
/// # 参数
/// * `lines` - 不含标题行的正文行
///
/// # 返回值
/// * `Vec<String>` - 修复后的行，其中不含空行；输入全为空行时返回空列表
pub fn normalize<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut output: Vec<String> = Vec::with_capacity(lines.len());

    for line in lines.iter().map(|l| l.as_ref().trim()).filter(|l| !l.is_empty()) {
        match output.last_mut() {
            Some(last) if is_continuation(last, line) => {
                last.push(' ');
                last.push_str(line);
            }
            _ => output.push(line.to_string()),
        }
    }

    output
}

fn is_continuation(previous: &str, candidate: &str) -> bool {
    let open_ended = previous
        .chars()
        .last()
        .is_some_and(|c| CONTINUATION_MARKS.contains(&c));
    let starts_lowercase = candidate.chars().next().is_some_and(char::is_lowercase);

    open_ended || starts_lowercase
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_comma_merges() {
        assert_eq!(normalize(&["He said,", "hello."]), vec!["He said, hello."]);
    }

    #[test]
    fn test_sentence_end_keeps_lines() {
        assert_eq!(normalize(&["Done.", "Next."]), vec!["Done.", "Next."]);
    }

    #[test]
    fn test_colon_and_lowercase_merge() {
        let lines = ["Anh ấy nói:", "\"Đi thôi.\"", "Cô ấy gật đầu", "rồi bước ra ngoài."];
        assert_eq!(
            normalize(&lines),
            vec!["Anh ấy nói: \"Đi thôi.\"", "Cô ấy gật đầu rồi bước ra ngoài."]
        );
    }

    #[test]
    fn test_non_ascii_lowercase_merges() {
        assert_eq!(normalize(&["Trời tối", "đèn bật sáng."]), vec!["Trời tối đèn bật sáng."]);
    }

    #[test]
    fn test_cjk_lines_are_not_merged() {
        // 汉字不属于小写字母
        assert_eq!(normalize(&["他说", "你好。"]), vec!["他说", "你好。"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let lines = ["", "  First.  ", "   ", "\t", "Second."];
        assert_eq!(normalize(&lines), vec!["First.", "Second."]);
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        assert!(normalize(&empty).is_empty());
        assert!(normalize(&["", "  "]).is_empty());
    }

    #[test]
    fn test_chained_merges() {
        let lines = ["One,", "two,", "three", "four."];
        assert_eq!(normalize(&lines), vec!["One, two, three four."]);
    }

    #[test]
    fn test_idempotent() {
        let lines = [
            "Chương mở đầu,",
            "mưa rơi.",
            "",
            "Hắn đứng dậy:",
            "Đi!",
            "Rồi im lặng.",
            "và chờ đợi,",
            "Gió thổi.",
        ];
        let once = normalize(&lines);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }
}
