//! NCX导航元素数据结构定义
//!
//! 定义toc.ncx中的导航点以及nav.xhtml中的目录条目。

use crate::text::escape;

/// 导航标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLabel {
    /// 标签文本
    pub text: String,
}

impl NavLabel {
    /// 创建新的导航标签
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

/// 导航内容引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavContent {
    /// 源文件路径
    pub src: String,
}

impl NavContent {
    /// 创建新的导航内容引用
    pub fn new(src: String) -> Self {
        Self { src }
    }
}

/// 导航点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    /// 唯一标识符
    pub id: String,
    /// 播放顺序，从1开始
    pub play_order: u32,
    /// 导航标签
    pub nav_label: NavLabel,
    /// 内容引用
    pub content: NavContent,
}

impl NavPoint {
    /// 创建新的导航点
    pub fn new(id: String, play_order: u32, nav_label: NavLabel, content: NavContent) -> Self {
        Self {
            id,
            play_order,
            nav_label,
            content,
        }
    }

    /// 为 `Text/` 目录下的文档创建导航点，ID为 `navPoint-{play_order}`
    pub fn for_document(play_order: u32, label: &str, file_name: &str) -> Self {
        Self::new(
            format!("navPoint-{}", play_order),
            play_order,
            NavLabel::new(label.to_string()),
            NavContent::new(format!("Text/{}", file_name)),
        )
    }

    /// 序列化为 `<navPoint>` 元素
    pub fn to_xml(&self) -> String {
        format!(
            "    <navPoint id=\"{}\" playOrder=\"{}\">\n      <navLabel>\n        <text>{}</text>\n      </navLabel>\n      <content src=\"{}\"/>\n    </navPoint>",
            escape(&self.id),
            self.play_order,
            escape(&self.nav_label.text),
            escape(&self.content.src)
        )
    }
}

/// nav.xhtml目录中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// 显示文本
    pub label: String,
    /// 相对于nav.xhtml的链接
    pub href: String,
}

impl NavEntry {
    pub fn new(label: String, href: String) -> Self {
        Self { label, href }
    }

    /// 序列化为 `<li>` 元素
    pub fn to_xml(&self) -> String {
        format!(
            "      <li><a href=\"{}\">{}</a></li>",
            escape(&self.href),
            escape(&self.label)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_point_xml() {
        let point = NavPoint::for_document(3, "Chương 1 <mở đầu>", "c1.xhtml");
        assert_eq!(point.id, "navPoint-3");
        let xml = point.to_xml();
        assert!(xml.contains("<navPoint id=\"navPoint-3\" playOrder=\"3\">"));
        assert!(xml.contains("<text>Chương 1 &lt;mở đầu&gt;</text>"));
        assert!(xml.contains("<content src=\"Text/c1.xhtml\"/>"));
    }

    #[test]
    fn test_nav_entry_xml() {
        let entry = NavEntry::new("A & B".to_string(), "c2.xhtml".to_string());
        assert_eq!(entry.to_xml(), "      <li><a href=\"c2.xhtml\">A &amp; B</a></li>");
    }
}
