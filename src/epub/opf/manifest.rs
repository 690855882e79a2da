//! 清单模块
//!
//! 提供content.opf中文件清单项的结构定义与序列化。

use crate::text::escape;

/// XHTML文档的媒体类型
pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// 清单项信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// 项目ID
    pub id: String,
    /// 文件路径(相对于OPF文件)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 属性(如nav、cover-image等)
    pub properties: Option<String>,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: String, href: String, media_type: String) -> Self {
        Self {
            id,
            href,
            media_type,
            properties: None,
        }
    }

    /// 创建带属性的清单项
    pub fn with_properties(id: String, href: String, media_type: String, properties: String) -> Self {
        Self {
            id,
            href,
            media_type,
            properties: Some(properties),
        }
    }

    /// `Text/` 目录下的XHTML文档，ID即文件名
    pub fn xhtml(file_name: &str) -> Self {
        Self::new(
            file_name.to_string(),
            format!("Text/{}", file_name),
            XHTML_MEDIA_TYPE.to_string(),
        )
    }

    /// 序列化为 `<item/>` 标签
    pub fn to_xml(&self) -> String {
        let mut tag = format!(
            "<item id=\"{}\" href=\"{}\" media-type=\"{}\"",
            escape(&self.id),
            escape(&self.href),
            escape(&self.media_type)
        );
        if let Some(properties) = &self.properties {
            tag.push_str(&format!(" properties=\"{}\"", escape(properties)));
        }
        tag.push_str("/>");
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xhtml_item() {
        let item = ManifestItem::xhtml("c3.xhtml");
        assert_eq!(item.media_type, XHTML_MEDIA_TYPE);
        assert_eq!(
            item.to_xml(),
            "<item id=\"c3.xhtml\" href=\"Text/c3.xhtml\" media-type=\"application/xhtml+xml\"/>"
        );
    }

    #[test]
    fn test_item_with_properties() {
        let item = ManifestItem::with_properties(
            "cover.xhtml".to_string(),
            "Text/cover.xhtml".to_string(),
            XHTML_MEDIA_TYPE.to_string(),
            "svg".to_string(),
        );
        assert_eq!(item.properties.as_deref(), Some("svg"));
        assert!(item.to_xml().ends_with(" properties=\"svg\"/>"));
    }
}
