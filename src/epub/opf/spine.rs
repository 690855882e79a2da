//! 脊柱模块
//!
//! 提供content.opf中阅读顺序（脊柱）的结构定义与序列化。

use crate::text::escape;

/// 脊柱项信息(阅读顺序)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    /// 引用的清单项ID
    pub idref: String,
}

impl SpineItem {
    /// 创建新的脊柱项
    pub fn new(idref: String) -> Self {
        Self { idref }
    }

    /// 序列化为 `<itemref/>` 标签
    pub fn to_xml(&self) -> String {
        format!("<itemref idref=\"{}\"/>", escape(&self.idref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itemref() {
        assert_eq!(SpineItem::new("c1.xhtml".to_string()).to_xml(), "<itemref idref=\"c1.xhtml\"/>");
        assert_eq!(
            SpineItem::new("a&b.xhtml".to_string()).to_xml(),
            "<itemref idref=\"a&amp;b.xhtml\"/>"
        );
    }
}
