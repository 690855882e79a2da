//! NCX解析器模块
//!
//! 从已生成的toc.ncx中读回标识符、书名和平铺的导航点。

use crate::epub::ncx::{NavContent, NavLabel, NavPoint};
use crate::error::{ForgeError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// NCX文件解析结果
#[derive(Debug, Clone, Default)]
pub struct Ncx {
    /// 唯一标识符（dtb:uid）
    pub uid: Option<String>,
    /// 文档标题
    pub doc_title: Option<String>,
    /// 导航点，按playOrder排序
    pub nav_points: Vec<NavPoint>,
}

impl Ncx {
    /// 解析NCX文件内容
    ///
    /// # 参数
    /// * `xml_content` - NCX文件的XML内容
    ///
    /// # 返回值
    /// * `Result<Ncx>` - 解析后的NCX信息
    pub fn parse_xml(xml_content: &str) -> Result<Ncx> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);

        let mut ncx = Ncx::default();
        let mut in_doc_title = false;
        let mut current: Option<NavPoint> = None;
        let mut text_content = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    match e.local_name().as_ref() {
                        b"docTitle" => in_doc_title = true,
                        b"navPoint" => {
                            let (id, play_order) = Self::parse_nav_point_attributes(e)?;
                            current = Some(NavPoint::new(
                                id,
                                play_order,
                                NavLabel::new(String::new()),
                                NavContent::new(String::new()),
                            ));
                        }
                        b"meta" => Self::parse_meta(e, &mut ncx)?,
                        b"content" => Self::parse_content(e, &mut current)?,
                        _ => {}
                    }
                    text_content.clear();
                }
                Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"meta" => Self::parse_meta(e, &mut ncx)?,
                    b"content" => Self::parse_content(e, &mut current)?,
                    _ => {}
                },
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"text" => {
                        let text = text_content.trim().to_string();
                        if let Some(point) = current.as_mut() {
                            point.nav_label.text = text;
                        } else if in_doc_title {
                            ncx.doc_title = Some(text);
                        }
                    }
                    b"docTitle" => in_doc_title = false,
                    b"navPoint" => {
                        if let Some(point) = current.take() {
                            ncx.nav_points.push(point);
                        }
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    text_content.push_str(&e.unescape()?);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        ncx.nav_points.sort_by_key(|point| point.play_order);
        Ok(ncx)
    }

    fn parse_meta(e: &BytesStart, ncx: &mut Ncx) -> Result<()> {
        let mut name = None;
        let mut content = None;
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| ForgeError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"name" => name = Some(String::from_utf8_lossy(&attr.value).to_string()),
                b"content" => content = Some(String::from_utf8_lossy(&attr.value).to_string()),
                _ => {}
            }
        }
        if name.as_deref() == Some("dtb:uid") {
            ncx.uid = content;
        }
        Ok(())
    }

    /// 解析navPoint元素的属性
    fn parse_nav_point_attributes(e: &BytesStart) -> Result<(String, u32)> {
        let mut id = String::new();
        let mut play_order = 0;

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| ForgeError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"id" => {
                    id = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"playOrder" => {
                    play_order = String::from_utf8_lossy(&attr.value).parse().unwrap_or(0);
                }
                _ => {}
            }
        }

        Ok((id, play_order))
    }

    fn parse_content(e: &BytesStart, current: &mut Option<NavPoint>) -> Result<()> {
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| ForgeError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"src" {
                if let Some(point) = current.as_mut() {
                    point.content.src = String::from_utf8_lossy(&attr.value).to_string();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NCX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ncx version="2005-1" xmlns="http://www.daisy.org/z3986/2005/ncx/">
  <head>
    <meta name="dtb:uid" content="urn:uuid:1234"/>
    <meta name="dtb:depth" content="1"/>
  </head>
  <docTitle>
    <text>Book &amp; A</text>
  </docTitle>
  <navMap>
    <navPoint id="navPoint-2" playOrder="2">
      <navLabel>
        <text>Lời tựa</text>
      </navLabel>
      <content src="Text/foreword.xhtml"/>
    </navPoint>
    <navPoint id="navPoint-1" playOrder="1">
      <navLabel>
        <text>Ảnh bìa</text>
      </navLabel>
      <content src="Text/cover.xhtml"/>
    </navPoint>
  </navMap>
</ncx>"#;

    #[test]
    fn test_parse_ncx() {
        let ncx = Ncx::parse_xml(NCX).unwrap();
        assert_eq!(ncx.uid.as_deref(), Some("urn:uuid:1234"));
        assert_eq!(ncx.doc_title.as_deref(), Some("Book & A"));
        assert_eq!(ncx.nav_points.len(), 2);
        assert_eq!(ncx.nav_points[0].nav_label.text, "Ảnh bìa");
        let srcs: Vec<&str> = ncx.nav_points.iter().map(|p| p.content.src.as_str()).collect();
        assert_eq!(srcs, vec!["Text/cover.xhtml", "Text/foreword.xhtml"]);
    }

    #[test]
    fn test_parse_generated_nav_points() {
        let points = [
            NavPoint::for_document(1, "Ảnh bìa", "cover.xhtml"),
            NavPoint::for_document(2, "A < B", "c1.xhtml"),
        ];
        let body = points.iter().map(NavPoint::to_xml).collect::<Vec<_>>().join("\n");
        let xml = format!("<ncx><navMap>\n{}\n</navMap></ncx>", body);
        let ncx = Ncx::parse_xml(&xml).unwrap();
        assert_eq!(ncx.nav_points, points.to_vec());
    }
}
