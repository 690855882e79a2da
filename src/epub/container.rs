use crate::error::{ForgeError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// OPF包文件的媒体类型
pub const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Container.xml中的rootfile信息
#[derive(Debug, Clone)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// Container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container>` - 没有任何rootfile时返回 `ContainerParseError`
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);

        let mut rootfiles = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"rootfiles" => in_rootfiles = true,
                    b"rootfile" if in_rootfiles => {
                        let mut full_path = String::new();
                        let mut media_type = String::new();
                        for attr_result in e.attributes() {
                            let attr = attr_result
                                .map_err(|e| ForgeError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
                            match attr.key.local_name().as_ref() {
                                b"full-path" => {
                                    full_path = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                b"media-type" => {
                                    media_type = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                _ => {}
                            }
                        }
                        if !full_path.is_empty() {
                            rootfiles.push(RootFile {
                                full_path,
                                media_type,
                            });
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) if e.local_name().as_ref() == b"rootfiles" => {
                    in_rootfiles = false;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if rootfiles.is_empty() {
            return Err(ForgeError::ContainerParseError(
                "没有找到任何rootfile条目".to_string(),
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 主OPF文件路径：优先取OPF媒体类型的rootfile，否则取第一个
    pub fn get_opf_path(&self) -> Option<String> {
        self.rootfiles
            .iter()
            .find(|rf| rf.media_type == OPF_MEDIA_TYPE)
            .or_else(|| self.rootfiles.first())
            .map(|rf| rf.full_path.clone())
    }
}
