use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::{CompressionMethod, ZipArchive};

use crate::epub::container::Container;
use crate::epub::ncx::Ncx;
use crate::epub::template::{CONTAINER, MIMETYPE};
use crate::error::{ForgeError, Result};

/// EPUB的mimetype内容
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// NCX文件的媒体类型
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// 表示一个已生成的EPUB文件
pub struct Epub {
    archive: ZipArchive<File>,
}

impl Epub {
    /// 从文件路径创建Epub实例
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub>` - 成功返回Epub实例，失败返回错误
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Epub> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;

        let mut epub = Epub { archive };
        epub.validate()?;

        Ok(epub)
    }

    /// 验证EPUB文件的合法性
    ///
    /// 检查步骤：
    /// 1. 第一个条目必须是mimetype
    /// 2. mimetype不能压缩
    /// 3. 内容必须是"application/epub+zip"
    fn validate(&mut self) -> Result<()> {
        if self.archive.len() == 0 {
            return Err(ForgeError::MissingMimetype);
        }
        let mut first = self.archive.by_index(0)?;
        if first.name() != MIMETYPE {
            return Err(ForgeError::MissingMimetype);
        }
        if first.compression() != CompressionMethod::Stored {
            return Err(ForgeError::InvalidEpub("mimetype条目不能压缩".to_string()));
        }

        let mut content = String::new();
        first.read_to_string(&mut content)?;
        if content != EPUB_MIMETYPE {
            return Err(ForgeError::InvalidMimetype {
                expected: EPUB_MIMETYPE.to_string(),
                found: content,
            });
        }
        Ok(())
    }

    /// 列出EPUB文件中的所有条目
    pub fn list_files(&mut self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for i in 0..self.archive.len() {
            let file = self.archive.by_index(i)?;
            files.push(file.name().to_string());
        }

        Ok(files)
    }

    /// 提取指定文件的内容
    ///
    /// # 参数
    /// * `filename` - 要提取的文件名
    ///
    /// # 返回值
    /// * `Result<String>` - 文件内容
    pub fn extract_file(&mut self, filename: &str) -> Result<String> {
        let mut file = self.archive.by_name(filename)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }

    /// 解析container.xml文件
    pub fn parse_container(&mut self) -> Result<Container> {
        let container_content = self.extract_file(CONTAINER)?;
        Container::parse_xml(&container_content)
    }

    /// 获取主要的OPF文件路径
    pub fn get_opf_path(&mut self) -> Result<String> {
        let container = self.parse_container()?;

        container.get_opf_path().ok_or_else(|| {
            ForgeError::ContainerParseError("container.xml中没有找到有效的rootfile".to_string())
        })
    }

    /// 获取NCX文件在压缩包中的路径
    ///
    /// 在OPF清单中查找NCX媒体类型的条目，href相对于OPF所在目录。
    pub fn get_ncx_path(&mut self) -> Result<String> {
        let opf_path = self.get_opf_path()?;
        let opf_content = self.extract_file(&opf_path)?;
        let href = find_manifest_href(&opf_content, NCX_MEDIA_TYPE)?
            .ok_or_else(|| ForgeError::InvalidEpub("OPF清单中没有NCX条目".to_string()))?;

        match opf_path.rsplit_once('/') {
            Some((dir, _)) => Ok(format!("{}/{}", dir, href)),
            None => Ok(href),
        }
    }

    /// 解析NCX目录
    pub fn parse_ncx(&mut self) -> Result<Ncx> {
        let ncx_path = self.get_ncx_path()?;
        let ncx_content = self.extract_file(&ncx_path)?;
        Ncx::parse_xml(&ncx_content)
    }
}

/// 在OPF清单中查找指定媒体类型的第一个href
fn find_manifest_href(opf_content: &str, media_type: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(opf_content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"item" => {
                let mut href = None;
                let mut matched = false;
                for attr_result in e.attributes() {
                    let attr = attr_result
                        .map_err(|err| ForgeError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
                    match attr.key.local_name().as_ref() {
                        b"href" => href = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"media-type" => matched = attr.value.as_ref() == media_type.as_bytes(),
                        _ => {}
                    }
                }
                if matched && href.is_some() {
                    return Ok(href);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::packager::ArchivePackager;
    use crate::epub::template::Skeleton;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// 创建一个测试用的EPUB文件
    fn create_test_epub(path: &Path, mimetype_content: &str, method: CompressionMethod) -> Result<()> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(method);

        zip.start_file("mimetype", options)?;
        zip.write_all(mimetype_content.as_bytes())?;

        zip.start_file("META-INF/container.xml", SimpleFileOptions::default())?;
        zip.write_all(Skeleton::embedded().read(CONTAINER)?.as_bytes())?;

        zip.finish()?;
        Ok(())
    }

    #[test]
    fn test_valid_epub() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("valid.epub");
        create_test_epub(&path, EPUB_MIMETYPE, CompressionMethod::Stored).unwrap();

        let mut epub = Epub::new(&path).unwrap();
        assert_eq!(
            epub.list_files().unwrap(),
            vec!["mimetype".to_string(), "META-INF/container.xml".to_string()]
        );
        assert_eq!(epub.get_opf_path().unwrap(), "OEBPS/content.opf");
    }

    #[test]
    fn test_invalid_mimetype() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.epub");
        create_test_epub(&path, "invalid/mimetype", CompressionMethod::Stored).unwrap();

        let result = Epub::new(&path);
        if let Err(ForgeError::InvalidMimetype { expected, found }) = result {
            assert_eq!(expected, "application/epub+zip");
            assert_eq!(found, "invalid/mimetype");
        } else {
            panic!("期望InvalidMimetype错误");
        }
    }

    #[test]
    fn test_compressed_mimetype_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("compressed.epub");
        create_test_epub(&path, EPUB_MIMETYPE, CompressionMethod::Deflated).unwrap();

        assert!(matches!(Epub::new(&path), Err(ForgeError::InvalidEpub(_))));
    }

    #[test]
    fn test_mimetype_not_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.epub");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("META-INF/container.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<container/>").unwrap();
        zip.start_file("mimetype", SimpleFileOptions::default()).unwrap();
        zip.write_all(EPUB_MIMETYPE.as_bytes()).unwrap();
        zip.finish().unwrap();

        assert!(matches!(Epub::new(&path), Err(ForgeError::MissingMimetype)));
    }

    #[test]
    fn test_find_ncx_in_packaged_skeleton() {
        let staging = tempdir().unwrap();
        Skeleton::embedded().copy_into(staging.path()).unwrap();
        let out = tempdir().unwrap();
        let dest = out.path().join("skeleton.epub");
        ArchivePackager.package(staging.path(), &dest).unwrap();

        let mut epub = Epub::new(&dest).unwrap();
        assert_eq!(epub.get_ncx_path().unwrap(), "OEBPS/toc.ncx");
        let ncx = epub.parse_ncx().unwrap();
        assert!(ncx.nav_points.is_empty());
    }
}
