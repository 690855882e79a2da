//! 清单生成
//!
//! 根据有序的章节文档生成content.opf的清单与脊柱、toc.ncx的导航点、
//! nav.xhtml的目录以及封面页，并写回暂存目录中的模板文件。

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::config::LocaleStrings;
use crate::convert::{BookInfo, ConvertedDocument, DocumentSlot, FOREWORD_XHTML};
use crate::epub::cover::CoverImage;
use crate::epub::ncx::{NavEntry, NavPoint};
use crate::epub::opf::{ManifestItem, SpineItem, XHTML_MEDIA_TYPE};
use crate::epub::template::{self, COVER_TEMPLATE, NAV_TEMPLATE, NCX_TEMPLATE, OPF_TEMPLATE};
use crate::error::{ForgeError, Result};
use crate::text::escape;

/// 封面页文件名
pub const COVER_XHTML: &str = "cover.xhtml";

/// 书籍元数据，一次生成内保持不变
#[derive(Debug, Clone)]
pub struct BookIdentity {
    /// `urn:uuid:...` 形式的唯一标识符，content.opf与toc.ncx共用
    pub uuid: String,
    pub title: String,
    pub author: String,
    pub lang_code: String,
    pub publisher: String,
    /// 创建日期 `%Y-%m-%d`
    pub created: String,
    /// 修改时间 `%Y-%m-%dT%H:%M:%SZ`
    pub modified: String,
}

impl BookIdentity {
    /// 生成新的标识符与时间戳
    pub fn new(book: &BookInfo, lang_code: &str, publisher: &str) -> Self {
        let now = Utc::now();
        Self {
            uuid: format!("urn:uuid:{}", Uuid::new_v4()),
            title: book.title.clone(),
            author: book.author.clone(),
            lang_code: lang_code.to_string(),
            publisher: publisher.to_string(),
            created: now.format("%Y-%m-%d").to_string(),
            modified: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

/// 生成好的清单、脊柱与目录条目
///
/// 四个列表的顺序一致：封面、前言，然后按编号升序的章节。
#[derive(Debug, Clone, Default)]
pub struct BookManifest {
    pub items: Vec<ManifestItem>,
    pub spine: Vec<SpineItem>,
    pub nav_points: Vec<NavPoint>,
    pub nav_entries: Vec<NavEntry>,
}

impl BookManifest {
    /// content.opf的 `{opf_item_tag_list}`
    pub fn opf_item_tag_list(&self) -> String {
        self.items
            .iter()
            .map(ManifestItem::to_xml)
            .collect::<Vec<_>>()
            .join("\n    ")
    }

    /// content.opf的 `{opf_itemref_tag_list}`
    pub fn opf_itemref_tag_list(&self) -> String {
        self.spine
            .iter()
            .map(SpineItem::to_xml)
            .collect::<Vec<_>>()
            .join("\n    ")
    }

    /// toc.ncx的 `{navpoint_tag_list}`
    pub fn navpoint_tag_list(&self) -> String {
        self.nav_points
            .iter()
            .map(NavPoint::to_xml)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// nav.xhtml的 `{nav_li_tag_list}`
    pub fn nav_li_tag_list(&self) -> String {
        self.nav_entries
            .iter()
            .map(NavEntry::to_xml)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 清单生成器
pub struct ManifestBuilder<'a> {
    strings: &'a LocaleStrings,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(strings: &'a LocaleStrings) -> Self {
        Self { strings }
    }

    /// 从章节文档生成清单
    ///
    /// 输入中的封面与前言条目会被忽略，它们总是固定排在最前；章节按编号重新排序。
    pub fn build(&self, chapters: &[ConvertedDocument]) -> BookManifest {
        let mut chapters: Vec<&ConvertedDocument> = chapters
            .iter()
            .filter(|doc| matches!(doc.slot, DocumentSlot::Chapter(_)))
            .collect();
        chapters.sort_by_key(|doc| doc.slot);

        let mut entries: Vec<(String, String)> = vec![
            (COVER_XHTML.to_string(), self.strings.cover_title.clone()),
            (FOREWORD_XHTML.to_string(), self.strings.foreword_title.clone()),
        ];
        entries.extend(chapters.iter().map(|doc| (doc.file_name(), doc.title.clone())));

        let mut manifest = BookManifest::default();
        for (play_order, (file_name, label)) in (1u32..).zip(entries) {
            manifest.items.push(Self::manifest_item(&file_name));
            manifest.spine.push(SpineItem::new(file_name.clone()));
            manifest
                .nav_points
                .push(NavPoint::for_document(play_order, &label, &file_name));
            manifest.nav_entries.push(NavEntry::new(label, file_name));
        }
        manifest
    }

    /// 封面页内嵌 `<svg>`，EPUB 3 要求其清单项声明 `svg` 属性
    fn manifest_item(file_name: &str) -> ManifestItem {
        if file_name == COVER_XHTML {
            ManifestItem::with_properties(
                file_name.to_string(),
                format!("Text/{}", file_name),
                XHTML_MEDIA_TYPE.to_string(),
                "svg".to_string(),
            )
        } else {
            ManifestItem::xhtml(file_name)
        }
    }

    /// 填充暂存目录中的content.opf、toc.ncx、nav.xhtml和cover.xhtml
    ///
    /// # 参数
    /// * `staging` - 暂存目录根
    /// * `manifest` - [`build`](Self::build) 的结果
    /// * `identity` - 书籍元数据
    /// * `cover` - 已探测的封面图片信息
    pub fn write_documents(
        &self,
        staging: &Path,
        manifest: &BookManifest,
        identity: &BookIdentity,
        cover: &CoverImage,
    ) -> Result<()> {
        let title = escape(&identity.title);
        let author = escape(&identity.author);
        let publisher = escape(&identity.publisher);
        let cover_title = escape(&self.strings.cover_title);
        let nav_title = escape(&self.strings.nav_title);
        let width = cover.width.to_string();
        let height = cover.height.to_string();

        let item_tags = manifest.opf_item_tag_list();
        let itemref_tags = manifest.opf_itemref_tag_list();
        render_in_place(
            staging,
            OPF_TEMPLATE,
            &[
                ("novel_uuid", identity.uuid.as_str()),
                ("novel_title", title.as_str()),
                ("author_name", author.as_str()),
                ("language_code", identity.lang_code.as_str()),
                ("publisher_name", publisher.as_str()),
                ("date_created", identity.created.as_str()),
                ("date_modified", identity.modified.as_str()),
                ("ext", cover.ext.as_str()),
                ("cover_media_type", cover.media_type.as_str()),
                ("opf_item_tag_list", item_tags.as_str()),
                ("opf_itemref_tag_list", itemref_tags.as_str()),
            ],
        )?;

        let navpoint_tags = manifest.navpoint_tag_list();
        render_in_place(
            staging,
            NCX_TEMPLATE,
            &[
                ("novel_uuid", identity.uuid.as_str()),
                ("novel_title", title.as_str()),
                ("navpoint_tag_list", navpoint_tags.as_str()),
            ],
        )?;

        let nav_li_tags = manifest.nav_li_tag_list();
        render_in_place(
            staging,
            NAV_TEMPLATE,
            &[
                ("language_code", identity.lang_code.as_str()),
                ("nav_title", nav_title.as_str()),
                ("nav_li_tag_list", nav_li_tags.as_str()),
            ],
        )?;

        render_in_place(
            staging,
            COVER_TEMPLATE,
            &[
                ("cover_title", cover_title.as_str()),
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("ext", cover.ext.as_str()),
            ],
        )?;

        debug!("已生成清单，共 {} 项", manifest.items.len());
        Ok(())
    }
}

/// 读取暂存目录中的模板，替换后写回原处
fn render_in_place(staging: &Path, name: &str, values: &[(&str, &str)]) -> Result<()> {
    let path = staging.join(name);
    if !path.is_file() {
        return Err(ForgeError::TemplateMissing(path));
    }
    let rendered = template::render(name, &fs::read_to_string(&path)?, values)?;
    fs::write(&path, rendered)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::template::Skeleton;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn strings() -> LocaleStrings {
        LocaleStrings::new("Ảnh bìa", "Mục lục", "Lời tựa")
    }

    fn chapter(index: u32, title: &str) -> ConvertedDocument {
        ConvertedDocument::new(
            DocumentSlot::Chapter(index),
            PathBuf::from(DocumentSlot::chapter_file_name(index)),
            title.to_string(),
        )
    }

    fn cover() -> CoverImage {
        CoverImage {
            ext: "png".to_string(),
            media_type: "image/png".to_string(),
            width: 600,
            height: 800,
        }
    }

    #[test]
    fn test_build_orders_chapters_numerically() {
        let strings = strings();
        let docs = vec![
            chapter(3, "Three"),
            chapter(1, "One"),
            chapter(7, "Seven"),
            chapter(2, "Two"),
        ];
        let manifest = ManifestBuilder::new(&strings).build(&docs);

        let expected = [
            "cover.xhtml",
            "foreword.xhtml",
            "c1.xhtml",
            "c2.xhtml",
            "c3.xhtml",
            "c7.xhtml",
        ];
        let ids: Vec<&str> = manifest.items.iter().map(|i| i.id.as_str()).collect();
        let refs: Vec<&str> = manifest.spine.iter().map(|i| i.idref.as_str()).collect();
        let srcs: Vec<String> = manifest
            .nav_points
            .iter()
            .map(|p| p.content.src.trim_start_matches("Text/").to_string())
            .collect();
        let hrefs: Vec<&str> = manifest.nav_entries.iter().map(|e| e.href.as_str()).collect();
        assert_eq!(ids, expected);
        assert_eq!(refs, expected);
        assert_eq!(srcs, expected);
        assert_eq!(hrefs, expected);

        let orders: Vec<u32> = manifest.nav_points.iter().map(|p| p.play_order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(manifest.nav_points[0].nav_label.text, "Ảnh bìa");
        assert_eq!(manifest.nav_points[1].nav_label.text, "Lời tựa");
        assert_eq!(manifest.nav_entries[5].label, "Seven");
    }

    #[test]
    fn test_cover_page_declares_svg() {
        let strings = strings();
        let manifest = ManifestBuilder::new(&strings).build(&[chapter(1, "One")]);
        assert_eq!(
            manifest.items[0].to_xml(),
            "<item id=\"cover.xhtml\" href=\"Text/cover.xhtml\" media-type=\"application/xhtml+xml\" properties=\"svg\"/>"
        );
        assert_eq!(manifest.items[1].properties, None);
        assert_eq!(manifest.items[2].properties, None);
    }

    #[test]
    fn test_build_without_chapters() {
        let strings = strings();
        let manifest = ManifestBuilder::new(&strings).build(&[]);
        assert_eq!(manifest.items.len(), 2);
        assert_eq!(manifest.opf_itemref_tag_list(), "<itemref idref=\"cover.xhtml\"/>\n    <itemref idref=\"foreword.xhtml\"/>");
    }

    #[test]
    fn test_labels_escaped_once() {
        let strings = strings();
        let manifest = ManifestBuilder::new(&strings).build(&[chapter(1, "A & <B>")]);
        assert!(manifest.navpoint_tag_list().contains("<text>A &amp; &lt;B&gt;</text>"));
        assert!(
            manifest
                .nav_li_tag_list()
                .contains("<li><a href=\"c1.xhtml\">A &amp; &lt;B&gt;</a></li>")
        );
    }

    #[test]
    fn test_write_documents() {
        let dir = tempdir().unwrap();
        Skeleton::embedded().copy_into(dir.path()).unwrap();

        let strings = strings();
        let builder = ManifestBuilder::new(&strings);
        let manifest = builder.build(&[chapter(2, "Hai"), chapter(1, "Một")]);
        let book = BookInfo {
            title: "Book & A".to_string(),
            author: "Tác giả".to_string(),
            source_url: String::new(),
            categories: String::new(),
        };
        let identity = BookIdentity::new(&book, "vi", "hacde");
        builder
            .write_documents(dir.path(), &manifest, &identity, &cover())
            .unwrap();

        let opf = fs::read_to_string(dir.path().join(OPF_TEMPLATE)).unwrap();
        let ncx = fs::read_to_string(dir.path().join(NCX_TEMPLATE)).unwrap();
        let nav = fs::read_to_string(dir.path().join(NAV_TEMPLATE)).unwrap();
        let cover_page = fs::read_to_string(dir.path().join(COVER_TEMPLATE)).unwrap();

        assert!(identity.uuid.starts_with("urn:uuid:"));
        assert!(opf.contains(&format!(">{}</dc:identifier>", identity.uuid)));
        assert!(ncx.contains(&format!("content=\"{}\"", identity.uuid)));
        assert!(opf.contains("<dc:title>Book &amp; A</dc:title>"));
        assert!(opf.contains("<dc:publisher>hacde</dc:publisher>"));
        assert!(opf.contains("href=\"Images/cover.png\" media-type=\"image/png\""));
        assert!(opf.find("c1.xhtml").unwrap() < opf.find("c2.xhtml").unwrap());
        assert!(ncx.contains("<text>Book &amp; A</text>"));
        assert!(nav.contains("<h1>Mục lục</h1>"));
        assert!(nav.contains("<li><a href=\"c1.xhtml\">Một</a></li>"));
        assert!(cover_page.contains("viewBox=\"0 0 600 800\""));
        assert!(cover_page.contains("../Images/cover.png"));
        assert!(!opf.contains("{opf_item_tag_list}"));
    }

    #[test]
    fn test_write_documents_missing_template() {
        let dir = tempdir().unwrap();
        let strings = strings();
        let builder = ManifestBuilder::new(&strings);
        let identity = BookIdentity::new(&BookInfo::default(), "vi", "hacde");
        let result = builder.write_documents(dir.path(), &BookManifest::default(), &identity, &cover());
        assert!(matches!(result, Err(ForgeError::TemplateMissing(_))));
    }
}
