//! 转换结果的数据结构
//!
//! 章节文档以 `(位置, 路径, 标题)` 的有序列表记录。阶段切换时调用
//! [`Conversion::rescan`] 做一次显式的目录检查，剔除已经不存在的文件。

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::error::{ForgeError, Result};

/// 前言文档文件名
pub const FOREWORD_XHTML: &str = "foreword.xhtml";

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static NOVEL_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.title").unwrap());
static AUTHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p.author").unwrap());
static SOURCE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p.source a").unwrap());
static CATEGORIES_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p.categories").unwrap());

/// 文档在书中的位置
///
/// 排序为 封面 < 前言 < 第1章 < 第2章 ...，与原始目录中的 -1 / 0 / n 编号一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSlot {
    Cover,
    Foreword,
    Chapter(u32),
}

impl DocumentSlot {
    /// 整数编号：封面为 -1，前言为 0，章节为正整数
    pub fn index(&self) -> i64 {
        match self {
            DocumentSlot::Cover => -1,
            DocumentSlot::Foreword => 0,
            DocumentSlot::Chapter(n) => i64::from(*n),
        }
    }

    /// 章节XHTML文件名
    pub fn chapter_file_name(index: u32) -> String {
        format!("c{}.xhtml", index)
    }

    /// 从章节XHTML文件名解析编号，例如 `c12.xhtml` -> 12
    pub fn parse_chapter_file_name(name: &str) -> Option<u32> {
        name.strip_prefix('c')?
            .strip_suffix(".xhtml")?
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
    }
}

impl PartialOrd for DocumentSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DocumentSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

/// 书籍基本信息，来自前言文件的前四行
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInfo {
    /// 书名
    pub title: String,
    /// 作者
    pub author: String,
    /// 来源网址
    pub source_url: String,
    /// 分类列表
    pub categories: String,
}

/// 已生成的一个文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// 位置
    pub slot: DocumentSlot,
    /// 文件路径
    pub path: PathBuf,
    /// 标题（未转义）
    pub title: String,
}

impl ConvertedDocument {
    pub fn new(slot: DocumentSlot, path: PathBuf, title: String) -> Self {
        Self { slot, path, title }
    }

    /// 文件名，同时用作清单ID
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// 一次转换的全部产物
#[derive(Debug, Clone)]
pub struct Conversion {
    /// 结果目录
    pub result_dir: PathBuf,
    /// 语言代码
    pub lang_code: String,
    /// 书籍信息
    pub book: BookInfo,
    /// 复制到结果目录的封面图片
    pub cover: PathBuf,
    /// 前言文档
    pub foreword: PathBuf,
    /// 章节文档，按编号升序
    pub chapters: Vec<ConvertedDocument>,
    /// 正文为空而被跳过的章节编号
    pub empty_chapters: Vec<u32>,
}

impl Conversion {
    /// 与文件系统同步章节列表
    ///
    /// 剔除文件已不存在的条目，并按编号升序排列。
    pub fn rescan(&mut self) -> &[ConvertedDocument] {
        self.chapters.retain(|doc| doc.path.is_file());
        self.chapters.sort_by_key(|doc| doc.slot);
        self.chapters.dedup_by_key(|doc| doc.slot);
        &self.chapters
    }

    /// 从已有的结果目录恢复转换结果
    ///
    /// 没有内存中的标题可用，因此书名、作者和章节标题都从生成的XHTML中读回。
    /// 缺少对应元素时返回 `TemplateMismatch`。
    pub fn from_result_dir<P: AsRef<Path>>(result_dir: P, lang_code: &str) -> Result<Conversion> {
        let result_dir = result_dir.as_ref().to_path_buf();
        if !result_dir.is_dir() {
            return Err(ForgeError::RawDirNotFound(result_dir));
        }

        let foreword = result_dir.join(FOREWORD_XHTML);
        if !foreword.is_file() {
            return Err(ForgeError::MissingForeword(foreword));
        }
        let book = read_book_info(&fs::read_to_string(&foreword)?)?;

        let mut cover = None;
        let mut chapters = Vec::new();
        for entry in fs::read_dir(&result_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if let Some(index) = DocumentSlot::parse_chapter_file_name(&name) {
                let title = read_document_title(&fs::read_to_string(&path)?)
                    .ok_or_else(|| ForgeError::mismatch(name.as_str(), "找不到<title>元素"))?;
                chapters.push(ConvertedDocument::new(DocumentSlot::Chapter(index), path, title));
            } else if super::is_cover_name(&name) {
                cover = Some(path);
            }
        }

        let cover = cover.ok_or_else(|| ForgeError::MissingCover(result_dir.clone()))?;
        let mut conversion = Conversion {
            result_dir,
            lang_code: lang_code.to_string(),
            book,
            cover,
            foreword,
            chapters,
            empty_chapters: Vec::new(),
        };
        conversion.rescan();
        Ok(conversion)
    }
}

/// 读取XHTML文档的 `<title>` 文本
pub fn read_document_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
}

/// 从生成的前言文档中读回书籍信息
pub fn read_book_info(html: &str) -> Result<BookInfo> {
    let document = Html::parse_document(html);
    let text_of = |selector: &Selector| {
        document
            .select(selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
    };

    let title = text_of(&NOVEL_TITLE_SELECTOR)
        .ok_or_else(|| ForgeError::mismatch(FOREWORD_XHTML, "找不到书名元素 h1.title"))?;
    let author = text_of(&AUTHOR_SELECTOR)
        .ok_or_else(|| ForgeError::mismatch(FOREWORD_XHTML, "找不到作者元素 p.author"))?;

    Ok(BookInfo {
        title,
        author,
        source_url: text_of(&SOURCE_SELECTOR).unwrap_or_default(),
        categories: text_of(&CATEGORIES_SELECTOR).unwrap_or_default(),
    })
}
