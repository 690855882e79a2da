//! 章节转换器
//!
//! [`ChapterRenderer`] 只负责把文本行填进模板，不接触文件系统；
//! [`FileConverter`] 负责扫描原始目录、写出结果文件并记录生成的文档。

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::LocaleStrings;
use crate::convert::document::{
    BookInfo, Conversion, ConvertedDocument, DocumentSlot, FOREWORD_XHTML,
};
use crate::epub::template::{self, Skeleton};
use crate::error::{ForgeError, Result};
use crate::text::{escape, normalize, paragraphs};

/// 原始目录中的前言文件名
pub const FOREWORD_TXT: &str = "foreword.txt";

/// 原始目录中可接受的封面文件名
pub const COVER_NAMES: [&str; 5] = [
    "cover.jpg",
    "cover.jpeg",
    "cover.png",
    "cover.webp",
    "cover.gif",
];

/// 前言文件开头的元数据行数：书名、作者、来源网址、分类
const FOREWORD_META_LINES: usize = 4;

/// 转换选项
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// 章节正文第一行重复了标题时删除它
    pub duplicate_chapter: bool,
    /// 写出前清空结果目录
    pub rm_result: bool,
    /// 语言代码
    pub lang_code: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            duplicate_chapter: false,
            rm_result: true,
            lang_code: crate::config::DEFAULT_LANG_CODE.to_string(),
        }
    }
}

/// 转换结果状态
#[derive(Debug)]
pub enum ConvertStatus<T> {
    /// 转换完成
    Done(T),
    /// 原始目录为空，没有需要处理的内容
    EmptyRawDir,
}

impl<T> ConvertStatus<T> {
    /// 取出转换结果，原始目录为空时返回None
    pub fn done(self) -> Option<T> {
        match self {
            ConvertStatus::Done(value) => Some(value),
            ConvertStatus::EmptyRawDir => None,
        }
    }
}

/// 模板渲染出的文档
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// 标题（未转义）
    pub title: String,
    /// XHTML内容
    pub content: String,
}

/// 把文本行渲染成XHTML
#[derive(Debug, Clone)]
pub struct ChapterRenderer {
    chapter_template: String,
    foreword_template: String,
    lang_code: String,
    foreword_title: String,
}

impl ChapterRenderer {
    /// 从骨架中读取章节模板和前言模板
    ///
    /// 任一模板缺失时返回 `TemplateMissing`。
    pub fn new(skeleton: &Skeleton, lang_code: &str, strings: &LocaleStrings) -> Result<Self> {
        Ok(Self {
            chapter_template: skeleton.read(template::CHAPTER_TEMPLATE)?,
            foreword_template: skeleton.read(template::FOREWORD_TEMPLATE)?,
            lang_code: lang_code.to_string(),
            foreword_title: strings.foreword_title.clone(),
        })
    }

    /// 渲染前言
    ///
    /// 前四行是书名、作者、来源网址和分类，原样（转义后）写入模板；
    /// 其余行经过断行修复后作为正文段落。行数不足四行时返回None。
    pub fn render_foreword<S: AsRef<str>>(
        &self,
        lines: &[S],
    ) -> Result<Option<(BookInfo, RenderedDocument)>> {
        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim()).collect();
        if lines.len() < FOREWORD_META_LINES {
            return Ok(None);
        }

        let book = BookInfo {
            title: lines[0].to_string(),
            author: lines[1].to_string(),
            source_url: lines[2].to_string(),
            categories: lines[3].to_string(),
        };
        let body = paragraphs(&normalize(&lines[FOREWORD_META_LINES..]));

        let content = template::render(
            FOREWORD_XHTML,
            &self.foreword_template,
            &[
                ("language_code", self.lang_code.as_str()),
                ("foreword_title", escape(&self.foreword_title).as_str()),
                ("novel_title", escape(&book.title).as_str()),
                ("author_name", escape(&book.author).as_str()),
                ("url", escape(&book.source_url).as_str()),
                ("types", escape(&book.categories).as_str()),
                ("foreword_p_tag_list", body.as_str()),
            ],
        )?;

        let document = RenderedDocument {
            title: self.foreword_title.clone(),
            content,
        };
        Ok(Some((book, document)))
    }

    /// 渲染一个章节
    ///
    /// 第一行是标题；`duplicate_title` 为真时删除第二行。正文为空时返回None。
    pub fn render_chapter<S: AsRef<str>>(
        &self,
        lines: &[S],
        duplicate_title: bool,
    ) -> Result<Option<RenderedDocument>> {
        let mut lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim()).collect();
        if lines.is_empty() {
            return Ok(None);
        }
        if duplicate_title && lines.len() > 1 {
            lines.remove(1);
        }

        let body = normalize(&lines[1..]);
        if body.is_empty() {
            return Ok(None);
        }

        let title = lines[0].to_string();
        let content = template::render(
            "c1.xhtml",
            &self.chapter_template,
            &[
                ("language_code", self.lang_code.as_str()),
                ("chapter_title", escape(&title).as_str()),
                ("chapter_p_tag_list", paragraphs(&body).as_str()),
            ],
        )?;

        Ok(Some(RenderedDocument { title, content }))
    }
}

/// 原始目录的扫描结果
#[derive(Debug)]
struct RawDirectory {
    cover: PathBuf,
    foreword: PathBuf,
    /// (章节编号, 文件路径)，按编号升序
    chapters: Vec<(u32, PathBuf)>,
}

/// 原始目录到结果目录的转换器
#[derive(Debug, Clone)]
pub struct FileConverter {
    raw_dir: PathBuf,
    result_dir: PathBuf,
}

impl FileConverter {
    /// 创建转换器
    ///
    /// # 参数
    /// * `raw_dir` - 原始目录，必须存在
    /// * `result_dir` - 结果目录，默认为原始目录同级的 `result_dir`，不存在时自动创建
    pub fn new<P: AsRef<Path>>(raw_dir: P, result_dir: Option<&Path>) -> Result<Self> {
        let raw_dir = raw_dir.as_ref().to_path_buf();
        if !raw_dir.is_dir() {
            return Err(ForgeError::RawDirNotFound(raw_dir));
        }

        let result_dir = match result_dir {
            Some(dir) => dir.to_path_buf(),
            None => raw_dir
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("result_dir"),
        };
        if !result_dir.exists() {
            fs::create_dir_all(&result_dir)?;
            info!("结果目录不存在，已自动创建: {}", result_dir.display());
        }

        Ok(Self { raw_dir, result_dir })
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// 把原始目录转换为XHTML文档
    ///
    /// 模板缺失、前言或封面缺失都会在写出任何文件之前报错。
    /// 正文为空的章节记录警告后跳过，不影响其余章节。
    pub fn convert_to_xhtml(
        &self,
        skeleton: &Skeleton,
        strings: &LocaleStrings,
        options: &ConvertOptions,
    ) -> Result<ConvertStatus<Conversion>> {
        let Some(raw) = self.scan_raw_dir()? else {
            return Ok(ConvertStatus::EmptyRawDir);
        };
        let renderer = ChapterRenderer::new(skeleton, &options.lang_code, strings)?;
        let foreword_lines = read_lines(&raw.foreword)?;
        if foreword_lines.len() < FOREWORD_META_LINES {
            return Err(ForgeError::InvalidForeword(raw.foreword));
        }

        if options.rm_result {
            self.rm_result()?;
        }

        let cover_name = file_name_of(&raw.cover);
        let cover = self.convert_cover(&fs::read(&raw.cover)?, &cover_name)?;

        let (book, foreword) = self.convert_foreword(&renderer, &foreword_lines)?;

        let mut chapters = Vec::with_capacity(raw.chapters.len());
        let mut empty_chapters = Vec::new();
        for (index, path) in &raw.chapters {
            let lines = read_lines(path)?;
            match self.convert_chapter(&renderer, &lines, *index, options.duplicate_chapter)? {
                Some(document) => chapters.push(document),
                None => empty_chapters.push(*index),
            }
        }

        info!("转换完成，结果目录: {}", self.result_dir.display());
        Ok(ConvertStatus::Done(Conversion {
            result_dir: self.result_dir.clone(),
            lang_code: options.lang_code.clone(),
            book,
            cover,
            foreword,
            chapters,
            empty_chapters,
        }))
    }

    /// 渲染并写出前言文档
    pub fn convert_foreword<S: AsRef<str>>(
        &self,
        renderer: &ChapterRenderer,
        lines: &[S],
    ) -> Result<(BookInfo, PathBuf)> {
        let (book, document) = renderer
            .render_foreword(lines)?
            .ok_or_else(|| ForgeError::InvalidForeword(self.raw_dir.join(FOREWORD_TXT)))?;

        let path = self.result_dir.join(FOREWORD_XHTML);
        fs::write(&path, document.content)?;
        Ok((book, path))
    }

    /// 渲染并写出一个章节文档
    ///
    /// 正文为空时记录警告并返回None，不写出文件。
    pub fn convert_chapter<S: AsRef<str>>(
        &self,
        renderer: &ChapterRenderer,
        lines: &[S],
        index: u32,
        duplicate_title: bool,
    ) -> Result<Option<ConvertedDocument>> {
        let path = self.result_dir.join(DocumentSlot::chapter_file_name(index));
        match renderer.render_chapter(lines, duplicate_title)? {
            Some(document) => {
                fs::write(&path, document.content)?;
                debug!("已生成章节 {}: {}", index, path.display());
                Ok(Some(ConvertedDocument::new(
                    DocumentSlot::Chapter(index),
                    path,
                    document.title,
                )))
            }
            None => {
                warn!("空章节: {}", path.display());
                Ok(None)
            }
        }
    }

    /// 把封面图片原样复制到结果目录
    pub fn convert_cover(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf> {
        let path = self.result_dir.join(file_name);
        if self.raw_dir.join(file_name) != path {
            fs::write(&path, bytes)?;
        }
        Ok(path)
    }

    /// 只清理文本，不生成XHTML
    ///
    /// 在结果目录中写出 `foreword.txt` 与 `{编号}.txt`，内容为修复断行后的文本。
    pub fn clean(&self, options: &ConvertOptions) -> Result<ConvertStatus<Vec<PathBuf>>> {
        let Some(raw) = self.scan_raw_dir()? else {
            return Ok(ConvertStatus::EmptyRawDir);
        };

        let lines = read_lines(&raw.foreword)?;
        if lines.len() < FOREWORD_META_LINES {
            return Err(ForgeError::InvalidForeword(raw.foreword));
        }

        if options.rm_result {
            self.rm_result()?;
        }

        let mut written = Vec::new();

        let cover_name = file_name_of(&raw.cover);
        written.push(self.convert_cover(&fs::read(&raw.cover)?, &cover_name)?);

        let mut cleaned = lines[..FOREWORD_META_LINES].to_vec();
        cleaned.extend(normalize(&lines[FOREWORD_META_LINES..]));
        let path = self.result_dir.join(FOREWORD_TXT);
        fs::write(&path, cleaned.join("\n"))?;
        written.push(path);

        for (index, raw_path) in &raw.chapters {
            let mut lines = read_lines(raw_path)?;
            if options.duplicate_chapter && lines.len() > 1 {
                lines.remove(1);
            }
            let path = self.result_dir.join(format!("{}.txt", index));
            let body = if lines.is_empty() { Vec::new() } else { normalize(&lines[1..]) };
            if body.is_empty() {
                warn!("空章节: {}", raw_path.display());
                continue;
            }
            let mut cleaned = vec![lines[0].clone()];
            cleaned.extend(body);
            fs::write(&path, cleaned.join("\n"))?;
            written.push(path);
        }

        info!("清理完成，结果目录: {}", self.result_dir.display());
        Ok(ConvertStatus::Done(written))
    }

    /// 扫描原始目录
    ///
    /// 目录为空时返回None。
    fn scan_raw_dir(&self) -> Result<Option<RawDirectory>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.raw_dir)? {
            entries.push(entry?.path());
        }
        if entries.is_empty() {
            return Ok(None);
        }

        let foreword = self.raw_dir.join(FOREWORD_TXT);
        if !foreword.is_file() {
            return Err(ForgeError::MissingForeword(foreword));
        }
        let cover = COVER_NAMES
            .iter()
            .map(|name| self.raw_dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| ForgeError::MissingCover(self.raw_dir.clone()))?;

        let mut chapters = Vec::new();
        for path in entries {
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "txt") || path == foreword {
                continue;
            }
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            match stem.parse::<u32>() {
                Ok(index) if index > 0 => chapters.push((index, path)),
                _ => warn!("忽略无法识别的章节文件: {}", path.display()),
            }
        }
        chapters.sort_by_key(|(index, _)| *index);

        Ok(Some(RawDirectory {
            cover,
            foreword,
            chapters,
        }))
    }

    /// 清空结果目录
    ///
    /// 结果目录与原始目录相同时不做任何操作；结果目录包含原始目录时返回错误。
    fn rm_result(&self) -> Result<()> {
        let raw = fs::canonicalize(&self.raw_dir)?;
        let result = fs::canonicalize(&self.result_dir)?;
        if result == raw {
            warn!("结果目录即原始目录，跳过清空: {}", self.result_dir.display());
            return Ok(());
        }
        if raw.starts_with(&result) {
            return Err(ForgeError::ResultContainsRaw { result, raw });
        }
        info!("清空结果目录: {}", self.result_dir.display());
        fs::remove_dir_all(&self.result_dir)?;
        fs::create_dir_all(&self.result_dir)?;
        Ok(())
    }
}

/// 读取文本文件的所有行并去掉首尾空白
fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(|line| line.trim().to_string())
        .collect())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
