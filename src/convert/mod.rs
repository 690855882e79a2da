//! 原始章节转换模块
//!
//! 把爬虫输出的原始目录（封面、`foreword.txt`、`{编号}.txt`）转换为XHTML文档。

pub mod converter;
pub mod document;

pub use converter::{
    COVER_NAMES, ChapterRenderer, ConvertOptions, ConvertStatus, FOREWORD_TXT, FileConverter,
    RenderedDocument,
};
pub use document::{
    BookInfo, Conversion, ConvertedDocument, DocumentSlot, FOREWORD_XHTML, read_book_info,
    read_document_title,
};

/// 是否为可接受的封面文件名
pub(crate) fn is_cover_name(name: &str) -> bool {
    COVER_NAMES.contains(&name)
}
