pub mod config;
pub mod convert;
pub mod epub;
pub mod error;
pub mod text;

// === 核心API重新导出 ===

/// EPUB生成器（主要接口）
pub use epub::EpubMaker;

/// 错误处理
pub use error::{ForgeError, Result};

/// 配置
pub use config::{Config, LocaleStrings, LocaleTable};

// === 流程组件 ===

/// 文本规范化与转义
pub use text::{escape, normalize, paragraphs};

/// 原始章节转换
pub use convert::{
    BookInfo, ChapterRenderer, ConvertOptions, ConvertStatus, Conversion, ConvertedDocument,
    DocumentSlot, FileConverter,
};

/// 清单生成与打包
pub use epub::{ArchivePackager, BookIdentity, BookManifest, CoverImage, ManifestBuilder, Skeleton};

// === 底层组件（高级用法） ===

/// EPUB读取与校验
pub use epub::{Container, Epub, Ncx, RootFile};

// === 库信息 ===

/// NovelForge库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NovelForge库的描述
pub const DESCRIPTION: &str = "把小说原始章节目录转换为EPUB电子书";

// === 便捷函数 ===

/// 用默认配置把原始目录打包为EPUB
///
/// 这是 `EpubMaker::from_raw` 的便捷包装函数。
///
/// # 参数
/// * `raw_dir` - 原始目录
/// * `output_dir` - `.epub` 文件的输出目录
///
/// # 返回值
/// * `Result<ConvertStatus<PathBuf>>` - 生成的文件路径
///
/// # 示例
///
/// ```no_run
/// let status = novelforge::make_epub("novel/raw", "novel")?;
/// if let Some(path) = status.done() {
///     println!("已生成: {}", path.display());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn make_epub<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    raw_dir: P,
    output_dir: Q,
) -> Result<ConvertStatus<std::path::PathBuf>> {
    EpubMaker::new(output_dir, Config::default())?.from_raw(raw_dir, false, None)
}

/// 打开并校验一个EPUB文件
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Epub> {
    Epub::new(path)
}
