pub mod builder;
pub mod container;
pub mod cover;
pub mod maker;
pub mod ncx;
pub mod opf;
pub mod packager;
pub mod reader;
pub mod template;

// 重新导出容器相关
pub use container::{Container, RootFile};

// 重新导出EPUB生成流程
pub use builder::{BookIdentity, BookManifest, COVER_XHTML, ManifestBuilder};
pub use cover::CoverImage;
pub use maker::EpubMaker;
pub use packager::ArchivePackager;
pub use template::{Skeleton, render};

// 重新导出EPUB读取器
pub use reader::{EPUB_MIMETYPE, Epub};

// 重新导出OPF相关
pub use opf::{ManifestItem, SpineItem};

// 重新导出NCX相关
pub use ncx::{NavEntry, NavPoint, Ncx};
