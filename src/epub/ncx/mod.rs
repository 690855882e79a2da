//! NCX（Navigation Control file for XML）模块
//!
//! 此模块负责toc.ncx导航点与nav.xhtml目录条目的生成，以及对已生成NCX的回读。

pub mod navigation;
pub mod parser;

pub use navigation::{NavContent, NavEntry, NavLabel, NavPoint};
pub use parser::Ncx;
