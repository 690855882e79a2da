//! 文本处理模块
//!
//! 原始章节文本的断行修复与XHTML转义。

mod escape;
mod normalize;

pub use escape::{escape, paragraphs};
pub use normalize::normalize;
