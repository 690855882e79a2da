//! OPF（Open Packaging Format）包文件模块
//!
//! 此模块提供content.opf中清单与脊柱条目的生成。

mod manifest;
mod spine;

pub use manifest::{ManifestItem, XHTML_MEDIA_TYPE};
pub use spine::SpineItem;
