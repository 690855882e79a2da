//! 封面图片探测
//!
//! 封面的扩展名以文件内容的真实编码为准，而不是原始文件名。

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};

use crate::error::{ForgeError, Result};

/// 封面图片信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    /// 规范扩展名（小写，不含点）
    pub ext: String,
    /// 媒体类型
    pub media_type: String,
    /// 宽度（像素）
    pub width: u32,
    /// 高度（像素）
    pub height: u32,
}

impl CoverImage {
    /// 根据文件内容识别编码并读取尺寸
    ///
    /// # 参数
    /// * `path` - 封面图片路径
    ///
    /// # 返回值
    /// * `Result<CoverImage>` - 无法识别编码时返回 `UnsupportedCover`
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<CoverImage> {
        let path = path.as_ref();
        // 不经过 `ImageReader::open`，它会先按扩展名设定格式
        let reader = ImageReader::new(Cursor::new(fs::read(path)?)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| ForgeError::UnsupportedCover(path.to_path_buf()))?;
        let ext = Self::canonical_ext(format)
            .ok_or_else(|| ForgeError::UnsupportedCover(path.to_path_buf()))?;
        let (width, height) = reader.into_dimensions()?;

        Ok(CoverImage {
            ext: ext.to_string(),
            media_type: format.to_mime_type().to_string(),
            width,
            height,
        })
    }

    /// 暂存目录中封面图片的文件名
    pub fn file_name(&self) -> String {
        format!("cover.{}", self.ext)
    }

    fn canonical_ext(format: ImageFormat) -> Option<&'static str> {
        format.extensions_str().first().copied()
    }
}
