use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForgeError>;

/// 转换与打包流程中的错误类型
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("图片解析错误: {0}")]
    Image(#[from] image::ImageError),

    #[error("模板文件缺失: {0}")]
    TemplateMissing(PathBuf),

    #[error("模板不匹配 ({template}): {detail}")]
    TemplateMismatch { template: String, detail: String },

    #[error("原始目录不存在: {0}")]
    RawDirNotFound(PathBuf),

    #[error("缺少前言文件: {0}")]
    MissingForeword(PathBuf),

    #[error("前言文件至少需要四行元数据（标题、作者、来源、分类）: {0}")]
    InvalidForeword(PathBuf),

    #[error("原始目录中没有封面图片: {0}")]
    MissingCover(PathBuf),

    #[error("无法识别封面图片格式: {0}")]
    UnsupportedCover(PathBuf),

    #[error("输出目录 {output} 位于暂存目录 {staging} 之内")]
    OutputInsideStaging { output: PathBuf, staging: PathBuf },

    #[error("结果目录 {result} 包含原始目录 {raw}，拒绝清空")]
    ResultContainsRaw { result: PathBuf, raw: PathBuf },

    #[error("文件不是有效的EPUB格式: {0}")]
    InvalidEpub(String),

    #[error("缺少mimetype文件")]
    MissingMimetype,

    #[error("无效的mimetype: {expected}, 找到: {found}")]
    InvalidMimetype { expected: String, found: String },

    #[error("container.xml解析错误: {0}")]
    ContainerParseError(String),

    #[error("配置文件错误: {0}")]
    ConfigError(String),
}

impl ForgeError {
    pub(crate) fn mismatch(template: impl Into<String>, detail: impl Into<String>) -> Self {
        ForgeError::TemplateMismatch {
            template: template.into(),
            detail: detail.into(),
        }
    }
}
