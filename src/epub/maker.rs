//! EPUB生成流程
//!
//! 把转换、暂存、清单生成和打包串成一次完整的运行。每个阶段结束后才进入下一阶段，
//! 压缩包只在暂存目录完全就绪之后才开始写入。

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::convert::{ConvertOptions, ConvertStatus, Conversion, FileConverter};
use crate::epub::builder::{BookIdentity, ManifestBuilder};
use crate::epub::cover::CoverImage;
use crate::epub::packager::ArchivePackager;
use crate::epub::template::{CHAPTER_TEMPLATE, IMAGES_DIR, Skeleton, TEXT_DIR};
use crate::error::{ForgeError, Result};

/// 暂存目录的默认名称，位于原始目录或结果目录的同级
const STAGING_DIR: &str = "epub";

/// EPUB生成器
#[derive(Debug, Clone)]
pub struct EpubMaker {
    output_dir: PathBuf,
    config: Config,
    skeleton: Skeleton,
    work_dir: Option<PathBuf>,
}

impl EpubMaker {
    /// 创建生成器
    ///
    /// # 参数
    /// * `output_dir` - `.epub` 文件的输出目录
    /// * `config` - 配置，决定骨架来源、出版方与本地化字符串
    pub fn new<P: AsRef<Path>>(output_dir: P, config: Config) -> Result<Self> {
        let skeleton = Skeleton::from_config(&config)?;
        Ok(Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            config,
            skeleton,
            work_dir: None,
        })
    }

    /// 指定暂存目录
    pub fn with_work_dir<P: AsRef<Path>>(mut self, work_dir: P) -> Self {
        self.work_dir = Some(work_dir.as_ref().to_path_buf());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 从原始目录生成EPUB
    ///
    /// # 参数
    /// * `raw_dir` - 原始目录
    /// * `duplicate_chapter` - 章节正文第一行重复了标题时删除它
    /// * `lang_code` - 语言代码，缺省时使用配置中的值
    ///
    /// # 返回值
    /// * `Result<ConvertStatus<PathBuf>>` - 生成的 `.epub` 路径；原始目录为空时返回 `EmptyRawDir`
    pub fn from_raw<P: AsRef<Path>>(
        &self,
        raw_dir: P,
        duplicate_chapter: bool,
        lang_code: Option<&str>,
    ) -> Result<ConvertStatus<PathBuf>> {
        let raw_dir = raw_dir.as_ref();
        let lang_code = lang_code.unwrap_or(self.config.lang_code.as_str());
        let staging = self.staging_dir(raw_dir);
        self.check_output_dir(&staging)?;
        let converter = FileConverter::new(raw_dir, None)?;
        let options = ConvertOptions {
            duplicate_chapter,
            rm_result: true,
            lang_code: lang_code.to_string(),
        };

        let status = converter.convert_to_xhtml(
            &self.skeleton,
            self.config.strings(lang_code),
            &options,
        )?;
        let mut conversion = match status {
            ConvertStatus::Done(conversion) => conversion,
            ConvertStatus::EmptyRawDir => {
                info!("原始目录为空，没有需要处理的内容: {}", raw_dir.display());
                return Ok(ConvertStatus::EmptyRawDir);
            }
        };

        self.make_epub(&mut conversion, &staging).map(ConvertStatus::Done)
    }

    /// 从已有的结果目录生成EPUB
    ///
    /// 书名、作者和章节标题从结果目录中的XHTML文档读回。
    pub fn from_result<P: AsRef<Path>>(&self, result_dir: P, lang_code: Option<&str>) -> Result<PathBuf> {
        let result_dir = result_dir.as_ref();
        let lang_code = lang_code.unwrap_or(self.config.lang_code.as_str());
        let staging = self.staging_dir(result_dir);
        self.check_output_dir(&staging)?;
        let mut conversion = Conversion::from_result_dir(result_dir, lang_code)?;
        self.make_epub(&mut conversion, &staging)
    }

    fn staging_dir(&self, sibling: &Path) -> PathBuf {
        match &self.work_dir {
            Some(dir) => dir.clone(),
            None => sibling
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(STAGING_DIR),
        }
    }

    /// 输出目录不能是暂存目录或位于其中，否则打包时会把自身写进压缩包，
    /// 下一次暂存时也会删掉已生成的文件
    fn check_output_dir(&self, staging: &Path) -> Result<()> {
        let output = absolute_path(&self.output_dir)?;
        let staging = absolute_path(staging)?;
        if output.starts_with(&staging) {
            return Err(ForgeError::OutputInsideStaging { output, staging });
        }
        Ok(())
    }

    fn make_epub(&self, conversion: &mut Conversion, staging: &Path) -> Result<PathBuf> {
        let cover = self.stage(conversion, staging)?;

        let strings = self.config.strings(&conversion.lang_code);
        let builder = ManifestBuilder::new(strings);
        let manifest = builder.build(&conversion.chapters);
        let identity = BookIdentity::new(&conversion.book, &conversion.lang_code, &self.config.publisher);
        builder.write_documents(staging, &manifest, &identity, &cover)?;

        fs::create_dir_all(&self.output_dir)?;
        let dest = self
            .output_dir
            .join(ArchivePackager::archive_file_name(&conversion.book.title));
        let epub = ArchivePackager.package(staging, &dest)?;
        info!("EPUB生成完成: {}", epub.display());
        Ok(epub)
    }

    /// 准备暂存目录：复制骨架，放入转换结果，把封面移到图片目录
    fn stage(&self, conversion: &mut Conversion, staging: &Path) -> Result<CoverImage> {
        if staging.exists() {
            fs::remove_dir_all(staging)?;
        }
        fs::create_dir_all(staging)?;
        self.skeleton.copy_into(staging)?;
        debug!("已复制骨架到暂存目录: {}", staging.display());

        let text_dir = staging.join(TEXT_DIR);
        let images_dir = staging.join(IMAGES_DIR);
        fs::remove_file(staging.join(CHAPTER_TEMPLATE))?;
        for entry in fs::read_dir(&images_dir)? {
            let path = entry?.path();
            if path.file_stem().is_some_and(|stem| stem == "cover") {
                fs::remove_file(path)?;
            }
        }

        conversion.rescan();
        copy_into_dir(&conversion.foreword, &text_dir)?;
        for document in &conversion.chapters {
            copy_into_dir(&document.path, &text_dir)?;
        }

        let staged_cover = copy_into_dir(&conversion.cover, &text_dir)?;
        let cover = CoverImage::probe(&staged_cover)?;
        fs::rename(&staged_cover, images_dir.join(cover.file_name()))?;
        debug!("封面: {} ({}x{})", cover.file_name(), cover.width, cover.height);

        Ok(cover)
    }
}

/// 转为绝对路径并按字面消去 `.` 与 `..`，路径不必存在
fn absolute_path(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// 把文件复制到目录中，保留文件名
fn copy_into_dir(file: &Path, dir: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .ok_or_else(|| std::io::Error::other(format!("无效的文件路径: {}", file.display())))?;
    let target = dir.join(name);
    fs::copy(file, &target)?;
    Ok(target)
}
