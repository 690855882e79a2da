//! EPUB打包
//!
//! 把填充完成的暂存目录写成 `.epub` 压缩包：`mimetype` 作为第一个条目且不压缩，
//! 其余文件按路径排序后以 Deflate 9 级压缩写入。

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::epub::template::MIMETYPE;
use crate::error::{ForgeError, Result};

/// 归档文件名中需要替换的字符
const HOSTILE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// 压缩包写入器
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchivePackager;

impl ArchivePackager {
    /// 书名对应的归档文件名 `{书名}.epub`，路径敏感字符和控制字符替换为 `_`
    pub fn archive_file_name(title: &str) -> String {
        let stem: String = title
            .trim()
            .chars()
            .map(|c| {
                if HOSTILE_CHARS.contains(&c) || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        let stem = if stem.is_empty() { "book".to_string() } else { stem };
        format!("{}.epub", stem)
    }

    /// 打包暂存目录
    ///
    /// 先写入 `<dest>.part`，成功后再改名为 `dest`，已有的同名文件会被覆盖。
    ///
    /// # 参数
    /// * `staging` - 暂存目录根
    /// * `dest` - 目标 `.epub` 路径
    ///
    /// # 返回值
    /// * `Result<PathBuf>` - 生成的文件路径
    pub fn package(&self, staging: &Path, dest: &Path) -> Result<PathBuf> {
        let mimetype = staging.join(MIMETYPE);
        if !mimetype.is_file() {
            return Err(ForgeError::MissingMimetype);
        }

        let mut part_name = dest.as_os_str().to_os_string();
        part_name.push(".part");
        let part = PathBuf::from(part_name);

        if let Err(err) = self.write_archive(staging, &mimetype, &part) {
            let _ = fs::remove_file(&part);
            return Err(err);
        }
        fs::rename(&part, dest)?;

        info!("已生成EPUB: {}", dest.display());
        Ok(dest.to_path_buf())
    }

    fn write_archive(&self, staging: &Path, mimetype: &Path, part: &Path) -> Result<()> {
        let file = File::create(part)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9));

        zip.start_file(MIMETYPE, stored)?;
        zip.write_all(&fs::read(mimetype)?)?;

        for entry in WalkDir::new(staging).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(staging)
                .map_err(io::Error::other)?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if name == MIMETYPE {
                continue;
            }

            debug!("写入条目: {}", name);
            zip.start_file(name, deflated)?;
            zip.write_all(&fs::read(entry.path())?)?;
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        Ok(())
    }
}
