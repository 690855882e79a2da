//! EPUB模板骨架
//!
//! 骨架是一棵固定结构的目录树：根目录下的 `mimetype`、`META-INF/container.xml`、
//! `OEBPS/` 下的清单、导航与各类页面模板。每次打包前复制一份到暂存目录再填充内容。
//! 模板中的替换点写作 `{name}`。

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{ForgeError, Result};

pub const MIMETYPE: &str = "mimetype";
pub const CONTAINER: &str = "META-INF/container.xml";
pub const OPF_TEMPLATE: &str = "OEBPS/content.opf";
pub const NCX_TEMPLATE: &str = "OEBPS/toc.ncx";
pub const STYLESHEET: &str = "OEBPS/Styles/stylesheet.css";
pub const CHAPTER_TEMPLATE: &str = "OEBPS/Text/c1.xhtml";
pub const FOREWORD_TEMPLATE: &str = "OEBPS/Text/foreword.xhtml";
pub const COVER_TEMPLATE: &str = "OEBPS/Text/cover.xhtml";
pub const NAV_TEMPLATE: &str = "OEBPS/Text/nav.xhtml";
pub const TEXT_DIR: &str = "OEBPS/Text";
pub const IMAGES_DIR: &str = "OEBPS/Images";

/// 骨架中必须存在的文件
const REQUIRED: [&str; 9] = [
    MIMETYPE,
    CONTAINER,
    OPF_TEMPLATE,
    NCX_TEMPLATE,
    STYLESHEET,
    CHAPTER_TEMPLATE,
    FOREWORD_TEMPLATE,
    COVER_TEMPLATE,
    NAV_TEMPLATE,
];

/// 编译进程序的默认骨架
const EMBEDDED: [(&str, &str); 9] = [
    (MIMETYPE, include_str!("../../template/mimetype")),
    (CONTAINER, include_str!("../../template/META-INF/container.xml")),
    (OPF_TEMPLATE, include_str!("../../template/OEBPS/content.opf")),
    (NCX_TEMPLATE, include_str!("../../template/OEBPS/toc.ncx")),
    (STYLESHEET, include_str!("../../template/OEBPS/Styles/stylesheet.css")),
    (CHAPTER_TEMPLATE, include_str!("../../template/OEBPS/Text/c1.xhtml")),
    (FOREWORD_TEMPLATE, include_str!("../../template/OEBPS/Text/foreword.xhtml")),
    (COVER_TEMPLATE, include_str!("../../template/OEBPS/Text/cover.xhtml")),
    (NAV_TEMPLATE, include_str!("../../template/OEBPS/Text/nav.xhtml")),
];

/// 模板骨架来源
#[derive(Debug, Clone)]
pub enum Skeleton {
    /// 内置骨架
    Embedded,
    /// 磁盘上的骨架目录
    Directory(PathBuf),
}

impl Skeleton {
    /// 内置骨架
    pub fn embedded() -> Self {
        Skeleton::Embedded
    }

    /// 打开磁盘上的骨架目录，并检查必需文件是否齐全
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        let skeleton = Skeleton::Directory(root.as_ref().to_path_buf());
        skeleton.verify()?;
        Ok(skeleton)
    }

    /// 根据配置选择骨架
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.template_dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::embedded()),
        }
    }

    /// 检查必需文件
    ///
    /// 任何一个缺失都返回 `TemplateMissing`，调用方应在写出任何文件之前调用。
    pub fn verify(&self) -> Result<()> {
        if let Skeleton::Directory(root) = self {
            for name in REQUIRED {
                let path = root.join(name);
                if !path.is_file() {
                    return Err(ForgeError::TemplateMissing(path));
                }
            }
        }
        Ok(())
    }

    /// 读取骨架中的一个文本文件
    pub fn read(&self, name: &str) -> Result<String> {
        match self {
            Skeleton::Embedded => EMBEDDED
                .iter()
                .find(|(path, _)| *path == name)
                .map(|(_, content)| content.to_string())
                .ok_or_else(|| ForgeError::TemplateMissing(PathBuf::from(name))),
            Skeleton::Directory(root) => {
                let path = root.join(name);
                if !path.is_file() {
                    return Err(ForgeError::TemplateMissing(path));
                }
                Ok(fs::read_to_string(path)?)
            }
        }
    }

    /// 把整个骨架复制到目标目录
    pub fn copy_into(&self, dest: &Path) -> Result<()> {
        match self {
            Skeleton::Embedded => {
                for (name, content) in EMBEDDED {
                    let path = dest.join(name);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(path, content)?;
                }
            }
            Skeleton::Directory(root) => {
                for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
                    let entry = entry.map_err(std::io::Error::from)?;
                    let relative = entry
                        .path()
                        .strip_prefix(root)
                        .map_err(std::io::Error::other)?;
                    let target = dest.join(relative);
                    if entry.file_type().is_dir() {
                        fs::create_dir_all(&target)?;
                    } else {
                        if let Some(parent) = target.parent() {
                            fs::create_dir_all(parent)?;
                        }
                        fs::copy(entry.path(), &target)?;
                    }
                }
            }
        }
        // 空目录不会被版本库保留
        fs::create_dir_all(dest.join(IMAGES_DIR))?;
        Ok(())
    }
}

/// 填充模板
///
/// 单遍扫描：替换值中出现的 `{...}` 不会被再次展开；不在 `values` 中的花括号原样保留。
/// `values` 中的每个键都必须在模板中出现至少一次，否则返回 `TemplateMismatch`。
///
/// # 参数
/// * `template_name` - 模板名称，仅用于错误信息
/// * `template` - 模板内容
/// * `values` - (替换点名称, 替换值) 列表
pub fn render(template_name: &str, template: &str, values: &[(&str, &str)]) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut used = vec![false; values.len()];
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let matched = after.find('}').and_then(|end| {
            let key = &after[..end];
            values.iter().position(|(k, _)| *k == key).map(|pos| (pos, end))
        });
        match matched {
            Some((pos, end)) => {
                output.push_str(values[pos].1);
                used[pos] = true;
                rest = &after[end + 1..];
            }
            None => {
                output.push('{');
                rest = after;
            }
        }
    }
    output.push_str(rest);

    if let Some(pos) = used.iter().position(|u| !u) {
        return Err(ForgeError::mismatch(
            template_name,
            format!("缺少替换点 {{{}}}", values[pos].0),
        ));
    }

    Ok(output)
}
