//! 配置模块
//!
//! 提供转换流程的配置管理功能，支持从YAML文件加载配置。
//! 界面文字（封面、目录、前言标题）按语言代码存放在一张可扩展的表中。

use crate::error::{ForgeError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认语言代码
pub const DEFAULT_LANG_CODE: &str = "vi";

/// 默认出版方名称
pub const DEFAULT_PUBLISHER: &str = "hacde";

/// 语言表中找不到任何条目时使用的界面文字
static BUILTIN_STRINGS: Lazy<LocaleStrings> =
    Lazy::new(|| LocaleStrings::new("Ảnh bìa", "Mục lục", "Lời tựa"));

/// 单个语言的界面文字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleStrings {
    /// 封面标题
    pub cover_title: String,
    /// 目录标题
    pub nav_title: String,
    /// 前言标题
    pub foreword_title: String,
}

impl LocaleStrings {
    pub fn new(cover_title: &str, nav_title: &str, foreword_title: &str) -> Self {
        Self {
            cover_title: cover_title.to_string(),
            nav_title: nav_title.to_string(),
            foreword_title: foreword_title.to_string(),
        }
    }
}

/// 语言代码到界面文字的映射表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleTable {
    /// 未知语言代码回退到的语言
    pub fallback: String,
    /// 语言代码 -> 界面文字
    pub table: BTreeMap<String, LocaleStrings>,
}

impl LocaleTable {
    /// 查找语言代码对应的界面文字
    ///
    /// 未知代码回退到 `fallback`；若表中连 `fallback` 也没有，使用内置的越南语文字。
    pub fn strings(&self, lang_code: &str) -> &LocaleStrings {
        self.table
            .get(lang_code)
            .or_else(|| self.table.get(&self.fallback))
            .unwrap_or(&*BUILTIN_STRINGS)
    }
}

impl Default for LocaleTable {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        table.insert("vi".to_string(), (*BUILTIN_STRINGS).clone());
        table.insert("zh".to_string(), LocaleStrings::new("封面", "目录", "前言"));
        table.insert("en".to_string(), LocaleStrings::new("Cover", "Contents", "Foreword"));
        Self {
            fallback: DEFAULT_LANG_CODE.to_string(),
            table,
        }
    }
}

/// 转换流程配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 默认语言代码
    pub lang_code: String,
    /// 写入content.opf的出版方
    pub publisher: String,
    /// 模板目录，为空时使用内置模板
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    /// 界面文字表
    pub locales: LocaleTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang_code: DEFAULT_LANG_CODE.to_string(),
            publisher: DEFAULT_PUBLISHER.to_string(),
            template_dir: None,
            locales: LocaleTable::default(),
        }
    }
}

impl Config {
    /// 从YAML配置文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ForgeError::ConfigError(format!("无法读取配置文件: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// 从YAML字符串解析
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content)
            .map_err(|e| ForgeError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 生成默认配置文件
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = serde_yml::to_string(&Self::default())
            .map_err(|e| ForgeError::ConfigError(format!("序列化配置失败: {}", e)))?;

        let content_with_header = format!(
            "# novelforge 配置文件\n# locales.table 中可以添加新的语言代码\n\n{}",
            yaml_content
        );

        fs::write(path.as_ref(), content_with_header)
            .map_err(|e| ForgeError::ConfigError(format!("写入配置文件失败: {}", e)))
    }

    /// 加载配置文件，文件不存在时先生成默认配置再加载
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("配置文件不存在，生成默认配置: {}", path.display());
            Self::generate_default_config(path)?;
        }
        Self::from_file(path)
    }

    /// 当前语言的界面文字
    pub fn strings(&self, lang_code: &str) -> &LocaleStrings {
        self.locales.strings(lang_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_locale() {
        let config = Config::default();
        assert_eq!(config.strings("zh").cover_title, "封面");
        assert_eq!(config.strings("en").nav_title, "Contents");
    }

    #[test]
    fn test_unknown_locale_falls_back() {
        let config = Config::default();
        assert!(!config.locales.table.contains_key("fr"));
        assert_eq!(config.strings("fr"), config.strings("vi"));
        assert_eq!(config.strings("fr").foreword_title, "Lời tựa");
    }

    #[test]
    fn test_missing_fallback_uses_builtin() {
        let locales = LocaleTable {
            fallback: "xx".to_string(),
            table: BTreeMap::new(),
        };
        assert_eq!(locales.strings("zh").nav_title, "Mục lục");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("publisher: someone\n").unwrap();
        assert_eq!(config.publisher, "someone");
        assert_eq!(config.lang_code, "vi");
        assert!(config.locales.table.contains_key("zh"));
    }

    #[test]
    fn test_yaml_extends_table() {
        let yaml = r#"
locales:
  fallback: en
  table:
    en:
      cover_title: Cover
      nav_title: Contents
      foreword_title: Foreword
    fr:
      cover_title: Couverture
      nav_title: Sommaire
      foreword_title: Avant-propos
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.strings("fr").nav_title, "Sommaire");
        assert_eq!(config.strings("de").cover_title, "Cover");
    }

    #[test]
    fn test_load_or_init_generates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("novelforge.yaml");

        let config = Config::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.publisher, DEFAULT_PUBLISHER);

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.strings("zh"), config.strings("zh"));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Config::from_yaml("locales: [1, 2");
        assert!(matches!(result, Err(ForgeError::ConfigError(_))));
    }
}
