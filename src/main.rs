use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use novelforge::{
    Config, ConvertOptions, ConvertStatus, Epub, EpubMaker, FileConverter, Result, Skeleton,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 📚 NovelForge - 小说EPUB制作工具
#[derive(Parser, Debug)]
#[command(name = "novelforge")]
#[command(about = "把小说原始章节目录转换为XHTML并打包成EPUB")]
#[command(version)]
struct Args {
    /// 配置文件路径，不存在时生成默认配置
    #[arg(long, global = true, help = "YAML配置文件路径")]
    config: Option<PathBuf>,

    /// 模板骨架目录
    #[arg(long, global = true, help = "覆盖配置中的模板骨架目录")]
    template_dir: Option<PathBuf>,

    /// 详细输出模式
    #[arg(short, long, global = true, help = "显示调试日志")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 把原始目录转换为XHTML文档
    Convert {
        /// 原始目录
        raw_dir: PathBuf,
        /// 语言代码
        #[arg(long)]
        lang_code: Option<String>,
        /// 删除章节正文中重复的标题行
        #[arg(long)]
        dup_chap: bool,
        /// 保留结果目录中已有的文件
        #[arg(long)]
        keep_result: bool,
        /// 结果目录，默认为原始目录同级的 result_dir
        #[arg(long)]
        result_dir: Option<PathBuf>,
    },
    /// 只清理原始文本，输出规范化后的txt文件
    Clean {
        /// 原始目录
        raw_dir: PathBuf,
        /// 删除章节正文中重复的标题行
        #[arg(long)]
        dup_chap: bool,
        /// 保留结果目录中已有的文件
        #[arg(long)]
        keep_result: bool,
        /// 结果目录，默认为原始目录同级的 result_dir
        #[arg(long)]
        result_dir: Option<PathBuf>,
    },
    /// 从原始目录生成EPUB
    Epub {
        /// 原始目录
        raw_dir: PathBuf,
        /// 删除章节正文中重复的标题行
        #[arg(long)]
        dup_chap: bool,
        /// 语言代码
        #[arg(long)]
        lang_code: Option<String>,
        /// 输出目录，默认为当前目录
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 把已转换的结果目录打包为EPUB
    Package {
        /// 结果目录
        result_dir: PathBuf,
        /// 语言代码
        #[arg(long)]
        lang_code: Option<String>,
        /// 输出目录，默认为当前目录
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 暂存目录，默认为结果目录同级的 epub
        #[arg(long)]
        work_dir: Option<PathBuf>,
    },
    /// 校验EPUB文件并列出条目与目录
    Inspect {
        /// EPUB文件路径
        epub_file: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_or_init(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.template_dir {
        config.template_dir = Some(dir);
    }

    match args.command {
        Commands::Convert {
            raw_dir,
            lang_code,
            dup_chap,
            keep_result,
            result_dir,
        } => {
            let lang_code = lang_code.unwrap_or_else(|| config.lang_code.clone());
            let skeleton = Skeleton::from_config(&config)?;
            let converter = FileConverter::new(&raw_dir, result_dir.as_deref())?;
            let options = convert_options(dup_chap, keep_result, &lang_code);
            match converter.convert_to_xhtml(&skeleton, config.strings(&lang_code), &options)? {
                ConvertStatus::Done(conversion) => {
                    println!("📖 {} - {}", conversion.book.title, conversion.book.author);
                    println!("  已转换 {} 个章节", conversion.chapters.len());
                    if !conversion.empty_chapters.is_empty() {
                        println!("  ⚠️  跳过空章节: {:?}", conversion.empty_chapters);
                    }
                    println!("  结果目录: {}", conversion.result_dir.display());
                }
                ConvertStatus::EmptyRawDir => nothing_to_do(&raw_dir),
            }
        }
        Commands::Clean {
            raw_dir,
            dup_chap,
            keep_result,
            result_dir,
        } => {
            let converter = FileConverter::new(&raw_dir, result_dir.as_deref())?;
            let options = convert_options(dup_chap, keep_result, &config.lang_code);
            match converter.clean(&options)? {
                ConvertStatus::Done(files) => {
                    println!("🧹 已写出 {} 个文件到 {}", files.len(), converter.result_dir().display());
                }
                ConvertStatus::EmptyRawDir => nothing_to_do(&raw_dir),
            }
        }
        Commands::Epub {
            raw_dir,
            dup_chap,
            lang_code,
            output,
        } => {
            let maker = EpubMaker::new(output_dir(output)?, config)?;
            match maker.from_raw(&raw_dir, dup_chap, lang_code.as_deref())? {
                ConvertStatus::Done(path) => println!("🎉 已生成: {}", path.display()),
                ConvertStatus::EmptyRawDir => nothing_to_do(&raw_dir),
            }
        }
        Commands::Package {
            result_dir,
            lang_code,
            output,
            work_dir,
        } => {
            let mut maker = EpubMaker::new(output_dir(output)?, config)?;
            if let Some(dir) = work_dir {
                maker = maker.with_work_dir(dir);
            }
            let path = maker.from_result(&result_dir, lang_code.as_deref())?;
            println!("🎉 已生成: {}", path.display());
        }
        Commands::Inspect { epub_file } => inspect(&epub_file, args.verbose)?,
    }

    Ok(())
}

fn convert_options(dup_chap: bool, keep_result: bool, lang_code: &str) -> ConvertOptions {
    ConvertOptions {
        duplicate_chapter: dup_chap,
        rm_result: !keep_result,
        lang_code: lang_code.to_string(),
    }
}

fn output_dir(output: Option<PathBuf>) -> Result<PathBuf> {
    match output {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

fn nothing_to_do(raw_dir: &Path) {
    info!("原始目录为空，没有需要处理的内容: {}", raw_dir.display());
}

fn inspect(path: &Path, verbose: bool) -> Result<()> {
    // 创建Epub实例，会自动验证mimetype条目
    let mut epub = Epub::new(path)?;
    println!("✅ EPUB验证成功: {}", path.display());

    println!("\n📁 EPUB文件内容:");
    let files = epub.list_files()?;
    if verbose {
        for (i, file) in files.iter().enumerate() {
            println!("  {}. {}", i + 1, file);
        }
    } else {
        println!("  共找到 {} 个文件", files.len());
    }

    println!("  📚 主OPF文件路径: {}", epub.get_opf_path()?);

    let ncx = epub.parse_ncx()?;
    println!("\n🧭 NCX导航信息:");
    if let Some(title) = &ncx.doc_title {
        println!("  文档标题: {}", title);
    }
    if let Some(uid) = &ncx.uid {
        println!("  唯一标识符: {}", uid);
    }
    println!("  导航点总数: {}", ncx.nav_points.len());
    for point in &ncx.nav_points {
        println!(
            "    {}. {} -> {}",
            point.play_order, point.nav_label.text, point.content.src
        );
    }

    Ok(())
}
