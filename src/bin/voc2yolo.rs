// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// VOC → YOLO 标注转换
///
/// 默认处理 `<dataset_root>/{train,validation}/annotations`,
/// 标签写入 `<target>/<split>/labels`
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use steel_qc::config::DEFAULT_CONFIG_PATH;
use steel_qc::dataset::{annotation_dirs_for, convert_folders};
use steel_qc::{logging, ProjectConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert Pascal VOC XML annotations to YOLO labels", long_about = None)]
struct Args {
    /// 配置文件
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 标注目录 (可多次指定, 默认取配置中的各 split)
    #[arg(long)]
    annotations: Vec<PathBuf>,

    /// 输出根目录 (默认 dataset_root)
    #[arg(long)]
    target: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let config = ProjectConfig::load(&args.config);

    let dirs = if args.annotations.is_empty() {
        annotation_dirs_for(&config.dataset_root, &config.splits)
    } else {
        args.annotations
    };
    let target = args.target.unwrap_or_else(|| config.dataset_root.clone());

    let report = convert_folders(&dirs, &target, &config.class_names)?;
    info!(
        "✅ Conversion complete: {} folders, {} files, {} objects ({} skipped)",
        report.folders, report.files, report.objects, report.skipped_objects
    );
    Ok(())
}
