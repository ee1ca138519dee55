// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 展平按类别分目录存放的图片
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use steel_qc::config::DEFAULT_CONFIG_PATH;
use steel_qc::dataset::flatten_splits;
use steel_qc::{logging, ProjectConfig};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Move images out of per-class subfolders", long_about = None)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 数据集根目录 (默认 dataset_root)
    #[arg(long)]
    base: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let config = ProjectConfig::load(&args.config);
    let base = args.base.unwrap_or_else(|| config.dataset_root.clone());

    let report = flatten_splits(&base, &config.splits)?;
    for path in &report.collisions {
        warn!("⚠️ 未移动 (目标已存在): {}", path.display());
    }
    info!(
        "✅ Flattening complete: {} files moved, {} folders removed",
        report.moved, report.removed_dirs
    );
    Ok(())
}
