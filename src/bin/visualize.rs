// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 随机抽取一张训练图片, 叠加 YOLO 标注框
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use steel_qc::config::DEFAULT_CONFIG_PATH;
use steel_qc::visualize::{load_font, load_sample, pick_random_image, render, show};
use steel_qc::{gen_time_string, logging, ProjectConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Draw stored YOLO boxes on a random training image", long_about = None)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 图片目录 (默认 <dataset_root>/train/images)
    #[arg(long)]
    images: Option<PathBuf>,

    /// 标签目录 (默认 <dataset_root>/train/labels)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// 类别名字体
    #[arg(long, default_value = "assets/font/DejaVuSans.ttf")]
    font: PathBuf,

    /// 输出文件 (默认 runs/visualize/<时间>.png)
    #[arg(long)]
    output: Option<PathBuf>,

    /// 不打开窗口
    #[arg(long)]
    no_window: bool,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let config = ProjectConfig::load(&args.config);

    let split = config.splits.first().map(String::as_str).unwrap_or("train");
    let images = args.images.unwrap_or_else(|| config.split_dir(split, "images"));
    let labels = args.labels.unwrap_or_else(|| config.split_dir(split, "labels"));

    let image_path = pick_random_image(&images)?;
    info!("🔍 Visualizing {}", image_path.display());
    let sample = load_sample(image_path, &labels)?;
    let font = load_font(&args.font);
    let annotated = render(&sample, &config.class_names, font.as_ref())?;

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from("runs/visualize").join(format!("{}.png", gen_time_string("-")))
    });
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    annotated
        .save(&output)
        .with_context(|| format!("failed to save {}", output.display()))?;
    info!("💾 已保存: {}", output.display());

    if !args.no_window {
        let title = format!(
            "Visualization for {}",
            sample.image_path.file_name().unwrap_or_default().to_string_lossy()
        );
        show(title, annotated);
    }
    Ok(())
}
