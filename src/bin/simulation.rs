// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 传送带质检仿真
///
/// 零件经过巡检工位时, 随机取一张测试图片交给检测模型,
/// 按处置结果给零件着色。Esc 退出。
use std::path::PathBuf;

use clap::Parser;
use steel_qc::config::DEFAULT_CONFIG_PATH;
use steel_qc::dataset::list_images;
use steel_qc::inspection::{InspectionJournal, QualityAgent};
use steel_qc::simulation::{self, window_conf, InspectionWorker};
use steel_qc::{logging, DetectorArgs, ProjectConfig, YOLOv8};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Agentic quality control conveyor simulation", long_about = None)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 测试图片目录 (默认取配置中的 test_images_dir)
    #[arg(long)]
    test_images: Option<PathBuf>,

    /// 巡检记录 (JSON Lines)
    #[arg(long)]
    journal: Option<PathBuf>,

    #[command(flatten)]
    detector: DetectorArgs,
}

#[macroquad::main(window_conf)]
async fn main() {
    logging::init();
    let args = Args::parse();
    let config = ProjectConfig::load(&args.config);

    let model_path = args.detector.model.clone().unwrap_or(config.model_path.clone());
    let model = match YOLOv8::new(&model_path, &args.detector) {
        Ok(m) => m,
        Err(e) => {
            error!("❌ {:#}", e);
            error!("Please train the model first (cargo run --bin train -- --export-onnx).");
            return;
        }
    };
    model.summary();

    let test_dir = args.test_images.unwrap_or(config.test_images_dir.clone());
    let test_images = match list_images(&test_dir) {
        Ok(images) if !images.is_empty() => images,
        Ok(_) => {
            error!("❌ No test images found in '{}'", test_dir.display());
            return;
        }
        Err(e) => {
            error!("❌ {}", e);
            return;
        }
    };
    info!("✅ {} test images in {}", test_images.len(), test_dir.display());

    let journal = match args.journal.as_ref().map(InspectionJournal::open).transpose() {
        Ok(journal) => journal,
        Err(e) => {
            error!("❌ {:#}", e);
            return;
        }
    };

    let worker = InspectionWorker::spawn(QualityAgent::new(model), journal);
    simulation::run(worker, test_images).await;
}
