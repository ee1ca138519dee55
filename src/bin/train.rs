// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 训练驱动: 固定超参数调用 `yolo detect train`
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use steel_qc::config::DEFAULT_CONFIG_PATH;
use steel_qc::dataset::DataYaml;
use steel_qc::training::{self, TrainingPlan};
use steel_qc::{logging, ProjectConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the NEU defect detector with Ultralytics", long_about = None)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 训练前写出数据集描述 YAML
    #[arg(long)]
    write_data_yaml: bool,

    /// 训练完成后把 best.pt 导出为 ONNX
    #[arg(long)]
    export_onnx: bool,

    /// 只打印命令, 不执行
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let config = ProjectConfig::load(&args.config);

    let plan = TrainingPlan {
        data: config.data_yaml.clone(),
        ..Default::default()
    };

    if args.write_data_yaml {
        let yaml = DataYaml::from_config(&config);
        if args.dry_run {
            println!("# {}\n{}", config.data_yaml.display(), yaml.render());
        } else {
            yaml.write(&config.data_yaml)?;
            info!("💾 数据集描述已写入 {}", config.data_yaml.display());
        }
    }

    if args.dry_run {
        println!("{}", plan.describe(&plan.train_args()));
        if args.export_onnx {
            println!("{}", plan.describe(&plan.export_args(&plan.best_weights())));
        }
        return Ok(());
    }

    training::train(&plan)?;
    if args.export_onnx {
        let onnx = training::export_onnx(&plan, &plan.best_weights())?;
        info!("模型可用于仿真: --model {}", onnx.display());
    }
    Ok(())
}
