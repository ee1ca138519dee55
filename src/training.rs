// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 训练驱动
//!
//! 训练本身由 Ultralytics `yolo` 命令行完成, 这里只负责固定超参数、
//! 检查 GPU、启动子进程, 以及把 best.pt 导出为仿真使用的 ONNX

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::gpu;

/// 固定的训练超参数
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPlan {
    pub program: String, // Ultralytics CLI
    pub model: String,
    pub data: PathBuf,
    pub epochs: u32,
    pub imgsz: u32,
    pub batch: u32,
    pub name: String,
    pub device: i32,
    pub workers: u32,
    pub project: PathBuf, // runs/detect
}

impl Default for TrainingPlan {
    fn default() -> Self {
        Self {
            program: "yolo".to_string(),
            model: "yolov8n.pt".to_string(),
            data: PathBuf::from("NEU-defects.yaml"),
            epochs: 50,
            imgsz: 640,
            batch: 16,
            name: "NEU_defect_model_v1".to_string(),
            device: 0,
            workers: 8,
            project: PathBuf::from("runs/detect"),
        }
    }
}

impl TrainingPlan {
    pub fn train_args(&self) -> Vec<String> {
        vec![
            "detect".to_string(),
            "train".to_string(),
            format!("data={}", self.data.display()),
            format!("model={}", self.model),
            format!("epochs={}", self.epochs),
            format!("imgsz={}", self.imgsz),
            format!("batch={}", self.batch),
            format!("name={}", self.name),
            format!("device={}", self.device),
            format!("workers={}", self.workers),
        ]
    }

    pub fn export_args(&self, weights: &Path) -> Vec<String> {
        vec![
            "export".to_string(),
            format!("model={}", weights.display()),
            "format=onnx".to_string(),
            format!("imgsz={}", self.imgsz),
        ]
    }

    /// 训练完成后的最优权重
    pub fn best_weights(&self) -> PathBuf {
        self.project.join(&self.name).join("weights").join("best.pt")
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        // 多份 OpenMP 运行时共存时避免 libiomp 直接退出
        cmd.args(args).env("KMP_DUPLICATE_LIB_OK", "TRUE");
        cmd
    }

    pub fn describe(&self, args: &[String]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }
}

/// GPU 检查通过后启动训练
pub fn train(plan: &TrainingPlan) -> Result<()> {
    let report = gpu::probe(plan.device);
    if !report.available {
        bail!("GPU not detected by ONNX Runtime / nvidia-smi, refusing to train on CPU");
    }
    info!(
        "🚀 Starting training on {}",
        report.device_name.as_deref().unwrap_or("GPU")
    );

    let args = plan.train_args();
    run(plan, &args)?;
    info!(
        "✅ Training complete! Results are saved in the '{}' directory.",
        plan.project.display()
    );
    Ok(())
}

/// 导出 ONNX, 返回导出文件路径
pub fn export_onnx(plan: &TrainingPlan, weights: &Path) -> Result<PathBuf> {
    if !weights.exists() {
        bail!("weights not found: {}", weights.display());
    }
    let args = plan.export_args(weights);
    run(plan, &args)?;
    let onnx = weights.with_extension("onnx");
    info!("✅ 导出完成: {}", onnx.display());
    Ok(onnx)
}

fn run(plan: &TrainingPlan, args: &[String]) -> Result<()> {
    info!("▶️ {}", plan.describe(args));
    let status = plan
        .command(args)
        .status()
        .with_context(|| format!("failed to launch `{}` (is ultralytics installed?)", plan.program))?;
    if !status.success() {
        bail!("`{}` exited with {}", plan.describe(args), status);
    }
    Ok(())
}
