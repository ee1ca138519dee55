#![allow(clippy::type_complexity)]
// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 项目配置与模型参数
pub mod dataset; // 数据集准备: VOC 转换 / 目录展平 / 数据集描述
pub mod error;
pub mod gpu; // GPU 可用性检查
pub mod inspection; // 质检决策规则与巡检记录
pub mod logging;
pub mod models; // 检测模型接口与实现
pub mod ort_backend;
pub mod simulation; // 传送带仿真 (macroquad)
pub mod training; // 调用 Ultralytics 训练
pub mod visualize; // 标注框可视化
pub mod yolo_result;

pub use crate::config::{DetectorArgs, ProjectConfig};
pub use crate::error::QcError;
pub use crate::models::{DefectDetector, Detection, YOLOv8};
pub use crate::ort_backend::{OrtBackend, OrtConfig, OrtEP};
pub use crate::yolo_result::{non_max_suppression, Bbox};

pub fn gen_time_string(delimiter: &str) -> String {
    let t_now = chrono::Local::now();
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    t_now.format(&fmt).to_string()
}
