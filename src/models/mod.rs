// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 检测模型接口与实现
///
/// ## 核心流程
/// ```text
/// 原始图片 → preprocess → NCHW 张量
///          ↓
///     OrtBackend::run
///          ↓
///     原始输出 → postprocess (阈值 + NMS) → Bbox
///          ↓
///     类别名映射 → Detection
/// ```
///
/// 质检逻辑只依赖 [`DefectDetector`], 不关心背后是哪种模型
use anyhow::Result;
use image::DynamicImage;

use crate::Bbox;

pub mod yolov8;

pub use yolov8::{DetectPostprocessor, YOLOv8};

/// 单个检测结果: 类别名 + 置信度 (+ 像素框)
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: Bbox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: Bbox::default(),
        }
    }

    pub fn with_bbox(mut self, bbox: Bbox) -> Self {
        self.bbox = bbox;
        self
    }
}

/// 缺陷检测器
pub trait DefectDetector: Send {
    /// 对单张图片做检测
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>>;

    /// 类别名, 下标即类别 ID
    fn class_names(&self) -> &[String];
}
