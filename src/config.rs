// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 项目配置 - 通过JSON文件调整路径与类别

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 默认配置文件名
pub const DEFAULT_CONFIG_PATH: &str = "steel_qc.json";

/// NEU-DET 的 6 个缺陷类别, 下标即类别 ID
pub const NEU_CLASS_NAMES: [&str; 6] = [
    "crazing",
    "inclusion",
    "patches",
    "pitted_surface",
    "rolled-in_scale",
    "scratches",
];

/// 各脚本共享的目录约定
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub dataset_root: PathBuf, // 数据集根目录, 其下为 <split>/{images,labels,annotations}
    pub splits: Vec<String>,
    pub class_names: Vec<String>,
    pub model_path: PathBuf, // 仿真使用的 ONNX 权重
    pub test_images_dir: PathBuf,
    pub data_yaml: PathBuf, // 训练用数据集描述文件
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("datasets/NEU-DET"),
            splits: vec!["train".to_string(), "validation".to_string()],
            class_names: NEU_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            model_path: PathBuf::from("runs/detect/NEU_defect_model_v1/weights/best.onnx"),
            test_images_dir: PathBuf::from("test_images"),
            data_yaml: PathBuf::from("NEU-defects.yaml"),
        }
    }
}

impl ProjectConfig {
    /// 从JSON文件加载配置
    ///
    /// 文件不存在时写出默认配置; 读取或解析失败时回退到默认值, 不覆盖原文件
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    info!("✅ 配置已从 {} 加载", path.display());
                    config
                }
                Err(e) => {
                    warn!("⚠️ 配置文件解析失败: {}, 使用默认值", e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("📝 配置文件不存在,创建默认配置...");
                let config = Self::default();
                config.save(path);
                config
            }
            Err(e) => {
                warn!("⚠️ 读取配置失败 {}: {}, 使用默认值", path.display(), e);
                Self::default()
            }
        }
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    warn!("❌ 保存配置失败: {}", e);
                } else {
                    info!("💾 配置已保存到 {}", path.display());
                }
            }
            Err(e) => warn!("❌ 序列化配置失败: {}", e),
        }
    }

    /// `<root>/<split>/<leaf>`
    pub fn split_dir(&self, split: &str, leaf: &str) -> PathBuf {
        self.dataset_root.join(split).join(leaf)
    }
}

/// 检测模型参数 (各可执行文件通过 `#[command(flatten)]` 复用)
#[derive(clap::Args, Debug, Clone)]
pub struct DetectorArgs {
    /// ONNX 模型路径 (默认取配置文件中的 model_path)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// 使用 CUDA
    #[arg(long)]
    pub cuda: bool,

    /// 使用 TensorRT
    #[arg(long)]
    pub trt: bool,

    /// TensorRT 使用 FP16
    #[arg(long)]
    pub fp16: bool,

    /// GPU 设备号
    #[arg(long, default_value_t = 0)]
    pub device_id: i32,

    /// 输入宽度 (动态输入时生效)
    #[arg(long)]
    pub width: Option<u32>,

    /// 输入高度 (动态输入时生效)
    #[arg(long)]
    pub height: Option<u32>,

    /// 类别数 (模型元数据缺失时使用)
    #[arg(long)]
    pub nc: Option<u32>,

    /// 置信度阈值
    #[arg(long, default_value_t = 0.25)]
    pub conf: f32,

    /// NMS IoU 阈值
    #[arg(long, default_value_t = 0.7)]
    pub iou: f32,

    /// 打印各阶段耗时
    #[arg(long)]
    pub profile: bool,
}

impl Default for DetectorArgs {
    fn default() -> Self {
        Self {
            model: None,
            cuda: false,
            trt: false,
            fp16: false,
            device_id: 0,
            width: None,
            height: None,
            nc: None,
            conf: 0.25,
            iou: 0.7,
            profile: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classes_in_id_order() {
        let config = ProjectConfig::default();
        assert_eq!(config.class_names.len(), 6);
        assert_eq!(config.class_names[2], "patches");
        assert_eq!(config.class_names[4], "rolled-in_scale");
    }

    #[test]
    fn test_load_creates_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let config = ProjectConfig::load(&path);
        assert_eq!(config, ProjectConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{ "dataset_root": "/data/neu" }"#).unwrap();
        let config = ProjectConfig::load(&path);
        assert_eq!(config.dataset_root, PathBuf::from("/data/neu"));
        assert_eq!(config.splits, vec!["train", "validation"]);
        assert_eq!(
            config.split_dir("train", "labels"),
            PathBuf::from("/data/neu/train/labels")
        );
    }

    #[test]
    fn test_load_malformed_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(ProjectConfig::load(&path), ProjectConfig::default());
    }

    #[test]
    fn test_load_unreadable_keeps_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let bytes = b"{ \"dataset_root\": \"/d\xff\" }".to_vec();
        fs::write(&path, &bytes).unwrap();

        assert_eq!(ProjectConfig::load(&path), ProjectConfig::default());
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}
