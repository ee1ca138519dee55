// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX Runtime 推理后端
//! 负责: 选择执行器 (CPU/CUDA/TensorRT) → 加载模型 → 读取输入尺寸与元数据 → 推理

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::{Context, Result};
use ndarray::{Array, IxDyn};
use ort::execution_providers::{
    CUDAExecutionProvider, ExecutionProvider, ExecutionProviderDispatch,
    TensorRTExecutionProvider,
};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use regex::Regex;
use tracing::{info, warn};

/// 执行器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrtEP {
    CPU,
    CUDA(i32),
    Trt(i32),
}

#[derive(Debug, Clone)]
pub struct OrtConfig {
    pub f: PathBuf,
    pub ep: OrtEP,
    pub trt_fp16: bool,
    pub image_size: (Option<u32>, Option<u32>), // (height, width), 仅动态输入时使用
}

pub struct OrtBackend {
    session: Session,
    ep: OrtEP,
    input_name: String,
    output_names: Vec<String>,
    batch: u32,
    height: u32,
    width: u32,
    is_height_dynamic: bool,
    is_width_dynamic: bool,
    names: Option<Vec<String>>,
    author: Option<String>,
    version: Option<String>,
}

const DEFAULT_IMAGE_SIZE: u32 = 640;

// `0: 'crazing'` 或 `0: "crazing"`
static NAME_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\d+)\s*:\s*(?:'([^']*)'|"([^"]*)")"#).expect("valid regex")
});

impl OrtBackend {
    pub fn build(config: OrtConfig) -> Result<Self> {
        let (ep, providers) = Self::resolve_ep(config.ep, config.trt_fp16)?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_execution_providers(providers)?
            .commit_from_file(&config.f)
            .with_context(|| format!("failed to load ONNX model {}", config.f.display()))?;

        let input = session
            .inputs
            .first()
            .context("model has no inputs")?;
        let input_name = input.name.clone();
        let dims = input
            .input_type
            .tensor_dimensions()
            .cloned()
            .context("model input is not a tensor")?;
        if dims.len() != 4 {
            anyhow::bail!("expected NCHW input, got shape {:?}", dims);
        }

        // 动态维度为 -1
        let (height_cfg, width_cfg) = config.image_size;
        let is_height_dynamic = dims[2] <= 0;
        let is_width_dynamic = dims[3] <= 0;
        let batch = if dims[0] <= 0 { 1 } else { dims[0] as u32 };
        let height = if is_height_dynamic {
            height_cfg.unwrap_or(DEFAULT_IMAGE_SIZE)
        } else {
            dims[2] as u32
        };
        let width = if is_width_dynamic {
            width_cfg.unwrap_or(DEFAULT_IMAGE_SIZE)
        } else {
            dims[3] as u32
        };

        let output_names = session.outputs.iter().map(|o| o.name.clone()).collect();

        // Ultralytics 导出时写入的自定义元数据
        let metadata = session.metadata()?;
        let names = metadata.custom("names")?.map(|s| parse_names(&s));
        let author = metadata.custom("author")?;
        let version = metadata.custom("version")?;
        drop(metadata);

        Ok(Self {
            session,
            ep,
            input_name,
            output_names,
            batch,
            height,
            width,
            is_height_dynamic,
            is_width_dynamic,
            names,
            author,
            version,
        })
    }

    /// 不可用的 GPU 执行器依次回退: TensorRT → CUDA → CPU
    fn resolve_ep(ep: OrtEP, fp16: bool) -> Result<(OrtEP, Vec<ExecutionProviderDispatch>)> {
        if let OrtEP::Trt(id) = ep {
            let trt = TensorRTExecutionProvider::default()
                .with_device_id(id)
                .with_fp16(fp16);
            if trt.is_available()? {
                info!("🚀 执行器: TensorRT (device {})", id);
                return Ok((ep, vec![trt.build()]));
            }
            warn!("⚠️ TensorRT 不可用, 尝试 CUDA");
        }

        if let OrtEP::Trt(id) | OrtEP::CUDA(id) = ep {
            let cuda = CUDAExecutionProvider::default().with_device_id(id);
            if cuda.is_available()? {
                info!("🚀 执行器: CUDA (device {})", id);
                return Ok((OrtEP::CUDA(id), vec![cuda.build()]));
            }
            warn!("⚠️ CUDA 不可用, 回退到 CPU (速度会慢很多)");
        }

        Ok((OrtEP::CPU, Vec::new()))
    }

    pub fn run(&self, xs: Array<f32, IxDyn>, profile: bool) -> Result<Vec<Array<f32, IxDyn>>> {
        let t = Instant::now();
        let input = Tensor::from_array(xs)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input]?)?;
        if profile {
            info!("[ORT Inference]: {:?}", t.elapsed());
        }

        let mut ys = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let y = outputs[name.as_str()].try_extract_tensor::<f32>()?;
            ys.push(y.into_owned());
        }
        Ok(ys)
    }

    pub fn ep(&self) -> OrtEP {
        self.ep
    }

    pub fn batch(&self) -> u32 {
        self.batch
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_height_dynamic(&self) -> bool {
        self.is_height_dynamic
    }

    pub fn is_width_dynamic(&self) -> bool {
        self.is_width_dynamic
    }

    pub fn names(&self) -> Option<&Vec<String>> {
        self.names.as_ref()
    }

    pub fn nc(&self) -> Option<u32> {
        self.names.as_ref().map(|n| n.len() as u32)
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// 解析 Ultralytics 元数据中的类别字典, 如 `{0: 'crazing', 1: 'inclusion'}`
pub fn parse_names(raw: &str) -> Vec<String> {
    let mut pairs: Vec<(usize, String)> = NAME_ENTRY
        .captures_iter(raw)
        .filter_map(|cap| {
            let id = cap.get(1)?.as_str().parse().ok()?;
            let name = cap.get(2).or_else(|| cap.get(3))?.as_str().to_string();
            Some((id, name))
        })
        .collect();
    pairs.sort_by_key(|(id, _)| *id);
    pairs.into_iter().map(|(_, name)| name).collect()
}
