// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// YOLOv8 检测模型
// 包含: 模型加载、预处理、推理、后处理

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use image::{DynamicImage, GenericImageView};
use ndarray::{s, Array, Axis, IxDyn};
use tracing::info;

use super::{DefectDetector, Detection};
use crate::config::DetectorArgs;
use crate::{non_max_suppression, Bbox, OrtBackend, OrtConfig, OrtEP};

/// YOLOv8 检测模型结构
pub struct YOLOv8 {
    engine: OrtBackend,
    post: DetectPostprocessor,
    names: Vec<String>,
    profile: bool,
}

impl YOLOv8 {
    /// 从 ONNX 文件创建 YOLOv8 模型
    pub fn new(model: &Path, config: &DetectorArgs) -> Result<Self> {
        if !model.exists() {
            bail!(
                "Model file not found at '{}'. Please check the path.",
                model.display()
            );
        }

        // execution provider
        let ep = if config.trt {
            OrtEP::Trt(config.device_id)
        } else if config.cuda {
            OrtEP::CUDA(config.device_id)
        } else {
            OrtEP::CPU
        };

        info!("📦 加载模型: {}", model.display());
        let engine = OrtBackend::build(OrtConfig {
            f: model.to_path_buf(),
            ep,
            trt_fp16: config.fp16,
            image_size: (config.height, config.width),
        })?;

        let nc = engine
            .nc()
            .or(config.nc)
            .context("Failed to get num_classes, make it explicit with `--nc`")?;

        // class names
        let names = engine
            .names()
            .cloned()
            .unwrap_or_else(|| (0..nc).map(|i| format!("class {i}")).collect());

        let post = DetectPostprocessor {
            nc: nc as usize,
            conf: config.conf,
            iou: config.iou,
            width: engine.width(),
            height: engine.height(),
        };

        info!("✅ 模型加载成功, 类别: {:?}", names);
        Ok(Self {
            engine,
            post,
            names,
            profile: config.profile,
        })
    }

    /// 保持宽高比缩放后贴到左上角, 其余填灰 (144)
    pub fn preprocess(&self, xs: &[DynamicImage]) -> Result<Array<f32, IxDyn>> {
        let (height, width) = (self.post.height, self.post.width);
        let mut ys = Array::ones((xs.len(), 3, height as usize, width as usize)).into_dyn();
        ys.fill(144.0 / 255.0);
        for (idx, x) in xs.iter().enumerate() {
            let (w0, h0) = x.dimensions();
            let (_, w_new, h_new) = scale_wh(w0 as f32, h0 as f32, width as f32, height as f32);
            let img = x.resize_exact(
                w_new as u32,
                h_new as u32,
                image::imageops::FilterType::Triangle,
            );

            for (x, y, rgb) in img.pixels() {
                let x = x as usize;
                let y = y as usize;
                let [r, g, b, _] = rgb.0;
                ys[[idx, 0, y, x]] = (r as f32) / 255.0;
                ys[[idx, 1, y, x]] = (g as f32) / 255.0;
                ys[[idx, 2, y, x]] = (b as f32) / 255.0;
            }
        }

        Ok(ys)
    }

    pub fn run(&mut self, xs: &[DynamicImage]) -> Result<Vec<Vec<Bbox>>> {
        let t_pre = Instant::now();
        let xs_ = self.preprocess(xs)?;
        if self.profile {
            info!("[Model Preprocess]: {:?}", t_pre.elapsed());
        }

        let t_run = Instant::now();
        let ys = self.engine.run(xs_, self.profile)?;
        if self.profile {
            info!("[Model Inference]: {:?}", t_run.elapsed());
        }

        let t_post = Instant::now();
        let sizes: Vec<(u32, u32)> = xs.iter().map(|x| x.dimensions()).collect();
        let preds = ys.first().context("model produced no outputs")?;
        let ys = self.post.postprocess(preds, &sizes)?;
        if self.profile {
            info!("[Model Postprocess]: {:?}", t_post.elapsed());
        }

        Ok(ys)
    }

    pub fn summary(&self) {
        println!(
            "\nSummary:\n\
            > Task: Detect{}\n\
            > EP: {:?} {}\n\
            > Batch: {}, Height: {} ({}), Width: {} ({})\n\
            > nc: {}, conf: {}, iou: {}\n\
            > names: {:?}\n\
            ",
            match self.engine.author().zip(self.engine.version()) {
                Some((author, ver)) => format!(" ({} {})", author, ver),
                None => String::from(""),
            },
            self.engine.ep(),
            if let OrtEP::CPU = self.engine.ep() {
                ""
            } else {
                "(May still fall back to CPU)"
            },
            self.engine.batch(),
            self.post.height,
            if self.engine.is_height_dynamic() {
                "Dynamic"
            } else {
                "Const"
            },
            self.post.width,
            if self.engine.is_width_dynamic() {
                "Dynamic"
            } else {
                "Const"
            },
            self.post.nc,
            self.post.conf,
            self.post.iou,
            self.names,
        );
    }
}

impl DefectDetector for YOLOv8 {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let ys = self.run(std::slice::from_ref(image))?;
        let bboxes = ys.into_iter().next().unwrap_or_default();
        Ok(bboxes
            .into_iter()
            .map(|bbox| {
                let label = self
                    .names
                    .get(bbox.id())
                    .cloned()
                    .unwrap_or_else(|| format!("class {}", bbox.id()));
                Detection::new(label, bbox.confidence()).with_bbox(bbox)
            })
            .collect())
    }

    fn class_names(&self) -> &[String] {
        &self.names
    }
}

fn scale_wh(w0: f32, h0: f32, w1: f32, h1: f32) -> (f32, f32, f32) {
    let r = (w1 / w0).min(h1 / h0);
    (r, (w0 * r).round(), (h0 * r).round())
}

/// 检测头后处理: 输出形状 `[batch, 4 + nc, anchors]`, 每列为 `cx, cy, w, h, cls...`
#[derive(Debug, Clone)]
pub struct DetectPostprocessor {
    pub nc: usize,
    pub conf: f32,
    pub iou: f32,
    pub width: u32,
    pub height: u32,
}

impl DetectPostprocessor {
    /// `xs0` 为原图 (宽, 高), 用于坐标还原
    pub fn postprocess(&self, preds: &Array<f32, IxDyn>, xs0: &[(u32, u32)]) -> Result<Vec<Vec<Bbox>>> {
        const CXYWH_OFFSET: usize = 4;

        let shape = preds.shape();
        if shape.len() != 3 || shape[1] < CXYWH_OFFSET + self.nc {
            bail!(
                "unexpected detect output shape {:?} for nc = {}",
                shape,
                self.nc
            );
        }
        if shape[0] != xs0.len() {
            bail!("batch mismatch: {} outputs for {} images", shape[0], xs0.len());
        }

        let mut ys = Vec::with_capacity(xs0.len());
        for (idx, anchor) in preds.axis_iter(Axis(0)).enumerate() {
            let width_original = xs0[idx].0 as f32;
            let height_original = xs0[idx].1 as f32;
            let ratio = (self.width as f32 / width_original)
                .min(self.height as f32 / height_original);

            let mut data: Vec<Bbox> = Vec::new();
            for pred in anchor.axis_iter(Axis(1)) {
                let bbox = pred.slice(s![0..CXYWH_OFFSET]);
                let clss = pred.slice(s![CXYWH_OFFSET..CXYWH_OFFSET + self.nc]);

                let Some((id, &confidence)) = clss
                    .into_iter()
                    .enumerate()
                    .reduce(|max, x| if x.1 > max.1 { x } else { max })
                else {
                    continue;
                };

                if confidence < self.conf {
                    continue;
                }

                let cx = bbox[0] / ratio;
                let cy = bbox[1] / ratio;
                let w = bbox[2] / ratio;
                let h = bbox[3] / ratio;
                let x = cx - w / 2.;
                let y = cy - h / 2.;
                data.push(Bbox::new(
                    x.max(0.0f32).min(width_original),
                    y.max(0.0f32).min(height_original),
                    w,
                    h,
                    id,
                    confidence,
                ));
            }

            non_max_suppression(&mut data, self.iou);
            ys.push(data);
        }

        Ok(ys)
    }
}
