// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 质检代理: 检测 → 汇总 → 处置
//! 每次巡检相互独立, 不保留跨巡检的状态

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::disposition::{decide, Disposition};
use crate::models::{DefectDetector, Detection};

/// 一次巡检的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub image: PathBuf,
    pub disposition: Disposition,
    pub detections: Vec<Detection>,
    pub summary: Vec<String>,
}

impl Inspection {
    pub fn from_detections(image: PathBuf, detections: Vec<Detection>) -> Self {
        let disposition = decide(&detections);
        let summary = summarize(&detections);
        Self {
            image,
            disposition,
            detections,
            summary,
        }
    }

    /// HUD 上只显示第一行
    pub fn headline(&self) -> &str {
        self.summary.first().map(String::as_str).unwrap_or_default()
    }
}

pub fn summarize(detections: &[Detection]) -> Vec<String> {
    if detections.is_empty() {
        return vec!["No defects detected.".to_string()];
    }
    detections
        .iter()
        .map(|d| format!("- Found '{}' with {:.2} confidence.", d.label, d.confidence))
        .collect()
}

pub struct QualityAgent<D: DefectDetector> {
    detector: D,
}

impl<D: DefectDetector> QualityAgent<D> {
    pub fn new(detector: D) -> Self {
        info!("🤖 质检代理就绪, 类别: {:?}", detector.class_names());
        Self { detector }
    }

    pub fn inspect_part(&mut self, image_path: &Path) -> Result<Inspection> {
        let image = image::open(image_path)
            .with_context(|| format!("failed to open {}", image_path.display()))?;
        let detections = self.detector.detect(&image)?;
        debug!("{} 个检测结果: {:?}", detections.len(), detections);
        Ok(Inspection::from_detections(
            image_path.to_path_buf(),
            detections,
        ))
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    /// 固定返回预设结果的检测器
    struct FakeDetector {
        names: Vec<String>,
        results: Vec<Detection>,
        calls: usize,
    }

    impl DefectDetector for FakeDetector {
        fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
            assert_eq!(image.width(), 8);
            self.calls += 1;
            Ok(self.results.clone())
        }

        fn class_names(&self) -> &[String] {
            &self.names
        }
    }

    fn agent(results: Vec<Detection>) -> QualityAgent<FakeDetector> {
        QualityAgent::new(FakeDetector {
            names: vec!["patches".to_string(), "scratches".to_string()],
            results,
            calls: 0,
        })
    }

    fn sample_image(dir: &Path) -> PathBuf {
        let path = dir.join("part.png");
        RgbImage::new(8, 4).save(&path).unwrap();
        path
    }

    #[test]
    fn test_clean_part_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());
        let inspection = agent(vec![]).inspect_part(&path).unwrap();
        assert_eq!(inspection.disposition, Disposition::Pass);
        assert_eq!(inspection.headline(), "No defects detected.");
        assert_eq!(inspection.image, path);
    }

    #[test]
    fn test_summary_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_image(dir.path());
        let mut agent = agent(vec![
            Detection::new("scratches", 0.834),
            Detection::new("patches", 0.4),
        ]);
        let inspection = agent.inspect_part(&path).unwrap();
        assert_eq!(inspection.disposition, Disposition::HaltAndAlert);
        assert_eq!(
            inspection.summary,
            vec![
                "- Found 'scratches' with 0.83 confidence.",
                "- Found 'patches' with 0.40 confidence.",
            ]
        );
        assert_eq!(inspection.headline(), "- Found 'scratches' with 0.83 confidence.");

        // 不保留状态: 再次巡检得到相同结果
        let again = agent.inspect_part(&path).unwrap();
        assert_eq!(again, inspection);
        assert_eq!(agent.detector().calls, 2);
    }

    #[test]
    fn test_missing_image_is_error() {
        let err = agent(vec![])
            .inspect_part(Path::new("nope/missing.jpg"))
            .unwrap_err();
        assert!(err.to_string().contains("missing.jpg"));
    }
}
