// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// VOC (.xml) → YOLO (.txt) 批量转换
// 输出到 <target_base>/<split>/labels, split 取自标注目录的上级目录名

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::voc::VocAnnotation;
use super::yolo::{write_label_file, YoloLabel};
use crate::error::{QcError, Result};

/// 转换统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub folders: usize,
    pub files: usize,
    pub objects: usize,
    pub skipped_objects: usize, // 类别不在列表中的目标
}

/// 默认标注目录: `<root>/<split>/annotations`
pub fn annotation_dirs_for(root: &Path, splits: &[String]) -> Vec<PathBuf> {
    splits
        .iter()
        .map(|split| root.join(split).join("annotations"))
        .collect()
}

pub fn convert_folders(
    annotation_dirs: &[PathBuf],
    target_base: &Path,
    class_names: &[String],
) -> Result<ConversionReport> {
    info!("🚀 开始 XML → YOLO 转换");
    let mut report = ConversionReport::default();

    for source in annotation_dirs {
        if !source.is_dir() {
            warn!("⚠️ 标注目录不存在, 跳过: {}", source.display());
            continue;
        }

        let split = split_name(source);
        let target = target_base.join(&split).join("labels");
        fs::create_dir_all(&target).map_err(|e| QcError::io(&target, e))?;

        info!("🔍 处理目录: {}", source.display());
        info!("💾 标签保存到: {}", target.display());

        for xml in xml_files(source)? {
            let ann = VocAnnotation::from_file(&xml)?;
            let mut labels = Vec::with_capacity(ann.objects.len());
            for obj in &ann.objects {
                match class_names.iter().position(|n| *n == obj.name) {
                    Some(id) => labels.push(YoloLabel::from_voc(obj, ann.width, ann.height, id)),
                    None => {
                        debug!("未知类别 {:?} ({}), 跳过", obj.name, xml.display());
                        report.skipped_objects += 1;
                    }
                }
            }

            let stem = xml.file_stem().unwrap_or_default().to_string_lossy();
            let out = target.join(format!("{stem}.txt"));
            write_label_file(&out, &labels)?;

            report.files += 1;
            report.objects += labels.len();
        }
        report.folders += 1;
    }

    info!(
        "✅ 转换完成: {} 个目录, {} 个文件, {} 个目标 (跳过 {})",
        report.folders, report.files, report.objects, report.skipped_objects
    );
    Ok(report)
}

fn split_name(annotation_dir: &Path) -> String {
    annotation_dir
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| QcError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| QcError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "xml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
