// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 数据集准备 (Dataset Preparation)
///
/// 各工具之间只通过目录约定交换数据:
/// ```text
/// <root>/<split>/annotations/*.xml   Pascal VOC
/// <root>/<split>/images/*.jpg        图片 (flatten 之后)
/// <root>/<split>/labels/*.txt        YOLO 标签 (convert 输出)
/// ```
pub mod convert;
pub mod data_yaml;
pub mod flatten;
pub mod voc;
pub mod yolo;

pub use convert::{annotation_dirs_for, convert_folders, ConversionReport};
pub use data_yaml::DataYaml;
pub use flatten::{flatten_splits, FlattenReport};
pub use voc::{VocAnnotation, VocObject};
pub use yolo::{parse_label_file, write_label_file, YoloLabel};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{QcError, Result};

/// 目录下的 .jpg / .png 图片 (按文件名排序)
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| QcError::io(dir, e))?;
    let mut images = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| QcError::io(dir, e))?.path();
        let is_image = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| ext == "jpg" || ext == "png");
        if path.is_file() && is_image {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_images_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "c.bmp", "d.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("sub.jpg")).unwrap();
        let images = list_images(dir.path()).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png"]);
    }
}
