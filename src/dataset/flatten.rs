// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 展平图片目录: <base>/<split>/images/<class>/* → <base>/<split>/images/*
// annotations 目录不处理

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{QcError, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlattenReport {
    pub moved: usize,
    pub removed_dirs: usize,
    pub collisions: Vec<PathBuf>, // 目标已存在而未移动的条目
}

pub fn flatten_splits(base: &Path, splits: &[String]) -> Result<FlattenReport> {
    info!("🚀 开始展平图片目录: {}", base.display());
    let mut report = FlattenReport::default();

    for split in splits {
        let images_root = base.join(split).join("images");
        if !images_root.exists() {
            warn!("⚠️ 目录不存在, 跳过: {}", images_root.display());
            continue;
        }
        info!("🔍 处理: {}", images_root.display());
        flatten_dir(&images_root, &mut report)?;
    }

    info!(
        "✅ 展平完成: 移动 {} 个文件, 删除 {} 个子目录",
        report.moved, report.removed_dirs
    );
    Ok(report)
}

/// 将 `root` 下每个子目录的内容上移一层, 然后删除空子目录
pub fn flatten_dir(root: &Path, report: &mut FlattenReport) -> Result<()> {
    let subfolders = list(root)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect::<Vec<_>>();

    if subfolders.is_empty() {
        info!(" -> 没有子目录, 可能已经是展平结构");
        return Ok(());
    }

    for folder in subfolders {
        let mut blocked = false;
        for source in list(&folder)? {
            let Some(name) = source.file_name() else {
                continue;
            };
            let destination = root.join(name);
            if destination.exists() {
                warn!("⚠️ 目标已存在, 保留原文件: {}", source.display());
                report.collisions.push(source);
                blocked = true;
                continue;
            }
            fs::rename(&source, &destination).map_err(|e| QcError::io(&source, e))?;
            report.moved += 1;
        }

        let class_name = folder.file_name().unwrap_or_default().to_string_lossy();
        if blocked {
            warn!(" -> '{}' 存在同名文件, 子目录未删除", class_name);
        } else {
            fs::remove_dir(&folder).map_err(|e| QcError::io(&folder, e))?;
            report.removed_dirs += 1;
            info!(" -> 已移动 '{}' 中的图片并删除空目录", class_name);
        }
    }
    Ok(())
}

fn list(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)
        .map_err(|e| QcError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| QcError::io(dir, e)))
        .collect::<Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splits() -> Vec<String> {
        vec!["train".to_string(), "validation".to_string()]
    }

    fn touch(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_flatten_moves_and_removes() {
        let base = tempfile::tempdir().unwrap();
        let images = base.path().join("train").join("images");
        touch(&images.join("crazing").join("crazing_1.jpg"), "a");
        touch(&images.join("crazing").join("crazing_2.jpg"), "b");
        touch(&images.join("patches").join("patches_1.jpg"), "c");
        touch(&base.path().join("train/annotations/crazing_1.xml"), "x");

        let report = flatten_splits(base.path(), &splits()).unwrap();
        assert_eq!(report.moved, 3);
        assert_eq!(report.removed_dirs, 2);
        assert!(report.collisions.is_empty());

        assert_eq!(fs::read_to_string(images.join("patches_1.jpg")).unwrap(), "c");
        assert!(images.join("crazing_2.jpg").exists());
        assert!(!images.join("crazing").exists());
        assert!(base.path().join("train/annotations/crazing_1.xml").exists());
    }

    #[test]
    fn test_already_flat_is_noop() {
        let base = tempfile::tempdir().unwrap();
        let images = base.path().join("validation").join("images");
        touch(&images.join("a.jpg"), "a");

        let report = flatten_splits(base.path(), &splits()).unwrap();
        assert_eq!(report, FlattenReport::default());
        assert!(images.join("a.jpg").exists());
    }

    #[test]
    fn test_collision_keeps_source() {
        let base = tempfile::tempdir().unwrap();
        let images = base.path().join("train").join("images");
        touch(&images.join("dup.jpg"), "top");
        touch(&images.join("inclusion").join("dup.jpg"), "nested");
        touch(&images.join("inclusion").join("ok.jpg"), "ok");

        let report = flatten_splits(base.path(), &splits()).unwrap();
        assert_eq!(report.moved, 1);
        assert_eq!(report.removed_dirs, 0);
        assert_eq!(report.collisions, vec![images.join("inclusion").join("dup.jpg")]);
        assert_eq!(fs::read_to_string(images.join("dup.jpg")).unwrap(), "top");
        assert!(images.join("ok.jpg").exists());
        assert!(images.join("inclusion").join("dup.jpg").exists());
    }
}
