// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// Ultralytics 数据集描述文件 (NEU-defects.yaml)

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::error::{QcError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct DataYaml {
    pub path: PathBuf,
    pub train: String,
    pub val: String,
    pub names: Vec<String>,
}

impl DataYaml {
    /// 第一个 split 作为训练集, 第二个 (若有) 作为验证集
    pub fn from_config(config: &ProjectConfig) -> Self {
        let train = config.splits.first().map(String::as_str).unwrap_or("train");
        let val = config.splits.get(1).map(String::as_str).unwrap_or(train);
        Self {
            path: config.dataset_root.clone(),
            train: format!("{train}/images"),
            val: format!("{val}/images"),
            names: config.class_names.clone(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("path: {}\n", quote(&self.path.to_string_lossy())));
        out.push_str(&format!("train: {}\n", quote(&self.train)));
        out.push_str(&format!("val: {}\n", quote(&self.val)));
        out.push_str("names:\n");
        for (id, name) in self.names.iter().enumerate() {
            out.push_str(&format!("  {}: {}\n", id, quote(name)));
        }
        out
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render()).map_err(|e| QcError::io(path, e))
    }
}

// YAML 单引号字符串, 内部单引号写两次
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
