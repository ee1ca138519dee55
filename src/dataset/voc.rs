// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// Pascal VOC 标注读取
// 仅解析转换所需字段: size/{width,height} 与 object/{name,bndbox}

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::{QcError, Result};

/// 单个目标 (绝对像素角点坐标)
#[derive(Debug, Clone, PartialEq)]
pub struct VocObject {
    pub name: String,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// 一张图片的 VOC 标注
#[derive(Debug, Clone, PartialEq)]
pub struct VocAnnotation {
    pub filename: Option<String>,
    pub width: u32,
    pub height: u32,
    pub objects: Vec<VocObject>,
}

impl VocAnnotation {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|e| QcError::io(path, e))?;
        Self::parse(&xml, path)
    }

    /// `path` 只用于错误信息
    pub fn parse(xml: &str, path: &Path) -> Result<Self> {
        let doc = Document::parse(xml).map_err(|source| QcError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        let root = doc.root_element();

        let size = child(root, "size").ok_or_else(|| missing(path, "size"))?;
        let width = number(size, "width", path)?;
        let height = number(size, "height", path)?;
        if width <= 0.0 || height <= 0.0 {
            return Err(QcError::InvalidSize {
                path: path.to_path_buf(),
                width: width as u32,
                height: height as u32,
            });
        }

        let mut objects = Vec::new();
        for obj in root.children().filter(|n| n.has_tag_name("object")) {
            let name = child(obj, "name")
                .and_then(|n| n.text())
                .map(|s| s.trim().to_string())
                .ok_or_else(|| missing(path, "name"))?;
            let bndbox = child(obj, "bndbox").ok_or_else(|| missing(path, "bndbox"))?;
            objects.push(VocObject {
                name,
                xmin: number(bndbox, "xmin", path)?,
                ymin: number(bndbox, "ymin", path)?,
                xmax: number(bndbox, "xmax", path)?,
                ymax: number(bndbox, "ymax", path)?,
            });
        }

        Ok(Self {
            filename: child(root, "filename")
                .and_then(|n| n.text())
                .map(|s| s.trim().to_string()),
            width: width as u32,
            height: height as u32,
            objects,
        })
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn missing(path: &Path, field: &'static str) -> QcError {
    QcError::MissingField {
        path: path.to_path_buf(),
        field,
    }
}

// 整数或小数均可 ("153" / "153.0")
fn number(parent: Node, field: &'static str, path: &Path) -> Result<f64> {
    let text = child(parent, field)
        .and_then(|n| n.text())
        .ok_or_else(|| missing(path, field))?
        .trim();
    text.parse::<f64>().map_err(|_| QcError::InvalidNumber {
        path: path.to_path_buf(),
        field,
        value: text.to_string(),
    })
}
