// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// YOLO 标签格式: 每行 `class_id x_center y_center width height`, 坐标按图像尺寸归一化

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::voc::VocObject;
use crate::error::{QcError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloLabel {
    pub class_id: usize,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloLabel {
    /// 角点坐标 → 归一化中心点/宽高 (双精度, 保证第 6 位小数稳定)
    pub fn from_voc(obj: &VocObject, img_w: u32, img_h: u32, class_id: usize) -> Self {
        let (w, h) = (img_w as f64, img_h as f64);
        Self {
            class_id,
            x_center: (obj.xmin + obj.xmax) / 2. / w,
            y_center: (obj.ymin + obj.ymax) / 2. / h,
            width: (obj.xmax - obj.xmin) / w,
            height: (obj.ymax - obj.ymin) / h,
        }
    }

    /// 还原为像素框 `(x_min, y_min, width, height)`, 坐标向零截断
    pub fn to_pixel_rect(&self, img_w: u32, img_h: u32) -> (i32, i32, i32, i32) {
        let bw = self.width * img_w as f64;
        let bh = self.height * img_h as f64;
        let x_min = self.x_center * img_w as f64 - bw / 2.;
        let y_min = self.y_center * img_h as f64 - bh / 2.;
        let (x0, y0) = (x_min as i32, y_min as i32);
        (x0, y0, (x0 as f64 + bw) as i32 - x0, (y0 as f64 + bh) as i32 - y0)
    }
}

impl fmt::Display for YoloLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

impl FromStr for YoloLabel {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(());
        }
        let class_id = parts[0].parse::<usize>().map_err(|_| ())?;
        let mut xs = [0f64; 4];
        for (x, part) in xs.iter_mut().zip(&parts[1..]) {
            *x = part.parse::<f64>().map_err(|_| ())?;
        }
        Ok(Self {
            class_id,
            x_center: xs[0],
            y_center: xs[1],
            width: xs[2],
            height: xs[3],
        })
    }
}

/// 读取标签文件, 空行忽略
pub fn parse_label_file(path: impl AsRef<Path>) -> Result<Vec<YoloLabel>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| QcError::io(path, e))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.parse::<YoloLabel>()
                .map_err(|_| QcError::InvalidLabelLine {
                    path: path.to_path_buf(),
                    line: i + 1,
                    content: line.to_string(),
                })
        })
        .collect()
}

/// 每个目标一行, 行间 `\n`, 末尾不换行; 没有目标时写空文件
pub fn write_label_file(path: impl AsRef<Path>, labels: &[YoloLabel]) -> Result<()> {
    let path = path.as_ref();
    let body = labels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(path, body).map_err(|e| QcError::io(path, e))
}
