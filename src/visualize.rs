// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 标注框可视化: 随机抽一张图, 读取同名 YOLO 标签并叠加绘制

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use macroquad::prelude::{
    clear_background, draw_texture_ex, is_key_pressed, next_frame, screen_height, screen_width,
    vec2, Conf, DrawTextureParams, FilterMode, KeyCode, Texture2D, BLACK, WHITE,
};
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::dataset::{list_images, parse_label_file, YoloLabel};
use crate::error::QcError;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LABEL_SCALE: f32 = 20.0;

/// 抽中的样本
pub struct Sample {
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    pub labels: Option<Vec<YoloLabel>>, // None: 标签文件不存在
}

pub fn pick_random_image(dir: &Path) -> crate::error::Result<PathBuf> {
    let images = list_images(dir)?;
    images
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| QcError::NoImages(dir.to_path_buf()))
}

/// 图片 `a.jpg` 对应标签 `<label_dir>/a.txt`
pub fn label_path_for(image_path: &Path, label_dir: &Path) -> PathBuf {
    let stem = image_path.file_stem().unwrap_or_default().to_string_lossy();
    label_dir.join(format!("{stem}.txt"))
}

pub fn load_sample(image_path: PathBuf, label_dir: &Path) -> Result<Sample> {
    let label_path = label_path_for(&image_path, label_dir);
    let labels = if label_path.exists() {
        Some(parse_label_file(&label_path)?)
    } else {
        warn!(
            "⚠️ No label file found for {}",
            image_path.file_name().unwrap_or_default().to_string_lossy()
        );
        None
    };
    Ok(Sample {
        image_path,
        label_path,
        labels,
    })
}

pub fn load_font(path: &Path) -> Option<FontVec> {
    match std::fs::read(path).map(FontVec::try_from_vec) {
        Ok(Ok(font)) => Some(font),
        Ok(Err(e)) => {
            warn!("⚠️ 字体解析失败 {}: {}, 不绘制类别名", path.display(), e);
            None
        }
        Err(_) => {
            warn!("⚠️ 未找到字体: {}, 不绘制类别名", path.display());
            None
        }
    }
}

pub fn class_label(class_names: &[String], id: usize) -> String {
    class_names
        .get(id)
        .cloned()
        .unwrap_or_else(|| format!("class {id}"))
}

/// 绘制 2 像素绿色框, 类别名写在框上方 10 像素处
pub fn annotate(
    image: &mut RgbImage,
    labels: &[YoloLabel],
    class_names: &[String],
    font: Option<&FontVec>,
) {
    let (w, h) = image.dimensions();
    for label in labels {
        let (x, y, bw, bh) = label.to_pixel_rect(w, h);
        if bw <= 0 || bh <= 0 {
            warn!("⚠️ 跳过空框: {}", label);
            continue;
        }
        draw_hollow_rect_mut(image, Rect::at(x, y).of_size(bw as u32, bh as u32), BOX_COLOR);
        if bw > 2 && bh > 2 {
            draw_hollow_rect_mut(
                image,
                Rect::at(x + 1, y + 1).of_size(bw as u32 - 2, bh as u32 - 2),
                BOX_COLOR,
            );
        }

        if let Some(font) = font {
            let text_y = (y - 10 - LABEL_SCALE as i32).max(0);
            draw_text_mut(
                image,
                BOX_COLOR,
                x.max(0),
                text_y,
                PxScale::from(LABEL_SCALE),
                font,
                &class_label(class_names, label.class_id),
            );
        }
    }
}

/// 读取样本图片并叠加标注
pub fn render(sample: &Sample, class_names: &[String], font: Option<&FontVec>) -> Result<RgbImage> {
    let mut image = image::open(&sample.image_path)
        .with_context(|| format!("failed to open {}", sample.image_path.display()))?
        .to_rgb8();
    if let Some(labels) = &sample.labels {
        annotate(&mut image, labels, class_names, font);
        info!("🖍️ 绘制 {} 个标注框", labels.len());
    }
    Ok(image)
}

/// 在窗口中显示图片, Esc 或关闭窗口退出
pub fn show(title: String, image: RgbImage) {
    let (w, h) = image.dimensions();
    // NEU-DET 图片只有 200x200, 放大显示
    let scale = (800.0 / w.max(h) as f32).max(1.0);
    let conf = Conf {
        window_title: title,
        window_width: (w as f32 * scale) as i32,
        window_height: (h as f32 * scale) as i32,
        window_resizable: true,
        ..Default::default()
    };

    macroquad::Window::from_config(conf, async move {
        let rgba = image::DynamicImage::ImageRgb8(image).to_rgba8();
        let texture = Texture2D::from_rgba8(w as u16, h as u16, &rgba);
        texture.set_filter(FilterMode::Nearest);
        loop {
            if is_key_pressed(KeyCode::Escape) {
                break;
            }
            clear_background(BLACK);
            let fit = (screen_width() / w as f32).min(screen_height() / h as f32);
            let (dw, dh) = (w as f32 * fit, h as f32 * fit);
            draw_texture_ex(
                &texture,
                (screen_width() - dw) / 2.0,
                (screen_height() - dh) / 2.0,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(dw, dh)),
                    ..Default::default()
                },
            );
            next_frame().await
        }
    });
}
