// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 巡检记录: 每次巡检追加一行 JSON

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::agent::Inspection;
use super::disposition::Disposition;

#[derive(Debug, Serialize)]
struct DetectionRecord<'a> {
    label: &'a str,
    confidence: f32,
    bbox: [f32; 4], // xmin, ymin, width, height
}

#[derive(Debug, Serialize)]
struct JournalRecord<'a> {
    timestamp: String,
    image: String,
    disposition: Disposition,
    detections: Vec<DetectionRecord<'a>>,
}

pub struct InspectionJournal {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl InspectionJournal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open journal {}", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn record(&mut self, inspection: &Inspection) -> Result<()> {
        let record = JournalRecord {
            timestamp: chrono::Local::now().to_rfc3339(),
            image: inspection.image.display().to_string(),
            disposition: inspection.disposition,
            detections: inspection
                .detections
                .iter()
                .map(|d| DetectionRecord {
                    label: &d.label,
                    confidence: d.confidence,
                    bbox: [d.bbox.xmin(), d.bbox.ymin(), d.bbox.width(), d.bbox.height()],
                })
                .collect(),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
