// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 处置规则: 依据检测到的 (类别, 置信度) 决定零件去向
// 优先级: Halt & Alert > Reroute > Log & Pass > Pass

use std::fmt;

use phf::phf_set;
use serde::Serialize;

use crate::models::Detection;

/// 出现即停线的严重缺陷
static CRITICAL_DEFECTS: phf::Set<&'static str> = phf_set! {
    "patches",
    "rolled-in_scale",
};

/// 高置信度时需要改道复检的缺陷
static MAJOR_DEFECTS: phf::Set<&'static str> = phf_set! {
    "scratches",
    "crazing",
};

/// 严格大于该值才算高置信度
pub const MAJOR_CONFIDENCE: f32 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Disposition {
    Pass,
    #[serde(rename = "Log & Pass")]
    LogAndPass,
    Reroute,
    #[serde(rename = "Halt & Alert")]
    HaltAndAlert,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Pass => "Pass",
            Disposition::LogAndPass => "Log & Pass",
            Disposition::Reroute => "Reroute",
            Disposition::HaltAndAlert => "Halt & Alert",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_critical(label: &str) -> bool {
    CRITICAL_DEFECTS.contains(label)
}

pub fn is_major(detection: &Detection) -> bool {
    MAJOR_DEFECTS.contains(detection.label.as_str()) && detection.confidence > MAJOR_CONFIDENCE
}

pub fn decide(detections: &[Detection]) -> Disposition {
    if detections.iter().any(|d| is_critical(&d.label)) {
        Disposition::HaltAndAlert
    } else if detections.iter().any(is_major) {
        Disposition::Reroute
    } else if !detections.is_empty() {
        Disposition::LogAndPass
    } else {
        Disposition::Pass
    }
}
