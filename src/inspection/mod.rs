// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 质检系统 (Inspection)
///
/// - disposition: 固定优先级的处置规则
/// - agent:       调用检测器并生成巡检结果
/// - journal:     巡检记录 (JSON Lines)
pub mod agent;
pub mod disposition;
pub mod journal;

pub use agent::{Inspection, QualityAgent};
pub use disposition::{decide, Disposition};
pub use journal::InspectionJournal;
