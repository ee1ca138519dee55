// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 传送带质检仿真
///
/// ```text
/// 主循环 (固定步长) ── 零件进入工位 ──> InspectionWorker (推理线程)
///      ↑                                        │
///      └────────── WorkerEvent (处置结果) ───────┘
/// ```
pub mod conveyor;
pub mod renderer;
pub mod worker;

use std::path::PathBuf;

use macroquad::prelude::{get_frame_time, get_time, is_key_pressed, next_frame, Conf, KeyCode};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

pub use conveyor::{Conveyor, InspectionClock, SimulationState};
pub use worker::{InspectionWorker, WorkerEvent};

pub const WINDOW_TITLE: &str = "Agentic Quality Control Simulation";

pub fn window_conf() -> Conf {
    Conf {
        window_title: WINDOW_TITLE.to_string(),
        window_width: conveyor::SCREEN_WIDTH as i32,
        window_height: conveyor::SCREEN_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

/// 把已到达的巡检结果写入状态
pub fn drain_events(state: &mut SimulationState, worker: &InspectionWorker) {
    while let Some(event) = worker.try_next() {
        match event {
            WorkerEvent::Done(inspection) => state.apply(&inspection),
            WorkerEvent::Failed { error, .. } => state.fail(&error),
        }
    }
}

/// 随机取一张测试图片提交巡检; 提交失败时结束等待并在 HUD 显示错误
pub fn request_inspection<R: Rng>(
    state: &mut SimulationState,
    worker: &InspectionWorker,
    test_images: &[PathBuf],
    rng: &mut R,
) {
    match test_images.choose(rng) {
        Some(image) if worker.request(image.clone()) => {}
        _ => state.fail("inspection request rejected"),
    }
}

/// 主循环, Esc 退出
pub async fn run(worker: InspectionWorker, test_images: Vec<PathBuf>) {
    let mut state = SimulationState::new(get_time());
    let mut rng = rand::thread_rng();
    info!("🚀 仿真开始, 测试图片 {} 张", test_images.len());

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        if state.advance(get_frame_time() as f64, get_time()) {
            request_inspection(&mut state, &worker, &test_images, &mut rng);
        }
        drain_events(&mut state, &worker);

        renderer::draw(&state);
        next_frame().await
    }
    info!("仿真结束");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::{Disposition, QualityAgent};
    use crate::models::{DefectDetector, Detection};
    use anyhow::Result;
    use image::{DynamicImage, RgbImage};
    use std::time::{Duration, Instant};

    struct FakeDetector(Vec<Detection>);

    impl DefectDetector for FakeDetector {
        fn detect(&mut self, _image: &DynamicImage) -> Result<Vec<Detection>> {
            Ok(self.0.clone())
        }

        fn class_names(&self) -> &[String] {
            &[]
        }
    }

    fn worker(results: Vec<Detection>) -> InspectionWorker {
        InspectionWorker::spawn(QualityAgent::new(FakeDetector(results)), None)
    }

    // 轮询直到结果写入状态
    fn drain_until_settled(state: &mut SimulationState, worker: &InspectionWorker) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while state.pending && Instant::now() < deadline {
            drain_events(state, worker);
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_window_conf() {
        let conf = window_conf();
        assert_eq!(conf.window_title, "Agentic Quality Control Simulation");
        assert_eq!((conf.window_width, conf.window_height), (1000, 400));
    }

    #[test]
    fn test_done_event_recolors_part() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("part.png");
        RgbImage::new(4, 4).save(&image).unwrap();

        let worker = worker(vec![Detection::new("patches", 0.4)]);
        let mut state = SimulationState::new(0.0);
        state.pending = true;
        request_inspection(&mut state, &worker, &[image], &mut rand::thread_rng());
        assert!(state.pending);

        drain_until_settled(&mut state, &worker);
        assert!(!state.pending);
        assert_eq!(state.decision, Disposition::HaltAndAlert.to_string());
        assert_eq!(state.summary, "- Found 'patches' with 0.40 confidence.");
        assert_eq!(state.part_color, conveyor::RED);
    }

    #[test]
    fn test_failed_event_shows_error() {
        let worker = worker(vec![]);
        let mut state = SimulationState::new(0.0);
        state.pending = true;
        let missing = vec![PathBuf::from("missing/part.jpg")];
        request_inspection(&mut state, &worker, &missing, &mut rand::thread_rng());

        drain_until_settled(&mut state, &worker);
        assert!(!state.pending);
        assert_eq!(state.decision, "Error");
        assert!(state.summary.contains("part.jpg"));
        assert_eq!(state.part_color, conveyor::BLUE_GRAY);
    }

    #[test]
    fn test_rejected_request_clears_pending() {
        let worker = worker(vec![]);
        let mut state = SimulationState::new(0.0);
        state.pending = true;
        request_inspection(&mut state, &worker, &[], &mut rand::thread_rng());
        assert!(!state.pending);
        assert_eq!(state.decision, "Error");
        assert_eq!(state.summary, "inspection request rejected");
    }
}
