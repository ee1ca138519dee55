// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 巡检工作线程: 推理不阻塞渲染循环
//! 渲染线程 --(图片路径)--> 工作线程 --(WorkerEvent)--> 渲染线程

use std::path::PathBuf;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{error, info, warn};

use crate::inspection::{Inspection, InspectionJournal, QualityAgent};
use crate::models::DefectDetector;

#[derive(Debug)]
pub enum WorkerEvent {
    Done(Inspection),
    Failed { image: PathBuf, error: String },
}

pub struct InspectionWorker {
    request_tx: Option<Sender<PathBuf>>,
    event_rx: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
}

impl InspectionWorker {
    pub fn spawn<D>(mut agent: QualityAgent<D>, mut journal: Option<InspectionJournal>) -> Self
    where
        D: DefectDetector + 'static,
    {
        // 同一时刻最多一个巡检在途
        let (request_tx, request_rx) = crossbeam_channel::bounded::<PathBuf>(1);
        let (event_tx, event_rx) = crossbeam_channel::bounded::<WorkerEvent>(4);

        let handle = std::thread::spawn(move || {
            for image in request_rx.iter() {
                info!("🔍 Part at inspection station. Running analysis on {}", image.display());
                let event = match agent.inspect_part(&image) {
                    Ok(inspection) => {
                        info!("Agent Decision: {}", inspection.disposition);
                        for line in &inspection.summary {
                            info!("  {}", line);
                        }
                        if let Some(journal) = journal.as_mut() {
                            if let Err(e) = journal.record(&inspection) {
                                warn!("⚠️ 写入巡检记录失败 {}: {:#}", journal.path().display(), e);
                            }
                        }
                        WorkerEvent::Done(inspection)
                    }
                    Err(e) => {
                        error!("❌ 巡检失败 {}: {:#}", image.display(), e);
                        WorkerEvent::Failed {
                            image,
                            error: format!("{:#}", e),
                        }
                    }
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
            info!("巡检线程退出");
        });

        Self {
            request_tx: Some(request_tx),
            event_rx,
            handle: Some(handle),
        }
    }

    /// 提交巡检; 队列已满或线程已退出时返回 false
    pub fn request(&self, image: PathBuf) -> bool {
        let Some(tx) = &self.request_tx else {
            return false;
        };
        match tx.try_send(image) {
            Ok(()) => true,
            Err(TrySendError::Full(image)) => {
                warn!("⚠️ 巡检队列已满, 丢弃 {}", image.display());
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                error!("❌ 巡检线程已退出");
                false
            }
        }
    }

    /// 非阻塞读取一个结果
    pub fn try_next(&self) -> Option<WorkerEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl Drop for InspectionWorker {
    fn drop(&mut self) {
        // 关闭请求通道, 线程处理完当前任务后退出
        self.request_tx.take();
        while self.event_rx.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::Disposition;
    use crate::models::Detection;
    use anyhow::Result;
    use image::{DynamicImage, RgbImage};
    use std::time::Duration;

    struct FakeDetector(Vec<Detection>);

    impl DefectDetector for FakeDetector {
        fn detect(&mut self, _image: &DynamicImage) -> Result<Vec<Detection>> {
            Ok(self.0.clone())
        }

        fn class_names(&self) -> &[String] {
            &[]
        }
    }

    fn recv(worker: &InspectionWorker) -> WorkerEvent {
        worker
            .event_rx
            .recv_timeout(Duration::from_secs(10))
            .unwrap()
    }

    #[test]
    fn test_worker_inspects_and_journals() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("part.png");
        RgbImage::new(4, 4).save(&image).unwrap();
        let journal_path = dir.path().join("inspections.jsonl");

        let agent = QualityAgent::new(FakeDetector(vec![Detection::new("scratches", 0.9)]));
        let journal = InspectionJournal::open(&journal_path).unwrap();
        let worker = InspectionWorker::spawn(agent, Some(journal));

        assert!(worker.request(image.clone()));
        match recv(&worker) {
            WorkerEvent::Done(inspection) => {
                assert_eq!(inspection.image, image);
                assert_eq!(inspection.disposition, Disposition::Reroute);
            }
            other => panic!("unexpected {:?}", other),
        }
        drop(worker);

        let text = std::fs::read_to_string(&journal_path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_worker_reports_failure() {
        let worker = InspectionWorker::spawn(QualityAgent::new(FakeDetector(vec![])), None);
        assert!(worker.request(PathBuf::from("missing/part.jpg")));
        match recv(&worker) {
            WorkerEvent::Failed { image, error } => {
                assert_eq!(image, PathBuf::from("missing/part.jpg"));
                assert!(error.contains("part.jpg"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
