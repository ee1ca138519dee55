// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 传送带状态 (与渲染无关, 可单独测试)
// 固定步长 1/60 s, 每步零件右移 BELT_SPEED 像素

use crate::inspection::{Disposition, Inspection};

pub const SCREEN_WIDTH: f32 = 1000.0;
pub const SCREEN_HEIGHT: f32 = 400.0;
pub const BELT_SPEED: f32 = 2.0; // 像素/步
pub const TICK: f64 = 1.0 / 60.0;
pub const INSPECTION_INTERVAL: f64 = 4.0; // 秒
pub const PART_WIDTH: f32 = 100.0;
pub const PART_HEIGHT: f32 = 50.0;
pub const STATION_WINDOW: f32 = 50.0; // 工位中心左右各 50 像素内触发
pub const STATION_WIDTH: f32 = 150.0;

pub type Rgb = (u8, u8, u8);

pub const WHITE: Rgb = (255, 255, 255);
pub const BLACK: Rgb = (0, 0, 0);
pub const GRAY: Rgb = (50, 50, 50);
pub const BLUE_GRAY: Rgb = (100, 120, 140);
pub const GREEN: Rgb = (0, 200, 0);
pub const YELLOW: Rgb = (255, 230, 0);
pub const RED: Rgb = (220, 0, 0);
pub const STATION_OUTLINE: Rgb = (255, 255, 100);

pub fn disposition_color(disposition: Disposition) -> Rgb {
    match disposition {
        Disposition::Pass => GREEN,
        Disposition::LogAndPass | Disposition::Reroute => YELLOW,
        Disposition::HaltAndAlert => RED,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conveyor {
    pub part_x: f32,
    pub width: f32,
    pub speed: f32,
}

impl Default for Conveyor {
    fn default() -> Self {
        Self {
            part_x: -PART_WIDTH,
            width: SCREEN_WIDTH,
            speed: BELT_SPEED,
        }
    }
}

impl Conveyor {
    /// 移动一步, 越过右边界后回到左侧画面外
    pub fn tick(&mut self) {
        self.part_x += self.speed;
        if self.part_x > self.width {
            self.part_x = -PART_WIDTH;
        }
    }

    pub fn station_x(&self) -> f32 {
        (self.width / 2.0).floor()
    }

    pub fn at_station(&self) -> bool {
        let station = self.station_x();
        station - STATION_WINDOW < self.part_x && self.part_x < station + STATION_WINDOW
    }
}

/// 两次巡检之间至少间隔 `interval` 秒 (严格大于)
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionClock {
    pub last: f64,
    pub interval: f64,
}

impl InspectionClock {
    pub fn new(start: f64) -> Self {
        Self {
            last: start,
            interval: INSPECTION_INTERVAL,
        }
    }

    pub fn due(&self, now: f64) -> bool {
        now - self.last > self.interval
    }

    pub fn mark(&mut self, now: f64) {
        self.last = now;
    }
}

/// 仿真画面所需的全部状态
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub conveyor: Conveyor,
    pub clock: InspectionClock,
    pub pending: bool, // 已提交巡检, 等待结果
    pub part_color: Rgb,
    pub decision: String,
    pub summary: String,
    accumulator: f64,
}

impl SimulationState {
    pub fn new(start: f64) -> Self {
        Self {
            conveyor: Conveyor::default(),
            clock: InspectionClock::new(start),
            pending: false,
            part_color: BLUE_GRAY,
            decision: "Waiting...".to_string(),
            summary: "No part under inspection.".to_string(),
            accumulator: 0.0,
        }
    }

    /// 推进 `dt` 秒; 需要发起巡检时返回 true 并标记为等待中
    pub fn advance(&mut self, dt: f64, now: f64) -> bool {
        self.accumulator += dt;
        let mut trigger = false;
        while self.accumulator >= TICK {
            self.accumulator -= TICK;
            self.conveyor.tick();
            if !self.pending && !trigger && self.conveyor.at_station() && self.clock.due(now) {
                trigger = true;
            }
        }
        if trigger {
            self.pending = true;
            self.clock.mark(now);
        }
        trigger
    }

    pub fn apply(&mut self, inspection: &Inspection) {
        self.pending = false;
        self.decision = inspection.disposition.to_string();
        self.summary = inspection.headline().to_string();
        self.part_color = disposition_color(inspection.disposition);
    }

    /// 巡检失败: 零件颜色不变, HUD 显示错误
    pub fn fail(&mut self, error: &str) {
        self.pending = false;
        self.decision = "Error".to_string();
        self.summary = error.lines().next().unwrap_or_default().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Detection;
    use std::path::PathBuf;

    #[test]
    fn test_part_wraps_after_right_edge() {
        let mut c = Conveyor {
            part_x: 999.0,
            ..Default::default()
        };
        c.tick();
        assert_eq!(c.part_x, -PART_WIDTH);
        c.tick();
        assert_eq!(c.part_x, -98.0);
    }

    #[test]
    fn test_station_window_is_open_interval() {
        let mut c = Conveyor::default();
        c.part_x = 450.0;
        assert!(!c.at_station());
        c.part_x = 452.0;
        assert!(c.at_station());
        c.part_x = 548.0;
        assert!(c.at_station());
        c.part_x = 550.0;
        assert!(!c.at_station());
    }

    #[test]
    fn test_clock_strictly_after_interval() {
        let clock = InspectionClock::new(10.0);
        assert!(!clock.due(14.0));
        assert!(clock.due(14.01));
    }

    #[test]
    fn test_advance_uses_fixed_ticks() {
        let mut s = SimulationState::new(0.0);
        s.advance(TICK * 3.0 + 1e-9, 0.05);
        assert_eq!(s.conveyor.part_x, -PART_WIDTH + 3.0 * BELT_SPEED);
        // 不足一步的时间累积到下一帧
        s.advance(TICK / 2.0, 0.06);
        assert_eq!(s.conveyor.part_x, -PART_WIDTH + 3.0 * BELT_SPEED);
    }

    #[test]
    fn test_trigger_requires_station_and_interval() {
        let mut s = SimulationState::new(0.0);
        s.conveyor.part_x = 460.0;
        // 在工位内但间隔未到
        assert!(!s.advance(TICK, 3.0));
        // 间隔已到
        assert!(s.advance(TICK, 4.5));
        assert!(s.pending);
        assert_eq!(s.clock.last, 4.5);
        // 等待结果期间不重复触发
        assert!(!s.advance(TICK, 9.0));
    }

    #[test]
    fn test_no_trigger_outside_station() {
        let mut s = SimulationState::new(0.0);
        s.conveyor.part_x = 100.0;
        assert!(!s.advance(TICK, 100.0));
    }

    #[test]
    fn test_apply_updates_hud_and_color() {
        let mut s = SimulationState::new(0.0);
        assert_eq!(s.decision, "Waiting...");
        assert_eq!(s.part_color, BLUE_GRAY);
        s.pending = true;

        let inspection = Inspection::from_detections(
            PathBuf::from("x.jpg"),
            vec![Detection::new("rolled-in_scale", 0.6), Detection::new("crazing", 0.9)],
        );
        s.apply(&inspection);
        assert!(!s.pending);
        assert_eq!(s.decision, "Halt & Alert");
        assert_eq!(s.summary, "- Found 'rolled-in_scale' with 0.60 confidence.");
        assert_eq!(s.part_color, RED);

        s.apply(&Inspection::from_detections(PathBuf::from("y.jpg"), vec![]));
        assert_eq!(s.decision, "Pass");
        assert_eq!(s.summary, "No defects detected.");
        assert_eq!(s.part_color, GREEN);
    }

    #[test]
    fn test_colors() {
        assert_eq!(disposition_color(Disposition::Reroute), YELLOW);
        assert_eq!(disposition_color(Disposition::LogAndPass), YELLOW);
    }

    #[test]
    fn test_fail_keeps_color() {
        let mut s = SimulationState::new(0.0);
        s.pending = true;
        s.fail("failed to open x.jpg\ncaused by ...");
        assert!(!s.pending);
        assert_eq!(s.decision, "Error");
        assert_eq!(s.summary, "failed to open x.jpg");
        assert_eq!(s.part_color, BLUE_GRAY);
    }
}
