// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use macroquad::prelude::{
    clear_background, draw_rectangle, draw_rectangle_lines, draw_text, measure_text, Color,
};

use super::conveyor::{
    Rgb, SimulationState, BLACK, GRAY, PART_HEIGHT, PART_WIDTH, SCREEN_HEIGHT, STATION_OUTLINE,
    STATION_WIDTH, WHITE,
};

const BELT_HEIGHT: f32 = 100.0;
const STATION_FONT: f32 = 24.0;
const DECISION_FONT: f32 = 36.0;
const SUMMARY_FONT: f32 = 24.0;

fn color((r, g, b): Rgb) -> Color {
    Color::from_rgba(r, g, b, 255)
}

/// macroquad 的文字坐标是基线, 换算成左上角
fn draw_text_top_left(text: &str, x: f32, y: f32, font_size: f32, rgb: Rgb) {
    let dims = measure_text(text, None, font_size as u16, 1.0);
    draw_text(text, x, y + dims.offset_y, font_size, color(rgb));
}

/// 绘制一帧: 背景 → 传送带 → 工位 → 零件 → HUD
pub fn draw(state: &SimulationState) {
    let height = SCREEN_HEIGHT;
    let width = state.conveyor.width;
    let station = state.conveyor.station_x();

    clear_background(color(GRAY));

    // 传送带
    draw_rectangle(0.0, height / 2.0 - BELT_HEIGHT / 2.0, width, BELT_HEIGHT, color(BLACK));

    // 巡检工位
    draw_rectangle_lines(
        station - STATION_WIDTH / 2.0,
        0.0,
        STATION_WIDTH,
        height,
        2.0,
        color(STATION_OUTLINE),
    );
    draw_text_top_left("INSPECTION", station - 50.0, 10.0, STATION_FONT, WHITE);

    // 零件
    let part_y = height / 2.0 - PART_HEIGHT / 2.0;
    draw_rectangle(state.conveyor.part_x, part_y, PART_WIDTH, PART_HEIGHT, color(state.part_color));
    draw_rectangle_lines(state.conveyor.part_x, part_y, PART_WIDTH, PART_HEIGHT, 2.0, color(WHITE));

    // HUD
    draw_text_top_left(
        &format!("Agent Decision: {}", state.decision),
        20.0,
        height - 80.0,
        DECISION_FONT,
        WHITE,
    );
    draw_text_top_left(
        &format!("Summary: {}", state.summary),
        20.0,
        height - 40.0,
        SUMMARY_FONT,
        WHITE,
    );
}
