//! UI overlays using bevy_egui

use atrium_core::{ControlState, RoomStatus};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use crate::app::TelemetryState;
use crate::camera::{DefaultView, ResetView};
use crate::inspector::{tooltip_anchor, HoveredRoom};
use crate::network::{send_setpoint, DaemonConfig};

/// Estimated tooltip extent used for edge-avoidance
const TOOLTIP_SIZE: egui::Vec2 = egui::Vec2::new(180.0, 64.0);

/// Grouped system parameters for the main UI system
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub telemetry: ResMut<'w, TelemetryState>,
    pub hovered: Res<'w, HoveredRoom>,
    pub default_view: Res<'w, DefaultView>,
    pub daemon_config: Res<'w, DaemonConfig>,
    pub reset_requests: MessageWriter<'w, ResetView>,
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Main UI system runs in EguiPrimaryContextPass for proper input
        // handling (bevy_egui 0.38+)
        app.add_systems(EguiPrimaryContextPass, ui_system);
    }
}

fn ui_system(mut params: UiParams) {
    // Get the egui context - early return if not available
    let Ok(ctx) = params.contexts.ctx_mut() else {
        return;
    };

    let telemetry = &mut *params.telemetry;

    // Telemetry dashboard (right side)
    egui::SidePanel::right("telemetry_panel")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Telemetry");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let status_color = if telemetry.connected {
                        egui::Color32::GREEN
                    } else {
                        egui::Color32::RED
                    };
                    ui.colored_label(status_color, "●");
                });
            });
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                motor_section(ui, telemetry, &params.daemon_config);
                ui.separator();
                power_section(ui, telemetry);
                ui.separator();
                temperature_section(ui, telemetry);
            });
        });

    // Reset view button over the 3D view
    egui::Area::new(egui::Id::new("view_controls"))
        .fixed_pos(egui::pos2(12.0, 12.0))
        .show(ctx, |ui| {
            let enabled = params.default_view.0.is_some();
            if ui.add_enabled(enabled, egui::Button::new("Reset view")).clicked() {
                params.reset_requests.write(ResetView);
            }
        });

    // Room tooltip near the pointer
    if let Some(hover) = &params.hovered.0 {
        ctx.set_cursor_icon(egui::CursorIcon::PointingHand);

        let viewport = ctx.screen_rect().size();
        let anchor = tooltip_anchor(
            Vec2::new(hover.pointer.x, hover.pointer.y),
            Vec2::new(TOOLTIP_SIZE.x, TOOLTIP_SIZE.y),
            Vec2::new(viewport.x, viewport.y),
        );

        let (title, color) = status_style(hover.status);
        egui::Area::new(egui::Id::new("room_tooltip"))
            .fixed_pos(egui::pos2(anchor.x, anchor.y))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(TOOLTIP_SIZE.x - 16.0);
                    ui.colored_label(color, egui::RichText::new(title).strong());
                    ui.label(&hover.room);
                    ui.small(format!("Status: {}", hover.status));
                });
            });
    }
}

/// Tooltip title and accent color per status. Offline rooms never reach
/// here; the inspector hides the tooltip for them.
fn status_style(status: RoomStatus) -> (&'static str, egui::Color32) {
    match status {
        RoomStatus::Normal => ("Normal", egui::Color32::from_rgb(0x4c, 0xaf, 0x50)),
        RoomStatus::Warning => ("Warning", egui::Color32::from_rgb(0xff, 0xc1, 0x07)),
        RoomStatus::Alarm => ("ALARM", egui::Color32::from_rgb(0xff, 0x00, 0x00)),
        RoomStatus::Offline => ("Offline", egui::Color32::GRAY),
    }
}

fn motor_section(ui: &mut egui::Ui, telemetry: &mut TelemetryState, daemon: &DaemonConfig) {
    ui.label(egui::RichText::new("Motor").strong());

    let rpm = telemetry.snapshot.rpm.unwrap_or(0.0);
    let fraction = telemetry.rpm_range.percent(rpm) / 100.0;
    draw_gauge(
        ui,
        fraction as f32,
        &format!("{:.0} rpm", rpm),
        egui::Color32::from_rgb(0xea, 0x54, 0x55),
    );
    ui.small(format!("Range max: {:.0} rpm", telemetry.rpm_range.max()));

    ui.add_space(6.0);

    // Speed setpoint - hidden while the motor refuses control, matching
    // the plant-side lockout
    if telemetry.snapshot.control == ControlState::Off {
        ui.colored_label(egui::Color32::YELLOW, "Motor control is disabled");
    } else {
        let response = ui.add(
            egui::Slider::new(&mut telemetry.setpoint_drag, 0.0..=100.0)
                .suffix("%")
                .text("Setpoint"),
        );
        if response.changed() {
            send_setpoint(telemetry.setpoint_drag, &daemon.http_url);
        }
    }

    ui.add_space(6.0);
    ui.small("Setpoint history");
    draw_history(ui, telemetry);
}

fn power_section(ui: &mut egui::Ui, telemetry: &TelemetryState) {
    ui.label(egui::RichText::new("Power").strong());

    let Some(power) = telemetry.snapshot.power else {
        ui.small("No data");
        return;
    };

    egui::Grid::new("power_grid").num_columns(2).show(ui, |ui| {
        ui.label("Voltage");
        ui.label(format!("{:.1} V", power.voltage));
        ui.end_row();
        ui.label("Current");
        ui.label(format!("{:.2} A", power.current));
        ui.end_row();
        ui.label("Frequency");
        ui.label(format!("{:.1} Hz", power.frequency));
        ui.end_row();
        ui.label("Power factor");
        ui.label(format!("{:.2}", power.power_factor));
        ui.end_row();
        ui.label("Power");
        ui.label(format!("{:.0} W", power.power));
        ui.end_row();
        ui.label("Energy");
        ui.label(format!("{:.2} kWh", power.energy));
        ui.end_row();
    });
}

fn temperature_section(ui: &mut egui::Ui, telemetry: &TelemetryState) {
    ui.label(egui::RichText::new("Temperature").strong());

    let Some(temperature) = telemetry.snapshot.temperature else {
        ui.small("No data");
        return;
    };

    let fraction = if temperature.max > 0.0 {
        (temperature.current / temperature.max).clamp(0.0, 1.0) as f32
    } else {
        0.0
    };
    draw_gauge(
        ui,
        fraction,
        &format!("{:.1} °C", temperature.current),
        egui::Color32::from_rgb(0x00, 0xdb, 0x89),
    );
    ui.small(format!(
        "max {:.1} °C · avg {:.1} °C",
        temperature.max, temperature.avg
    ));
}

/// Radial gauge: a 270° background arc with a value arc over it and the
/// reading centered underneath
fn draw_gauge(ui: &mut egui::Ui, fraction: f32, value_text: &str, color: egui::Color32) {
    let desired = egui::vec2(ui.available_width().min(220.0), 110.0);
    let (response, painter) = ui.allocate_painter(desired, egui::Sense::hover());
    let rect = response.rect;

    let center = egui::pos2(rect.center().x, rect.bottom() - 20.0);
    let radius = (rect.height() - 30.0).min(rect.width() / 2.0 - 8.0);

    // Sweep from lower-left to lower-right, gap at the bottom
    let start = 0.75 * std::f32::consts::PI;
    let sweep = 1.5 * std::f32::consts::PI;

    draw_arc(
        &painter,
        center,
        radius,
        start,
        sweep,
        egui::Stroke::new(8.0, egui::Color32::from_gray(60)),
    );
    draw_arc(
        &painter,
        center,
        radius,
        start,
        sweep * fraction.clamp(0.0, 1.0),
        egui::Stroke::new(8.0, color),
    );

    painter.text(
        egui::pos2(center.x, center.y - radius / 3.0),
        egui::Align2::CENTER_CENTER,
        value_text,
        egui::FontId::proportional(18.0),
        ui.visuals().strong_text_color(),
    );
}

fn draw_arc(
    painter: &egui::Painter,
    center: egui::Pos2,
    radius: f32,
    start: f32,
    sweep: f32,
    stroke: egui::Stroke,
) {
    if sweep <= 0.0 {
        return;
    }
    let segments = 48;
    let points: Vec<egui::Pos2> = (0..=segments)
        .map(|i| {
            let t = start + sweep * i as f32 / segments as f32;
            egui::pos2(center.x + radius * t.cos(), center.y + radius * t.sin())
        })
        .collect();
    painter.add(egui::Shape::line(points, stroke));
}

/// Polyline of the bounded setpoint history, oldest on the left
fn draw_history(ui: &mut egui::Ui, telemetry: &TelemetryState) {
    let desired = egui::vec2(ui.available_width().min(240.0), 70.0);
    let (response, painter) = ui.allocate_painter(desired, egui::Sense::hover());
    let rect = response.rect;

    painter.rect_filled(rect, 2.0, egui::Color32::from_gray(30));

    let samples: Vec<f64> = telemetry.setpoint_history.iter().collect();
    if samples.len() < 2 {
        return;
    }

    let n = samples.len();
    let points: Vec<egui::Pos2> = samples
        .iter()
        .rev() // newest-first storage, draw oldest to newest
        .enumerate()
        .map(|(i, value)| {
            let x = rect.left() + rect.width() * i as f32 / (n - 1) as f32;
            let y = rect.bottom() - rect.height() * (*value as f32 / 100.0).clamp(0.0, 1.0);
            egui::pos2(x, y)
        })
        .collect();

    painter.add(egui::Shape::line(
        points,
        egui::Stroke::new(2.0, egui::Color32::from_rgb(0x73, 0x67, 0xf0)),
    ));
}
