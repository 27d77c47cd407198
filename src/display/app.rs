//! # Dashboard Window
//!
//! The eframe application: banner, camera button, read-outs, the orientation
//! view, three live charts and a table of last-known values.
//!
//! Telemetry arrives through a watch channel. Two refresh schedules decide
//! when the charts and the orientation view copy the latest state; between
//! refreshes the window redraws the cached frame.

use eframe::egui::{self, Color32, RichText, Sense, Stroke};
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};
use nalgebra::Point3;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, warn};

use super::charts::{ChartFrame, LineChart, ACCENT};
use super::orientation::{rotation_from, Cylinder, ViewProjection, VIEW_LIMIT};
use super::schedule::RefreshSchedule;
use crate::camera::{CameraLauncher, LaunchOutcome};
use crate::config::{Config, DisplayConfig};
use crate::error::{DashboardError, Result};
use crate::telemetry::TelemetryState;

const WINDOW_SIZE: [f32; 2] = [1800.0, 1100.0];
const CHART_SIZE: [f32; 2] = [500.0, 300.0];
const ORIENTATION_SIZE: [f32; 2] = [420.0, 360.0];
const CAMERA_BUTTON_SIZE: [f32; 2] = [360.0, 240.0];

/// Draw every n-th grid line of the cylinder
const EDGE_STRIDE: usize = 5;

/// Live telemetry dashboard
pub struct DashboardApp {
    display: DisplayConfig,
    updates: watch::Receiver<TelemetryState>,
    chart_schedule: RefreshSchedule,
    orientation_schedule: RefreshSchedule,
    frame: ChartFrame,
    cylinder: Cylinder,
    posed: Cylinder,
    projection: ViewProjection,
    camera: CameraLauncher,
}

impl DashboardApp {
    pub fn new(
        config: &Config,
        updates: watch::Receiver<TelemetryState>,
        camera: CameraLauncher,
    ) -> Self {
        let now = Instant::now();
        let cylinder = Cylinder::default();

        Self {
            display: config.display.clone(),
            updates,
            chart_schedule: RefreshSchedule::from_millis(config.display.chart_refresh_ms, now),
            orientation_schedule: RefreshSchedule::from_millis(
                config.display.orientation_refresh_ms,
                now,
            ),
            frame: ChartFrame::default(),
            posed: cylinder.clone(),
            cylinder,
            projection: ViewProjection::default(),
            camera,
        }
    }

    /// Run the refresh tasks that are due at `now`
    ///
    /// # Returns
    ///
    /// How long until the next task is due
    pub fn refresh(&mut self, now: Instant) -> Duration {
        if self.chart_schedule.fire_if_due(now) {
            self.frame = ChartFrame::from_state(&self.updates.borrow());
        }

        if self.orientation_schedule.fire_if_due(now) {
            let orientation = self.updates.borrow().orientation();
            self.posed = self.cylinder.rotated(&rotation_from(orientation));
        }

        self.chart_schedule
            .time_until_due(now)
            .min(self.orientation_schedule.time_until_due(now))
    }

    pub fn frame(&self) -> &ChartFrame {
        &self.frame
    }

    pub fn posed_cylinder(&self) -> &Cylinder {
        &self.posed
    }

    fn show_banner(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(15.0);
            ui.label(RichText::new(&self.display.title).size(32.0).strong().color(ACCENT));
            ui.label(RichText::new(&self.display.team).size(22.0).strong().color(ACCENT));
            ui.add_space(10.0);
        });
    }

    fn show_camera_button(&mut self, ui: &mut egui::Ui) {
        let button = egui::Button::new(
            RichText::new("Open Camera Video Stream")
                .size(16.0)
                .strong()
                .color(ACCENT),
        )
        .fill(Color32::from_gray(0xe6));

        if ui.add_sized(CAMERA_BUTTON_SIZE, button).clicked() {
            match self.camera.launch() {
                Ok(LaunchOutcome::Started) => info!("Camera view requested"),
                Ok(LaunchOutcome::AlreadyOpen) => {}
                Err(e) => warn!("Could not open camera view: {}", e),
            }
        }
    }

    fn show_readouts(&self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.set_min_width(360.0);
            for readout in &self.frame.readouts {
                ui.add_space(12.0);
                ui.label(RichText::new(readout.label).size(20.0));
                ui.label(RichText::new(&readout.value).size(24.0).strong());
            }
        });
    }

    fn show_orientation(&self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.label(RichText::new("Orientation (Cylinder)").strong());

            let (response, painter) = ui.allocate_painter(ORIENTATION_SIZE.into(), Sense::hover());
            let rect = response.rect;
            painter.rect_filled(rect, 0.0, Color32::WHITE);

            // Fit the projected view cube into the smaller side.
            let scale = 0.5 * rect.width().min(rect.height()) as f64 / (VIEW_LIMIT * 1.75);
            let center = rect.center();
            let to_screen = |p: &Point3<f64>| {
                let [x, y] = self.projection.project(p);
                center + egui::vec2((x * scale) as f32, (-y * scale) as f32)
            };

            let axes = [
                (Point3::new(VIEW_LIMIT, 0.0, 0.0), Color32::RED),
                (Point3::new(0.0, VIEW_LIMIT, 0.0), Color32::GREEN),
                (Point3::new(0.0, 0.0, VIEW_LIMIT), Color32::BLUE),
            ];
            for (tip, color) in axes {
                painter.line_segment(
                    [to_screen(&Point3::origin()), to_screen(&tip)],
                    Stroke::new(1.0, color),
                );
            }

            let posed = &self.posed;
            let (rows, cols) = (posed.rows(), posed.cols());
            let stroke = Stroke::new(0.8, Color32::from_gray(30));

            let rings = (0..cols).step_by(EDGE_STRIDE).chain(std::iter::once(cols - 1));
            for col in rings {
                for row in 0..rows - 1 {
                    painter.line_segment(
                        [to_screen(&posed.vertex(row, col)), to_screen(&posed.vertex(row + 1, col))],
                        stroke,
                    );
                }
            }

            for row in (0..rows).step_by(EDGE_STRIDE) {
                painter.line_segment(
                    [to_screen(&posed.vertex(row, 0)), to_screen(&posed.vertex(row, cols - 1))],
                    stroke,
                );
            }
        });
    }

    fn show_table(&self, ui: &mut egui::Ui) {
        egui::Grid::new("latest_values")
            .striped(true)
            .min_col_width(110.0)
            .show(ui, |ui| {
                for (label, _) in &self.frame.table {
                    ui.label(RichText::new(*label).size(14.0).strong());
                }
                ui.end_row();
                for (_, value) in &self.frame.table {
                    ui.label(RichText::new(value.as_str()).size(14.0));
                }
                ui.end_row();
            });
    }
}

fn show_chart(ui: &mut egui::Ui, chart: &LineChart) {
    ui.vertical(|ui| {
        ui.label(RichText::new(chart.title).strong());
        Plot::new(chart.id)
            .width(CHART_SIZE[0])
            .height(CHART_SIZE[1])
            .legend(Legend::default())
            .x_axis_label("Sample")
            .y_axis_label(chart.y_label)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [0.0, chart.y_range.0],
                    [chart.x_max, chart.y_range.1],
                ));
                for line in &chart.lines {
                    plot_ui.line(
                        Line::new(PlotPoints::from(line.points.clone()))
                            .name(line.name)
                            .color(line.color),
                    );
                }
            });
    });
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let next_refresh = self.refresh(Instant::now());

        egui::TopBottomPanel::top("banner").show(ctx, |ui| self.show_banner(ui));

        egui::TopBottomPanel::bottom("table_panel")
            .show(ctx, |ui| {
                ui.add_space(10.0);
                self.show_table(ui);
                ui.add_space(10.0);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.show_camera_button(ui);
                ui.separator();
                self.show_readouts(ui);
                ui.separator();
                self.show_orientation(ui);
            });
            ui.separator();
            ui.horizontal(|ui| {
                show_chart(ui, &self.frame.altitude);
                show_chart(ui, &self.frame.accel);
                show_chart(ui, &self.frame.gyro);
            });
        });

        ctx.request_repaint_after(next_refresh);
    }
}

/// Open the dashboard window and block until it is closed
///
/// # Errors
///
/// Returns `Window` if the native window cannot be created
pub fn run(
    config: &Config,
    updates: watch::Receiver<TelemetryState>,
    camera: CameraLauncher,
) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Live Sensor & Camera Dashboard")
            .with_inner_size(WINDOW_SIZE),
        ..Default::default()
    };

    let app = DashboardApp::new(config, updates, camera);
    eframe::run_native(
        "Live Sensor & Camera Dashboard",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| DashboardError::Window(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::MockViewerBackend;
    use crate::telemetry::{Channel, TelemetryRecord};
    use std::sync::Arc;

    fn new_app() -> (DashboardApp, watch::Sender<TelemetryState>) {
        let (tx, rx) = watch::channel(TelemetryState::default());
        let camera = CameraLauncher::new("http://192.168.4.1/", Arc::new(MockViewerBackend::new()));
        (DashboardApp::new(&Config::default(), rx, camera), tx)
    }

    fn state_with(record: TelemetryRecord) -> TelemetryState {
        let mut state = TelemetryState::default();
        state.apply(&record);
        state
    }

    #[test]
    fn test_first_refresh_runs_both_tasks() {
        let (mut app, _tx) = new_app();
        let next = app.refresh(Instant::now());

        assert_eq!(next, Duration::from_millis(100));
        assert_eq!(app.frame(), &ChartFrame::default());
        assert_eq!(app.posed_cylinder(), &Cylinder::default());
    }

    #[test]
    fn test_charts_pick_up_state_on_next_refresh() {
        let (mut app, tx) = new_app();
        let start = Instant::now();
        app.refresh(start);

        tx.send_replace(state_with(TelemetryRecord {
            alt: Some(250.0),
            ..Default::default()
        }));

        // Not due yet: the cached frame is kept.
        app.refresh(start + Duration::from_millis(50));
        assert_eq!(app.frame().table[Channel::Alt.index()].1, "--");

        app.refresh(start + Duration::from_millis(100));
        assert_eq!(app.frame().table[Channel::Alt.index()].1, "250.00");
        assert_eq!(app.frame().altitude.lines[0].points, vec![[0.0, 250.0]]);
    }

    #[test]
    fn test_orientation_follows_latest_gyro() {
        let (mut app, tx) = new_app();
        let start = Instant::now();
        app.refresh(start);

        tx.send_replace(state_with(TelemetryRecord {
            gx: Some(0.0),
            gy: Some(0.0),
            gz: Some(90.0),
            ..Default::default()
        }));
        app.refresh(start + Duration::from_millis(100));

        // First vertex (theta = 0, bottom) swings from +x to +y.
        let p = app.posed_cylinder().vertex(0, 0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 0.4).abs() < 1e-9);
        assert!((p.z + 0.5).abs() < 1e-9);
    }
}
