//! Interactive grove viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulation`] and the
//! configuration it was built from, and implements [`eframe::App`] to draw
//! every grove projected onto the x/y plane.

use std::time::Duration;

use eframe::App;
use glam::{Vec2, Vec3};
use sim_core::{
    config::SimConfig,
    error::{ConfigError, SimError},
    rules::TickReport,
    simulation::Simulation,
    types::Rgb,
    view::LimbView,
};

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true`, feed the frame time to the simulation's timer;
///    every tick that became due runs and the cached views are refreshed.
/// 3. Render limbs and leaves from the cached views.
///
/// ### Fields
/// - `cfg` - Configuration the simulation was built from; reused on reset.
/// - `sim` - The running simulation.
/// - `views` - Per-grove snapshots, refreshed after every tick.
/// - `visible` - Per-grove visibility toggles.
///
/// - `running` - Whether the timer is currently fed with frame time.
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
/// - `show_leaves` - Whether leaf markers are drawn.
///
/// - `last_frame_time` - egui time of the previous running frame.
/// - `last_spawned` - Limbs spawned by the most recent tick (display only).
/// - `status` - Message shown when setup or a tick failed.
pub struct Viewer {
    cfg: SimConfig,
    sim: Simulation,
    views: Vec<Vec<LimbView>>,
    visible: Vec<bool>,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    show_leaves: bool,

    last_frame_time: Option<f64>,
    last_spawned: usize,
    status: Option<String>,
}

impl Viewer {
    /// Builds the simulation from `cfg` and frames the default planting
    /// area.
    ///
    /// ### Errors
    /// The [`ConfigError`] that prevented the simulation from starting.
    pub fn new(cfg: SimConfig) -> Result<Self, ConfigError> {
        let sim = Simulation::from_config(&cfg)?;
        let mut viewer = Self {
            cfg,
            sim,
            views: Vec::new(),
            visible: Vec::new(),
            running: false,
            zoom: 10.0,
            pan: egui::vec2(0.0, 50.0),
            show_leaves: true,
            last_frame_time: None,
            last_spawned: 0,
            status: None,
        };
        viewer.visible = vec![true; viewer.sim.groves().len()];
        viewer.refresh_views();
        Ok(viewer)
    }

    /// Rebuilds the simulation, replaying `seed` or drawing a fresh one when
    /// `None`. Camera and visibility settings are kept; the timer stops.
    fn restart(&mut self, seed: Option<u64>) {
        let mut cfg = self.cfg.clone();
        cfg.seed = seed;

        match Simulation::from_config(&cfg) {
            Ok(sim) => {
                self.sim = sim;
                self.status = None;
                self.refresh_views();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
        self.last_spawned = 0;
        self.last_frame_time = None;
        self.running = false;
    }

    /// Replays the current run from its seed.
    fn reset(&mut self) {
        self.restart(Some(self.sim.seed()));
    }

    /// Restarts with a fresh random seed.
    fn reseed(&mut self) {
        self.restart(None);
    }

    fn refresh_views(&mut self) {
        self.views = self.sim.groves().iter().map(|g| g.snapshot()).collect();
    }

    /// Records the outcome of zero or more ticks.
    ///
    /// A failed tick halts the simulation for good; the viewer stops running
    /// and shows the fault until reset.
    fn apply(&mut self, result: Result<Vec<TickReport>, SimError>) {
        match result {
            Ok(reports) if reports.is_empty() => {}
            Ok(reports) => {
                self.last_spawned = reports.iter().map(|r| r.spawned.len()).sum();
                self.refresh_views();
            }
            Err(e) => {
                self.running = false;
                self.status = Some(e.to_string());
                self.refresh_views();
            }
        }
    }

    /// Runs a single tick now, outside the timer.
    fn step_once(&mut self) {
        let result = self.sim.step();
        self.apply(result);
    }

    /// Feeds the time since the previous running frame to the timer.
    ///
    /// ### Parameters
    /// - `now` - Current egui time in seconds.
    fn advance(&mut self, now: f64) {
        if let Some(prev) = self.last_frame_time {
            let dt = (now - prev).max(0.0);
            let result = self.sim.advance(Duration::from_secs_f64(dt));
            self.apply(result);
        }
        self.last_frame_time = Some(now);
    }

    fn toggle_running(&mut self) {
        self.running = !self.running;
        // Paused time never counts towards the next tick.
        self.last_frame_time = None;
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    ///
    /// ### Parameters
    /// - `p` - World-space position projected onto the x/y plane.
    /// - `rect` - Screen-space rectangle representing the drawing area.
    ///
    /// ### Returns
    /// The corresponding egui position in screen-space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding), using the same `zoom`, `pan`, and `rect` center.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    fn project(p: Vec3) -> Vec2 {
        Vec2::new(p.x, p.y)
    }

    fn limb_color(c: Rgb) -> egui::Color32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgb(channel(c.x), channel(c.y), channel(c.z))
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let halted = self.sim.fault().is_some();
                let label = if self.running { "⏸ Pause" } else { "▶ Run" };
                if ui.add_enabled(!halted, egui::Button::new(label)).clicked() {
                    self.toggle_running();
                }

                if ui.add_enabled(!halted, egui::Button::new("Step")).clicked() {
                    self.step_once();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("New seed").clicked() {
                    self.reseed();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 1.0..=80.0).text("Zoom"));
                ui.checkbox(&mut self.show_leaves, "Leaves");
            });
        });
    }

    /// Builds the bottom status bar (seed, ticks, limb count, halt state).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "interval = {:.2} s",
                    self.sim.scheduler().interval().as_secs_f64()
                ));
                ui.label(format!("seed = {}", self.sim.seed()));
                ui.separator();
                ui.label(format!("spawned last = {}", self.last_spawned));
                ui.label(format!("limbs = {}", self.sim.limb_count()));
                ui.label(format!("ticks = {}", self.sim.ticks()));
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, status.as_str());
                }
            });
        });
    }

    /// Builds the right-hand panel listing every grove.
    fn ui_grove_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("grove_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Groves");
                ui.separator();

                for (i, grove) in self.sim.groves().iter().enumerate() {
                    let Some(visible) = self.visible.get_mut(i) else {
                        continue;
                    };
                    ui.checkbox(visible, grove.name());

                    let reg = grove.registry();
                    let leafy = reg.iter().filter(|l| l.has_leaves()).count();
                    ui.label(format!(
                        "limbs = {}  leafy = {}  frames = {}",
                        reg.len(),
                        leafy,
                        grove.images().len()
                    ));
                    if grove.cap_reached() {
                        ui.label("registry full");
                    }
                    ui.separator();
                }
            });
    }

    /// Builds the central panel where the groves are drawn and panned.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(1.0, 80.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            for (g, views) in self.views.iter().enumerate() {
                if !self.visible.get(g).copied().unwrap_or(true) {
                    continue;
                }
                let frames = self
                    .sim
                    .groves()
                    .get(g)
                    .map_or(1, |grove| grove.images().len().max(1));

                // Limbs.
                for v in views {
                    let a = self.world_to_screen(Self::project(v.base), rect);
                    let b = self.world_to_screen(Self::project(v.tip), rect);
                    let width = (v.radius * 2.0 * self.zoom).max(1.0);
                    painter.line_segment(
                        [a, b],
                        egui::Stroke::new(width, Self::limb_color(v.color)),
                    );
                }

                if !self.show_leaves {
                    continue;
                }

                // Leaves grow with their frame index.
                for v in views {
                    let Some(leaves) = v.leaves else {
                        continue;
                    };
                    let at = v.attachment.transform_point3(Vec3::ZERO);
                    let p = self.world_to_screen(Self::project(at), rect);
                    let growth = (leaves.front_frame + 1) as f32 / frames as f32;
                    let r = (leaves.screen_size * 0.5 * growth * self.zoom).max(1.5);
                    painter.circle_filled(
                        p,
                        r,
                        egui::Color32::from_rgba_unmultiplied(70, 170, 60, 140),
                    );
                }
            }

            if self.running {
                let now = ctx.input(|i| i.time);
                self.advance(now);
                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_grove_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
