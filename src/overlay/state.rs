//! Overlay widget state, independent of the windowing layer
//!
//! The egui app feeds input and time into [`WidgetState`] and renders what it
//! exposes; everything here runs on the UI thread.

use anyhow::{Result, bail};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::drag::DragState;
use super::layout::{self, LayoutParams};
use super::timer::RefreshTimer;
use crate::common::color::text_color32;
use crate::common::format::{cpu_label, memory_label};
use crate::common::types::{Dimensions, Position};
use crate::config::{Corner, SettingsStore, WidgetConfig};
use crate::constants::overlay::{CPU_PLACEHOLDER, MEM_PLACEHOLDER};
use crate::stats::StatsSampler;
use crate::x11::ScreenSource;

/// A setting adjusted directly on the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingChange {
    Corner(Corner),
    Width(u32),
    Margin(u32),
    LabelHeight(u32),
    LabelPadding(u32),
    TextColor(String),
    IntervalMs(u32),
}

pub struct WidgetState {
    store: SettingsStore,
    defaults: WidgetConfig,
    config: WidgetConfig,
    screen: Box<dyn ScreenSource>,
    sampler: Box<dyn StatsSampler>,
    timer: RefreshTimer,
    drag: DragState,
    /// Corner the labels are aligned to; top-left when the screen query failed
    placed_corner: Corner,
    position: Position,
    size: Dimensions,
    label_widths: [u32; 2],
    mem_text: String,
    cpu_text: String,
    text_color: egui::Color32,
    visible: bool,
}

impl WidgetState {
    /// Load settings, place the widget and take the first sample
    pub fn new(
        store: SettingsStore,
        defaults: WidgetConfig,
        screen: Box<dyn ScreenSource>,
        sampler: Box<dyn StatsSampler>,
        now: Instant,
    ) -> Self {
        let config = WidgetConfig::load(&store, &defaults);
        info!(?config, "Loaded widget settings");

        let timer = RefreshTimer::start(interval_of(&config), now);
        let text_color = text_color32(&config.text_color);
        let size = layout::widget_size(config.widget_width, config.label_height);

        let mut state = Self {
            store,
            defaults,
            config,
            screen,
            sampler,
            timer,
            drag: DragState::default(),
            placed_corner: Corner::TopLeft,
            position: Position::default(),
            size,
            label_widths: [0, 0],
            mem_text: MEM_PLACEHOLDER.to_string(),
            cpu_text: CPU_PLACEHOLDER.to_string(),
            text_color,
            visible: true,
        };
        state.reposition();
        state.refresh();
        state
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Settings file shared with the editor process
    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Dimensions {
        self.size
    }

    pub fn text_color(&self) -> egui::Color32 {
        self.text_color
    }

    /// Memory label then CPU label, top to bottom
    pub fn labels(&self) -> [&str; 2] {
        [&self.mem_text, &self.cpu_text]
    }

    pub fn interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    fn layout_params(&self) -> LayoutParams {
        LayoutParams::from_config(&self.config, self.label_widths)
    }

    /// Record measured label widths (text width plus padding on both sides)
    pub fn set_label_widths(&mut self, widths: [u32; 2]) {
        self.label_widths = widths;
    }

    /// Current label offsets inside the widget
    pub fn label_offsets(&self) -> [Position; 2] {
        layout::label_offsets(&LayoutParams {
            corner: self.placed_corner,
            ..self.layout_params()
        })
    }

    /// Recompute position and size from the configured corner.
    ///
    /// Discards any position reached by dragging.
    pub fn reposition(&mut self) {
        let screen = self.screen.available_geometry();
        self.placed_corner = if screen.is_ok() {
            self.config.corner
        } else {
            Corner::TopLeft
        };
        let geometry = layout::layout_or_fallback(screen, &self.layout_params());
        debug!(
            position = ?geometry.position,
            size = ?geometry.size,
            corner = %self.config.corner,
            "Positioned widget"
        );
        self.position = geometry.position;
        self.size = geometry.size;
    }

    /// Sample and update the labels. On failure the previous text is kept.
    pub fn refresh(&mut self) -> bool {
        match self.sampler.sample() {
            Ok(sample) => {
                self.mem_text = memory_label(
                    sample.mem_percent,
                    sample.mem_used_bytes,
                    sample.mem_total_bytes,
                );
                self.cpu_text = cpu_label(sample.cpu_percent);
                true
            }
            Err(err) => {
                warn!(error = ?err, "Error updating stats, keeping previous values");
                false
            }
        }
    }

    /// Refresh if the timer is due. Returns whether a tick ran.
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        if self.timer.poll(now) {
            self.refresh();
            true
        } else {
            false
        }
    }

    pub fn time_until_tick(&self, now: Instant) -> Duration {
        self.timer.remaining(now)
    }

    /// Apply a setting changed on the widget itself: persist it right away
    /// and recompute whatever it affects.
    pub fn apply_change(&mut self, change: SettingChange, now: Instant) -> Result<()> {
        match &change {
            SettingChange::Width(0) => bail!("Widget width must be greater than zero"),
            SettingChange::LabelHeight(0) => bail!("Label height must be greater than zero"),
            SettingChange::IntervalMs(0) => bail!("Update interval must be greater than zero"),
            _ => {}
        }
        info!(?change, "Widget setting changed");

        let mut relayout = false;
        match change {
            SettingChange::Corner(corner) => {
                self.config.corner = corner;
                relayout = true;
            }
            SettingChange::Width(width) => {
                self.config.widget_width = width;
                relayout = true;
            }
            SettingChange::Margin(margin) => {
                self.config.corner_margin = margin;
                relayout = true;
            }
            SettingChange::LabelHeight(height) => {
                self.config.label_height = height;
                relayout = true;
            }
            SettingChange::LabelPadding(padding) => {
                self.config.label_padding = padding;
                relayout = true;
            }
            SettingChange::TextColor(color) => {
                self.text_color = text_color32(&color);
                self.config.text_color = color;
            }
            SettingChange::IntervalMs(interval) => {
                self.config.update_interval_ms = interval;
                self.timer.restart(interval_of(&self.config), now);
            }
        }
        if relayout {
            self.reposition();
        }

        self.config.write_to(&mut self.store)?;
        self.store.sync()
    }

    /// Re-read every setting from the store (after the editor committed or
    /// on SIGHUP), then reposition, recolor and restart the timer.
    pub fn reload_settings(&mut self, now: Instant) {
        if let Err(err) = self.store.reload() {
            warn!(error = ?err, "Failed to reload settings, keeping current values");
            return;
        }
        let config = WidgetConfig::load(&self.store, &self.defaults);
        if config != self.config {
            info!(?config, "Settings changed");
        }
        self.config = config;
        self.timer.restart(interval_of(&self.config), now);
        self.text_color = text_color32(&self.config.text_color);
        self.reposition();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn drag_press(&mut self, cursor: Position) {
        self.drag.press(cursor);
    }

    pub fn drag_motion(&mut self, cursor: Position) {
        if let Some(position) = self.drag.motion(cursor, self.position) {
            self.position = position;
        }
    }

    pub fn drag_release(&mut self) {
        self.drag.release();
    }
}

fn interval_of(config: &WidgetConfig) -> Duration {
    Duration::from_millis(config.update_interval_ms.max(1) as u64)
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::{Result, anyhow};
    use std::collections::VecDeque;

    use crate::common::types::ScreenGeometry;
    use crate::stats::{StatsSample, StatsSampler};
    use crate::x11::ScreenSource;

    pub struct FixedScreen(pub ScreenGeometry);

    impl ScreenSource for FixedScreen {
        fn available_geometry(&self) -> Result<ScreenGeometry> {
            Ok(self.0)
        }
    }

    pub struct NoScreen;

    impl ScreenSource for NoScreen {
        fn available_geometry(&self) -> Result<ScreenGeometry> {
            Err(anyhow!("cannot open display"))
        }
    }

    /// Replays queued results, then keeps failing
    #[derive(Default)]
    pub struct ScriptedSampler(pub VecDeque<Result<StatsSample>>);

    impl ScriptedSampler {
        pub fn with(results: Vec<Result<StatsSample>>) -> Self {
            Self(results.into())
        }
    }

    impl StatsSampler for ScriptedSampler {
        fn sample(&mut self) -> Result<StatsSample> {
            self.0
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no more samples")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::common::types::ScreenGeometry;
    use crate::stats::StatsSample;
    use anyhow::anyhow;
    use std::fs;
    use std::path::PathBuf;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn screen() -> ScreenGeometry {
        ScreenGeometry::from_origin_size(0, 0, 1920, 1080)
    }

    fn sample(cpu: f32) -> Result<StatsSample> {
        Ok(StatsSample::new(cpu, 4 * GIB, 12 * GIB, 16 * GIB))
    }

    fn settings_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("SystemMonitorWidget.json")
    }

    fn widget(dir: &tempfile::TempDir, samples: Vec<Result<StatsSample>>, now: Instant) -> WidgetState {
        WidgetState::new(
            SettingsStore::open(settings_path(dir)).unwrap(),
            WidgetConfig::default(),
            Box::new(FixedScreen(screen())),
            Box::new(ScriptedSampler::with(samples)),
            now,
        )
    }

    #[test]
    fn test_startup_places_widget_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let state = widget(&dir, vec![sample(12.5)], Instant::now());

        assert_eq!(state.position(), Position::new(10, 10));
        assert_eq!(state.size(), Dimensions::new(250, 50));
        assert_eq!(
            state.labels(),
            ["MEM: 25.0% (4.0 GB / 16.0 GB)", "CPU: 12.5%"]
        );
        assert_eq!(state.text_color(), egui::Color32::WHITE);
        assert!(state.is_visible());
    }

    #[test]
    fn test_failed_first_sample_keeps_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let state = widget(&dir, vec![Err(anyhow!("boom"))], Instant::now());
        assert_eq!(state.labels(), [MEM_PLACEHOLDER, CPU_PLACEHOLDER]);
    }

    #[test]
    fn test_sampling_failure_keeps_last_values() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut state = widget(&dir, vec![sample(30.0), Err(anyhow!("proc gone"))], start);
        let before: Vec<String> = state.labels().iter().map(|s| s.to_string()).collect();

        assert!(state.poll_timer(start + Duration::from_millis(2000)));
        assert_eq!(state.labels().to_vec(), before);
    }

    #[test]
    fn test_timer_drives_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut state = widget(&dir, vec![sample(1.0), sample(2.0)], start);

        assert!(!state.poll_timer(start + Duration::from_millis(1000)));
        assert_eq!(state.labels()[1], "CPU: 1.0%");
        assert!(state.poll_timer(start + Duration::from_millis(2000)));
        assert_eq!(state.labels()[1], "CPU: 2.0%");
    }

    #[test]
    fn test_interval_change_restarts_timer_and_keeps_labels() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut state = widget(&dir, vec![sample(7.0), sample(8.0)], start);
        let labels: Vec<String> = state.labels().iter().map(|s| s.to_string()).collect();

        let now = start + Duration::from_millis(1500);
        state
            .apply_change(SettingChange::IntervalMs(500), now)
            .unwrap();

        assert_eq!(state.interval(), Duration::from_millis(500));
        assert_eq!(state.time_until_tick(now), Duration::from_millis(500));
        assert_eq!(state.labels().to_vec(), labels);

        assert!(!state.poll_timer(now + Duration::from_millis(499)));
        assert!(state.poll_timer(now + Duration::from_millis(500)));
        assert_eq!(state.labels()[1], "CPU: 8.0%");

        // persisted immediately
        let store = SettingsStore::open(settings_path(&dir)).unwrap();
        assert_eq!(store.get_or("update_interval_ms", 0u32), 500);
    }

    #[test]
    fn test_drag_moves_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![sample(1.0)], Instant::now());
        state
            .apply_change(SettingChange::Margin(10), Instant::now())
            .unwrap();
        let persisted = fs::read_to_string(settings_path(&dir)).unwrap();
        let origin = state.position();

        state.drag_press(Position::new(100, 100));
        assert!(state.is_dragging());
        state.drag_motion(Position::new(150, 130));
        state.drag_release();

        assert!(!state.is_dragging());
        assert_eq!(state.position(), Position::new(origin.x + 50, origin.y + 30));
        assert_eq!(fs::read_to_string(settings_path(&dir)).unwrap(), persisted);
        assert_eq!(state.config().corner_margin, 10);

        // motion after release is ignored
        state.drag_motion(Position::new(500, 500));
        assert_eq!(state.position(), Position::new(origin.x + 50, origin.y + 30));
    }

    #[test]
    fn test_reposition_discards_drag_offset() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![sample(1.0)], Instant::now());
        state.drag_press(Position::new(0, 0));
        state.drag_motion(Position::new(300, 300));
        state.drag_release();

        state.reposition();
        assert_eq!(state.position(), Position::new(10, 10));
    }

    #[test]
    fn test_corner_change_persists_and_repositions() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![sample(1.0)], Instant::now());

        state
            .apply_change(SettingChange::Corner(Corner::TopRight), Instant::now())
            .unwrap();
        assert_eq!(state.position(), Position::new(1920 - 250 - 10, 10));

        let store = SettingsStore::open(settings_path(&dir)).unwrap();
        assert_eq!(store.get_or("corner", String::new()), "top-right");
    }

    #[test]
    fn test_geometry_changes_resize() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![sample(1.0)], Instant::now());

        state.apply_change(SettingChange::Width(300), Instant::now()).unwrap();
        state
            .apply_change(SettingChange::LabelHeight(30), Instant::now())
            .unwrap();
        assert_eq!(state.size(), Dimensions::new(300, 70));

        state.set_label_widths([120, 60]);
        state
            .apply_change(SettingChange::Corner(Corner::TopRight), Instant::now())
            .unwrap();
        assert_eq!(
            state.label_offsets(),
            [Position::new(300 - 120 - 10, 5), Position::new(300 - 60 - 10, 35)]
        );
    }

    #[test]
    fn test_margin_and_padding_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![sample(1.0)], Instant::now());

        state.apply_change(SettingChange::Margin(24), Instant::now()).unwrap();
        assert_eq!(state.position(), Position::new(24, 24));
        state
            .apply_change(SettingChange::LabelPadding(0), Instant::now())
            .unwrap();
        assert_eq!(state.config().label_padding, 0);

        let store = SettingsStore::open(settings_path(&dir)).unwrap();
        assert_eq!(store.get_or("corner_margin", 0u32), 24);
        assert_eq!(store.get_or("label_padding", 99u32), 0);
    }

    #[test]
    fn test_zero_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![sample(1.0)], Instant::now());

        assert!(state.apply_change(SettingChange::Width(0), Instant::now()).is_err());
        assert!(state.apply_change(SettingChange::IntervalMs(0), Instant::now()).is_err());
        assert!(
            state
                .apply_change(SettingChange::LabelHeight(0), Instant::now())
                .is_err()
        );
        assert_eq!(state.config(), &WidgetConfig::default());
        assert!(!settings_path(&dir).exists());
    }

    #[test]
    fn test_text_color_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![sample(1.0)], Instant::now());
        state
            .apply_change(SettingChange::TextColor("#ff0000".into()), Instant::now())
            .unwrap();
        assert_eq!(state.text_color(), egui::Color32::from_rgb(255, 0, 0));
        assert_eq!(state.config().text_color, "#ff0000");
    }

    #[test]
    fn test_reload_after_external_commit_repositions() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut state = widget(&dir, vec![sample(1.0)], start);
        assert_eq!(state.position(), Position::new(10, 10));

        // another process (the editor) writes everything and syncs
        let mut editor_store = SettingsStore::open(settings_path(&dir)).unwrap();
        let edited = WidgetConfig {
            corner: Corner::TopRight,
            update_interval_ms: 1000,
            text_color: "yellow".into(),
            ..WidgetConfig::default()
        };
        edited.write_to(&mut editor_store).unwrap();
        editor_store.sync().unwrap();

        // not visible until the widget reloads
        assert_eq!(state.config().corner, Corner::TopLeft);

        let now = start + Duration::from_millis(300);
        state.reload_settings(now);
        assert_eq!(state.config(), &edited);
        assert_eq!(state.position(), Position::new(1920 - 250 - 10, 10));
        assert_eq!(state.interval(), Duration::from_millis(1000));
        assert_eq!(state.time_until_tick(now), Duration::from_millis(1000));
        assert_eq!(state.text_color(), egui::Color32::from_rgb(255, 255, 0));
    }

    #[test]
    fn test_unreadable_store_on_reload_keeps_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![sample(1.0)], Instant::now());
        fs::write(settings_path(&dir), "{ not json").unwrap();

        state.reload_settings(Instant::now());
        assert_eq!(state.config(), &WidgetConfig::default());
    }

    #[test]
    fn test_screen_failure_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let state = WidgetState::new(
            SettingsStore::open(settings_path(&dir)).unwrap(),
            WidgetConfig::default(),
            Box::new(NoScreen),
            Box::new(ScriptedSampler::default()),
            Instant::now(),
        );
        assert_eq!(state.position(), Position::new(50, 50));
    }

    #[test]
    fn test_fallback_aligns_labels_left() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(settings_path(&dir)).unwrap();
        store.set("corner", "top-right").unwrap();
        store.sync().unwrap();

        let mut state = WidgetState::new(
            SettingsStore::open(settings_path(&dir)).unwrap(),
            WidgetConfig::default(),
            Box::new(NoScreen),
            Box::new(ScriptedSampler::default()),
            Instant::now(),
        );
        state.set_label_widths([100, 100]);
        assert_eq!(state.config().corner, Corner::TopRight);
        assert_eq!(state.label_offsets()[0], Position::new(10, 5));
    }

    #[test]
    fn test_visibility_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = widget(&dir, vec![], Instant::now());
        state.toggle_visible();
        assert!(!state.is_visible());
        state.toggle_visible();
        assert!(state.is_visible());
        state.set_visible(false);
        assert!(!state.is_visible());
    }
}
