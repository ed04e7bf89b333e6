use super::scene::{EntityId, InputSnapshot, Vec2, Vec3};

/// Accumulates raw pointer events between frames and hands out
/// edge-triggered snapshots.
#[derive(Debug, Default)]
pub struct PointerCollector {
    quit_requested: bool,
    button_is_down: bool,
    pressed_edge: bool,
    released_edge: bool,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl PointerCollector {
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    pub fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2 { x, y });
    }

    pub fn handle_button(&mut self, is_down: bool) {
        if is_down {
            if !self.button_is_down {
                self.pressed_edge = true;
            }
            self.button_is_down = true;
        } else {
            if self.button_is_down {
                self.released_edge = true;
            }
            self.button_is_down = false;
        }
    }

    pub fn button_is_down(&self) -> bool {
        self.button_is_down
    }

    pub fn snapshot_for_frame(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.pressed_edge,
            self.released_edge,
            self.cursor_position_px,
            self.window_width,
            self.window_height,
        );
        self.pressed_edge = false;
        self.released_edge = false;
        snapshot
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerHit {
    Tile { grid_x: usize, grid_y: usize },
    Body(EntityId),
}

/// One frame's view of the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Location on the play plane, `z == 0`.
    pub world: Vec3,
    pub screen: Vec2,
    pub ray: PointerRay,
    pub time_seconds: f32,
    pub hit: Option<PointerHit>,
}

impl PointerSample {
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }
}

/// Samples for the gesture in progress, oldest first.
#[derive(Debug, Clone, Default)]
pub struct PointerHistory {
    samples: Vec<PointerSample>,
}

impl PointerHistory {
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Appends `sample` unless the latest sample carries the same timestamp.
    pub fn record(&mut self, sample: PointerSample) -> bool {
        if let Some(last) = self.samples.last() {
            if last.time_seconds == sample.time_seconds {
                return false;
            }
        }
        self.samples.push(sample);
        true
    }

    pub fn first(&self) -> Option<&PointerSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&PointerSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(time_seconds: f32) -> PointerSample {
        PointerSample {
            world: Vec3::ZERO,
            screen: Vec2::default(),
            ray: PointerRay {
                origin: Vec3::new(0.0, 0.0, -10.0),
                direction: Vec3::new(0.0, 0.0, 1.0),
            },
            time_seconds,
            hit: None,
        }
    }

    #[test]
    fn press_is_edge_triggered_for_single_frame() {
        let mut input = PointerCollector::new(800, 600);
        input.handle_button(true);

        let first = input.snapshot_for_frame();
        let second = input.snapshot_for_frame();

        assert!(first.pointer_pressed());
        assert!(!second.pointer_pressed());
        assert!(input.button_is_down());
    }

    #[test]
    fn repeated_down_events_do_not_retrigger() {
        let mut input = PointerCollector::default();
        input.handle_button(true);
        let _ = input.snapshot_for_frame();
        input.handle_button(true);
        assert!(!input.snapshot_for_frame().pointer_pressed());
    }

    #[test]
    fn press_and_release_within_one_frame_report_both_edges() {
        let mut input = PointerCollector::default();
        input.handle_button(true);
        input.handle_button(false);
        let snapshot = input.snapshot_for_frame();
        assert!(snapshot.pointer_pressed());
        assert!(snapshot.pointer_released());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut input = PointerCollector::default();
        input.handle_button(false);
        assert!(!input.snapshot_for_frame().pointer_released());
    }

    #[test]
    fn history_skips_samples_with_duplicate_timestamp() {
        let mut history = PointerHistory::default();
        assert!(history.record(sample_at(1.0)));
        assert!(!history.record(sample_at(1.0)));
        assert!(history.record(sample_at(1.02)));
        assert_eq!(history.len(), 2);

        history.clear();
        assert!(history.is_empty());
        assert!(history.last().is_none());
    }
}
