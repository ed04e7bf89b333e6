#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PointerPhase {
    #[default]
    Idle,
    Pressed,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum InteractionCommand {
    WalkTo(Vec3),
    ShowTap(Vec3),
    StopWalking,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct InteractionSettings {
    pub(crate) tap_seconds: f32,
    pub(crate) drag_distance_px: f32,
    pub(crate) active_screen_width: f32,
}

/// Turns pointer presses into taps (walk there once) and drags (keep walking
/// toward the pointer until release).
#[derive(Debug, Clone)]
pub(crate) struct PointerInteraction {
    phase: PointerPhase,
    history: PointerHistory,
    settings: InteractionSettings,
}

impl PointerInteraction {
    pub(crate) fn new(settings: InteractionSettings) -> Self {
        Self {
            phase: PointerPhase::Idle,
            history: PointerHistory::default(),
            settings,
        }
    }

    pub(crate) fn phase(&self) -> PointerPhase {
        self.phase
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &PointerHistory {
        &self.history
    }

    pub(crate) fn reset(&mut self) {
        self.phase = PointerPhase::Idle;
        self.history.clear();
    }

    /// Runs the idle, pressed and dragging blocks in that order, each seeing
    /// the phase the previous block left behind. A press and release in the
    /// same frame therefore taps, and a press that becomes a drag continues
    /// the drag in the same frame.
    pub(crate) fn update(
        &mut self,
        input: &InputSnapshot,
        sample: Option<PointerSample>,
        now_seconds: f32,
    ) -> Vec<InteractionCommand> {
        let mut commands = Vec::new();

        if self.phase == PointerPhase::Idle && input.pointer_pressed() {
            if let Some(sample) = sample.filter(|sample| self.in_active_area(input, sample)) {
                self.history.clear();
                self.history.record(sample);
                if sample.is_hit() {
                    debug!(hit = ?sample.hit, "press_acknowledged");
                    self.phase = PointerPhase::Pressed;
                }
            }
        }

        if self.phase == PointerPhase::Pressed {
            if let Some(sample) = sample {
                self.history.record(sample);
            }
            if input.pointer_released() {
                if let Some(last) = self.history.last() {
                    commands.push(InteractionCommand::WalkTo(last.world));
                    commands.push(InteractionCommand::ShowTap(last.world));
                    debug!(x = last.world.x, y = last.world.y, "pointer_tap");
                }
                self.phase = PointerPhase::Idle;
            } else if self.is_drag(now_seconds) {
                debug!(samples = self.history.len(), "pointer_drag_started");
                self.phase = PointerPhase::Dragging;
            }
        }

        if self.phase == PointerPhase::Dragging {
            if let Some(sample) = sample {
                self.history.record(sample);
            }
            if input.pointer_released() {
                commands.push(InteractionCommand::StopWalking);
                debug!(samples = self.history.len(), "pointer_drag_released");
                self.phase = PointerPhase::Idle;
            } else if let Some(last) = self.history.last() {
                commands.push(InteractionCommand::WalkTo(last.world));
            }
        }

        commands
    }

    fn in_active_area(&self, input: &InputSnapshot, sample: &PointerSample) -> bool {
        let (width, _) = input.window_size();
        if width == 0 {
            return true;
        }
        sample.screen.x / (width as f32) < self.settings.active_screen_width
    }

    fn is_drag(&self, now_seconds: f32) -> bool {
        let (Some(first), Some(last)) = (self.history.first(), self.history.last()) else {
            return false;
        };
        now_seconds - first.time_seconds > self.settings.tap_seconds
            && last.screen.distance(first.screen) >= self.settings.drag_distance_px
    }
}
