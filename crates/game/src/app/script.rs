use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{FrameInput, FrameSource, PointerCollector, SceneWorld, Vec2, Vec3};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::gameplay::GameplayScene;

pub(crate) const INPUT_SCRIPT_ENV_VAR: &str = "MAGE_INPUT_SCRIPT";
const DEFAULT_FRAME_MS: u64 = 20;
const IDLE_SCRIPT_FRAMES: u32 = 100;

#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    #[error("failed to read input script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse input script {path} at {json_path}: {message}")]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct InputScript {
    pub(crate) frames: Vec<ScriptFrame>,
}

/// One scripted frame. Commands run before the frame is simulated; `repeat`
/// replays the same pointer state for that many frames but runs the
/// commands only once.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScriptFrame {
    pub(crate) dt_ms: u64,
    pub(crate) repeat: u32,
    /// Cursor position in window pixels.
    pub(crate) cursor: Option<Vec2>,
    pub(crate) press: bool,
    pub(crate) release: bool,
    /// Casts ground fire at this world position, sourced from the player.
    pub(crate) cast_fire: Option<Vec2>,
    pub(crate) damage: Option<DamageCommand>,
    pub(crate) build_room: Option<String>,
    pub(crate) quit: bool,
}

impl Default for ScriptFrame {
    fn default() -> Self {
        Self {
            dt_ms: DEFAULT_FRAME_MS,
            repeat: 1,
            cursor: None,
            press: false,
            release: false,
            cast_fire: None,
            damage: None,
            build_room: None,
            quit: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DamageCommand {
    /// Index into the scene's enemies in spawn order.
    pub(crate) enemy: usize,
    pub(crate) amount: f32,
    #[serde(default)]
    pub(crate) over_time: bool,
}

impl InputScript {
    /// Two simulated seconds with no input.
    pub(crate) fn idle() -> Self {
        Self {
            frames: vec![ScriptFrame {
                repeat: IDLE_SCRIPT_FRAMES,
                ..ScriptFrame::default()
            }],
        }
    }
}

pub(crate) fn load_input_script(path: &Path) -> Result<InputScript, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let script = parse_input_script(path, &raw)?;
    info!(
        path = %path.display(),
        frame_entries = script.frames.len(),
        "input_script_loaded"
    );
    Ok(script)
}

pub(crate) fn parse_input_script(path: &Path, raw: &str) -> Result<InputScript, ScriptError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, InputScript>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        ScriptError::Parse {
            path: path.to_path_buf(),
            json_path,
            message: error.into_inner().to_string(),
        }
    })
}

/// Feeds an [`InputScript`] to the headless loop through a
/// [`PointerCollector`], so scripted presses get the same edge handling as
/// live input would.
pub(crate) struct ScriptedFrames {
    frames: Vec<ScriptFrame>,
    next_index: usize,
    remaining_repeats: u32,
    collector: PointerCollector,
}

impl ScriptedFrames {
    pub(crate) fn new(script: InputScript, window_width: u32, window_height: u32) -> Self {
        Self {
            frames: script.frames,
            next_index: 0,
            remaining_repeats: 0,
            collector: PointerCollector::new(window_width, window_height),
        }
    }

    fn run_commands(frame: &ScriptFrame, scene: &mut GameplayScene, world: &mut SceneWorld) {
        if let Some(room_id) = frame.build_room.as_deref() {
            // A failed build leaves the old room in place.
            if let Err(error) = scene.build_room(world, room_id) {
                debug!(room = room_id, error = %error, "scripted_build_room_failed");
            }
        }
        if let Some(at) = frame.cast_fire {
            let source = scene.player_id();
            scene.cast_ground_fire(world, Vec3::new(at.x, at.y, 0.0), source);
        }
        if let Some(damage) = frame.damage {
            match scene.enemy_ids().get(damage.enemy).copied() {
                Some(id) => {
                    let outcome = scene.damage_enemy(world, id, damage.amount, damage.over_time);
                    debug!(enemy = id.0, outcome = ?outcome, "scripted_damage");
                }
                None => warn!(enemy_index = damage.enemy, "scripted_damage_no_enemy"),
            }
        }
    }
}

impl FrameSource<GameplayScene> for ScriptedFrames {
    fn next_frame(
        &mut self,
        scene: &mut GameplayScene,
        world: &mut SceneWorld,
    ) -> Option<FrameInput> {
        if self.remaining_repeats > 0 {
            self.remaining_repeats -= 1;
            let dt = self.frames.get(self.next_index.checked_sub(1)?)?.dt_ms;
            return Some(FrameInput {
                dt: Duration::from_millis(dt),
                input: self.collector.snapshot_for_frame(),
            });
        }

        let frame = self.frames.get(self.next_index)?.clone();
        self.next_index += 1;
        self.remaining_repeats = frame.repeat.saturating_sub(1);

        Self::run_commands(&frame, scene, world);

        if let Some(cursor) = frame.cursor {
            self.collector.set_cursor_position_px(cursor.x, cursor.y);
        }
        if frame.press {
            self.collector.handle_button(true);
        }
        if frame.release {
            self.collector.handle_button(false);
        }
        if frame.quit {
            self.collector.mark_quit_requested();
        }

        Some(FrameInput {
            dt: Duration::from_millis(frame.dt_ms),
            input: self.collector.snapshot_for_frame(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<InputScript, ScriptError> {
        parse_input_script(Path::new("script.json"), raw)
    }

    #[test]
    fn frames_default_missing_fields() {
        let script = parse(r#"{ "frames": [ {}, { "dt_ms": 40, "press": true } ] }"#)
            .expect("parse");
        assert_eq!(script.frames[0], ScriptFrame::default());
        assert_eq!(script.frames[1].dt_ms, 40);
        assert!(script.frames[1].press);
        assert_eq!(script.frames[1].repeat, 1);
    }

    #[test]
    fn parse_error_reports_json_path() {
        let error = parse(r#"{ "frames": [ {}, { "damage": { "enemy": 0, "amount": "lots" } } ] }"#)
            .expect_err("type error");
        match error {
            ScriptError::Parse { json_path, .. } => {
                assert_eq!(json_path, "frames[1].damage.amount");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn idle_script_covers_two_seconds() {
        let script = InputScript::idle();
        let total_ms: u64 = script
            .frames
            .iter()
            .map(|frame| frame.dt_ms * u64::from(frame.repeat))
            .sum();
        assert_eq!(total_ms, 2000);
    }

    #[test]
    fn missing_script_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            load_input_script(&dir.path().join("missing.json")),
            Err(ScriptError::Read { .. })
        ));
    }

    #[test]
    fn loads_script_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("script.json");
        fs::write(&path, r#"{ "frames": [ { "quit": true } ] }"#).expect("write");
        let script = load_input_script(&path).expect("load");
        assert!(script.frames[0].quit);
    }
}
