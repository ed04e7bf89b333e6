use super::scene::{EntityId, Vec3};

/// How far a fading effect sinks below the play plane by the end of its life.
pub const EFFECT_SINK_DEPTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    TapIndicator,
    GroundFire,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSpec {
    pub kind: EffectKind,
    pub position: Vec3,
    pub duration_seconds: f32,
    pub fade_seconds: f32,
    pub radius: f32,
    /// Entity that caused the effect, recorded at spawn time.
    pub source: Option<EntityId>,
}

impl EffectSpec {
    pub fn tap_indicator(position: Vec3, duration_seconds: f32) -> Self {
        Self {
            kind: EffectKind::TapIndicator,
            position,
            duration_seconds,
            fade_seconds: 0.0,
            radius: 0.0,
            source: None,
        }
    }

    pub fn ground_fire(
        position: Vec3,
        duration_seconds: f32,
        fade_seconds: f32,
        radius: f32,
        source: Option<EntityId>,
    ) -> Self {
        Self {
            kind: EffectKind::GroundFire,
            position,
            duration_seconds,
            fade_seconds,
            radius,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub id: EffectId,
    pub kind: EffectKind,
    pub source: Option<EntityId>,
    origin: Vec3,
    position: Vec3,
    age_seconds: f32,
    duration_seconds: f32,
    fade_seconds: f32,
    radius: f32,
}

impl Effect {
    pub(crate) fn new(id: EffectId, spec: EffectSpec) -> Self {
        Self {
            id,
            kind: spec.kind,
            source: spec.source,
            origin: spec.position,
            position: spec.position,
            age_seconds: 0.0,
            duration_seconds: spec.duration_seconds.max(0.0),
            fade_seconds: spec.fade_seconds.clamp(0.0, spec.duration_seconds.max(0.0)),
            radius: spec.radius.max(0.0),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn age_seconds(&self) -> f32 {
        self.age_seconds
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn duration_seconds(&self) -> f32 {
        self.duration_seconds
    }

    pub fn contains_planar(&self, point: Vec3) -> bool {
        self.position.planar_distance(point) <= self.radius
    }

    /// Ages the effect; returns `false` once it has outlived its duration.
    pub(crate) fn advance(&mut self, dt_seconds: f32) -> bool {
        self.age_seconds += dt_seconds.max(0.0);
        if self.duration_seconds <= 0.0 {
            return false;
        }
        let u = self.age_seconds / self.duration_seconds;
        if self.fade_seconds > 0.0 {
            let fade_start = 1.0 - self.fade_seconds / self.duration_seconds;
            if u > fade_start {
                let span = (1.0 - fade_start).max(f32::EPSILON);
                let sink = ((u - fade_start) / span).min(1.0);
                self.position = self.origin.with_z(self.origin.z + sink * EFFECT_SINK_DEPTH);
            }
        }
        u <= 1.0
    }
}
