mod camera;
mod effects;
mod input;
mod loop_runner;
mod metrics;
mod physics;
mod scene;

pub use camera::{Camera2D, Viewport, CAMERA_EYE_DEPTH, PIXELS_PER_WORLD};
pub use effects::{Effect, EffectId, EffectKind, EffectSpec, EFFECT_SINK_DEPTH};
pub use input::{PointerCollector, PointerHistory, PointerHit, PointerRay, PointerSample};
pub use loop_runner::{
    run_headless, run_headless_in, FrameInput, FrameSource, LoopConfig, LoopSummary,
};
pub use metrics::LoopMetricsSnapshot;
pub use physics::{Collision, CollisionTarget, PhysicsWorld, RigidBody};
pub use scene::{
    EntityId, EntityIdAllocator, HasTransform, InputSnapshot, NodeTemplate, Scene, SceneCommand,
    SceneNode, SceneWorld, Transform, Vec2, Vec3,
};
