use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::camera::Camera2D;
use super::effects::{Effect, EffectId, EffectSpec};
use crate::content::TextureHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    pointer_pressed: bool,
    pointer_released: bool,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        pointer_pressed: bool,
        pointer_released: bool,
        cursor_position_px: Option<Vec2>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            pointer_pressed,
            pointer_released,
            cursor_position_px,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// The primary pointer button went down at least once this frame.
    pub fn pointer_pressed(&self) -> bool {
        self.pointer_pressed
    }

    /// The primary pointer button went up at least once this frame.
    pub fn pointer_released(&self) -> bool {
        self.pointer_released
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_pointer_pressed(mut self, pointer_pressed: bool) -> Self {
        self.pointer_pressed = pointer_pressed;
        self
    }

    pub fn with_pointer_released(mut self, pointer_released: bool) -> Self {
        self.pointer_released = pointer_released;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Gameplay-plane position. `z` is depth: zero for everything that walks,
/// non-zero only for rendered tile offsets and sinking effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn with_z(self, z: f32) -> Self {
        Self { z, ..self }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Vec3::ZERO;
        }
        self * len.recip()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (other - self).length()
    }

    pub fn planar_distance(self, other: Vec3) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about the vertical axis, in degrees.
    pub orientation_degrees: f32,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation_degrees: 0.0,
        }
    }
}

/// Shared position/orientation capability for anything that lives on the
/// gameplay plane.
pub trait HasTransform {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn orientation_degrees(&self) -> f32;
    fn set_orientation_degrees(&mut self, degrees: f32);
}

impl HasTransform for Transform {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn orientation_degrees(&self) -> f32 {
        self.orientation_degrees
    }

    fn set_orientation_degrees(&mut self, degrees: f32) {
        self.orientation_degrees = degrees;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTemplate {
    pub debug_name: &'static str,
    pub texture: Option<TextureHandle>,
}

impl NodeTemplate {
    pub const fn untextured(debug_name: &'static str) -> Self {
        Self {
            debug_name,
            texture: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: EntityId,
    pub transform: Transform,
    pub template: NodeTemplate,
    applied_spawn_order: u64,
}

impl SceneNode {
    pub fn applied_spawn_order(&self) -> u64 {
        self.applied_spawn_order
    }
}

impl HasTransform for SceneNode {
    fn position(&self) -> Vec3 {
        self.transform.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    fn orientation_degrees(&self) -> f32 {
        self.transform.orientation_degrees
    }

    fn set_orientation_degrees(&mut self, degrees: f32) {
        self.transform.orientation_degrees = degrees;
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// In-memory scene-node store. Spawns and despawns are deferred until
/// `apply_pending`, so a tick never observes half-applied structural changes.
#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    nodes: Vec<SceneNode>,
    pending_spawns: Vec<SceneNode>,
    pending_despawns: Vec<EntityId>,
    next_applied_spawn_order: u64,
    camera: Camera2D,
    effects: Vec<Effect>,
    next_effect_id: u64,
}

impl SceneWorld {
    pub fn spawn(&mut self, template: NodeTemplate, transform: Transform) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(SceneNode {
            id,
            transform,
            template,
            applied_spawn_order: 0,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.nodes.iter().any(|node| node.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|node| node.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_spawns.is_empty() {
            for mut node in self.pending_spawns.drain(..) {
                node.applied_spawn_order = self.next_applied_spawn_order;
                self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
                self.nodes.push(node);
            }
        }

        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort();
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.nodes
                .retain(|node| pending.binary_search(&node.id).is_err());
            self.pending_despawns.clear();
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.next_applied_spawn_order = 0;
        self.camera = Camera2D::default();
        self.effects.clear();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn find_node(&self, id: EntityId) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Looks through applied and still-pending nodes.
    fn any_node_mut(&mut self, id: EntityId) -> Option<&mut SceneNode> {
        self.nodes
            .iter_mut()
            .chain(self.pending_spawns.iter_mut())
            .find(|node| node.id == id)
    }

    pub fn position_of(&self, id: EntityId) -> Option<Vec3> {
        self.nodes
            .iter()
            .chain(self.pending_spawns.iter())
            .find(|node| node.id == id)
            .map(|node| node.transform.position)
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
        match self.any_node_mut(id) {
            Some(node) => {
                node.set_position(position);
                true
            }
            None => false,
        }
    }

    pub fn set_orientation_degrees(&mut self, id: EntityId, degrees: f32) -> bool {
        match self.any_node_mut(id) {
            Some(node) => {
                node.set_orientation_degrees(degrees);
                true
            }
            None => false,
        }
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn spawn_effect(&mut self, spec: EffectSpec) -> EffectId {
        let id = EffectId(self.next_effect_id);
        self.next_effect_id = self.next_effect_id.saturating_add(1);
        self.effects.push(Effect::new(id, spec));
        id
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn tick_effects(&mut self, frame_dt_seconds: f32) {
        self.effects
            .retain_mut(|effect| effect.advance(frame_dt_seconds));
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    /// Runs once per fixed physics step.
    fn fixed_update(&mut self, fixed_dt_seconds: f32, world: &mut SceneWorld);
    /// Runs once per frame, after the frame's fixed steps.
    fn update(
        &mut self,
        frame_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::effects::EffectKind;
    use super::*;

    fn marker() -> NodeTemplate {
        NodeTemplate::untextured("marker")
    }

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        let a = allocator.allocate();
        let b = allocator.allocate();
        let c = allocator.allocate();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(c.0, 2);
    }

    #[test]
    fn scene_world_spawn_and_despawn_updates_count() {
        let mut world = SceneWorld::default();
        let id = world.spawn(marker(), Transform::default());
        assert_eq!(world.node_count(), 0);
        world.apply_pending();
        assert_eq!(world.node_count(), 1);

        assert!(world.despawn(id));
        world.apply_pending();
        assert_eq!(world.node_count(), 0);
        assert!(!world.despawn(id));
    }

    #[test]
    fn duplicate_pending_despawns_are_idempotent() {
        let mut world = SceneWorld::default();
        let keep = world.spawn(marker(), Transform::default());
        let drop = world.spawn(marker(), Transform::default());
        world.apply_pending();

        assert!(world.despawn(drop));
        assert!(world.despawn(drop));
        world.apply_pending();

        assert_eq!(world.node_count(), 1);
        assert!(world.find_node(keep).is_some());
        assert!(world.find_node(drop).is_none());
    }

    #[test]
    fn spawn_then_despawn_before_apply_never_materializes() {
        let mut world = SceneWorld::default();
        let id = world.spawn(marker(), Transform::default());
        assert!(world.despawn(id));
        world.apply_pending();
        assert_eq!(world.node_count(), 0);
    }

    #[test]
    fn set_position_reaches_pending_nodes() {
        let mut world = SceneWorld::default();
        let id = world.spawn(marker(), Transform::default());
        assert!(world.set_position(id, Vec3::new(2.0, 3.0, 0.0)));
        world.apply_pending();
        let node = world.find_node(id).expect("node");
        assert_eq!(node.transform.position, Vec3::new(2.0, 3.0, 0.0));
    }

    #[test]
    fn set_orientation_on_missing_node_reports_false() {
        let mut world = SceneWorld::default();
        assert!(!world.set_orientation_degrees(EntityId(42), 90.0));
    }

    #[test]
    fn normalized_zero_vector_stays_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        let unit = Vec3::new(3.0, 4.0, 0.0).normalized();
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn expired_effects_are_removed_on_tick() {
        let mut world = SceneWorld::default();
        world.spawn_effect(EffectSpec::tap_indicator(Vec3::ZERO, 0.5));
        world.tick_effects(0.25);
        assert_eq!(world.effects().len(), 1);
        assert_eq!(world.effects()[0].kind, EffectKind::TapIndicator);
        world.tick_effects(0.3);
        assert!(world.effects().is_empty());
    }
}
