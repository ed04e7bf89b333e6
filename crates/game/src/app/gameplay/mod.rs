use std::collections::{BTreeMap, BTreeSet};

use engine::level::{build_room, MarkerTable, RoomBuildError, TileGrid};
use engine::{
    EffectKind, EffectSpec, EntityId, InputSnapshot, NodeTemplate, PhysicsWorld, PointerHistory,
    PointerHit, PointerRay, PointerSample, RoomDatabase, Scene, SceneCommand, SceneWorld,
    TextureTable, Transform, Vec2, Vec3, Viewport,
};
use engine::{CollisionTarget, EffectId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use super::config::GameConfig;

const PLAYER_NODE: NodeTemplate = NodeTemplate::untextured("player");
const ENEMY_NODE: NodeTemplate = NodeTemplate::untextured("enemy");
/// Distances below this count as "no direction" when facing a point.
const FACE_EPSILON: f32 = 1e-6;

include!("types.rs");
include!("interaction.rs");
include!("systems.rs");
include!("scene_impl.rs");
include!("util.rs");

pub(crate) fn build_scene(
    config: GameConfig,
    rooms: RoomDatabase,
    textures: TextureTable,
) -> GameplayScene {
    GameplayScene::new(config, rooms, textures)
}
