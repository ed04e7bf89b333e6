use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::scene::{EntityId, SceneWorld, Vec3};
use crate::level::{Tile, TileGrid};

const WALL_DEPTH_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub velocity: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionTarget {
    Tile {
        grid_x: usize,
        grid_y: usize,
        height: i32,
    },
    Body(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub body: EntityId,
    pub other: CollisionTarget,
}

/// Kinematic bodies driven by velocity commands once per fixed step.
/// Wall tiles are solid; body-body overlaps are reported on contact start.
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    bodies: BTreeMap<EntityId, RigidBody>,
    contacts: BTreeSet<(EntityId, EntityId)>,
}

impl PhysicsWorld {
    pub fn add_body(&mut self, id: EntityId, radius: f32) {
        self.bodies.insert(
            id,
            RigidBody {
                velocity: Vec3::ZERO,
                radius: radius.max(0.0),
            },
        );
    }

    pub fn remove_body(&mut self, id: EntityId) -> bool {
        self.contacts.retain(|(a, b)| *a != id && *b != id);
        self.bodies.remove(&id).is_some()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.contacts.clear();
    }

    pub fn body(&self, id: EntityId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn set_linear_velocity(&mut self, id: EntityId, velocity: Vec3) -> bool {
        match self.bodies.get_mut(&id) {
            Some(body) => {
                body.velocity = velocity;
                true
            }
            None => false,
        }
    }

    pub fn velocity(&self, id: EntityId) -> Option<Vec3> {
        self.bodies.get(&id).map(|body| body.velocity)
    }

    /// Topmost body whose planar radius covers `point`; later ids win ties.
    pub fn body_at(&self, world: &SceneWorld, point: Vec3) -> Option<EntityId> {
        self.bodies
            .iter()
            .rev()
            .find(|(id, body)| {
                world
                    .position_of(**id)
                    .is_some_and(|position| position.planar_distance(point) <= body.radius)
            })
            .map(|(id, _)| *id)
    }

    /// Integrates every body by `fixed_dt_seconds` and reports new collisions.
    pub fn step(
        &mut self,
        fixed_dt_seconds: f32,
        world: &mut SceneWorld,
        room: Option<&TileGrid>,
    ) -> Vec<Collision> {
        let mut collisions = Vec::new();

        for (id, body) in self.bodies.iter_mut() {
            if body.velocity == Vec3::ZERO {
                continue;
            }
            let Some(position) = world.position_of(*id) else {
                continue;
            };
            let next = position + body.velocity * fixed_dt_seconds;
            let blocking_wall = room.and_then(|grid| {
                let (wall, next_depth) = wall_overlap(grid, next, body.radius)?;
                let current_depth = wall_overlap(grid, position, body.radius)
                    .map_or(0.0, |(_, depth)| depth);
                (next_depth > current_depth + WALL_DEPTH_EPSILON).then_some(wall)
            });
            if let Some(wall) = blocking_wall {
                body.velocity = Vec3::ZERO;
                debug!(
                    body = id.0,
                    grid_x = wall.grid_x(),
                    grid_y = wall.grid_y(),
                    "wall_contact"
                );
                collisions.push(Collision {
                    body: *id,
                    other: CollisionTarget::Tile {
                        grid_x: wall.grid_x(),
                        grid_y: wall.grid_y(),
                        height: wall.height(),
                    },
                });
                continue;
            }
            world.set_position(*id, next);
        }

        let mut current_contacts = BTreeSet::new();
        let placed = self
            .bodies
            .iter()
            .filter_map(|(id, body)| world.position_of(*id).map(|pos| (*id, pos, body.radius)))
            .collect::<Vec<_>>();
        for (index, (a, a_pos, a_radius)) in placed.iter().enumerate() {
            for (b, b_pos, b_radius) in placed.iter().skip(index + 1) {
                if a_pos.planar_distance(*b_pos) < a_radius + b_radius {
                    current_contacts.insert((*a, *b));
                }
            }
        }
        for (a, b) in current_contacts.difference(&self.contacts) {
            collisions.push(Collision {
                body: *a,
                other: CollisionTarget::Body(*b),
            });
            collisions.push(Collision {
                body: *b,
                other: CollisionTarget::Body(*a),
            });
        }
        self.contacts = current_contacts;

        collisions
    }
}

/// Total depth by which a circle at `center` overlaps wall cells, with the
/// deepest wall. Cells are unit squares centered on integer world coords.
fn wall_overlap(grid: &TileGrid, center: Vec3, radius: f32) -> Option<(&Tile, f32)> {
    let mut deepest: Option<(&Tile, f32)> = None;
    let mut total = 0.0;
    let x_range = (center.x - radius).round() as i64..=(center.x + radius).round() as i64;
    for cell_x in x_range {
        let y_range = (center.y - radius).round() as i64..=(center.y + radius).round() as i64;
        for cell_y in y_range {
            let cell = Vec3::new(cell_x as f32, cell_y as f32, 0.0);
            let Some(wall) = grid.tile_at_world(cell).filter(|tile| tile.is_wall()) else {
                continue;
            };
            let closest = Vec3::new(
                center.x.clamp(cell.x - 0.5, cell.x + 0.5),
                center.y.clamp(cell.y - 0.5, cell.y + 0.5),
                0.0,
            );
            let distance = closest.planar_distance(center);
            let depth = if distance > 0.0 {
                radius - distance
            } else {
                let to_edge_x = 0.5 - (center.x - cell.x).abs();
                let to_edge_y = 0.5 - (center.y - cell.y).abs();
                radius + to_edge_x.min(to_edge_y)
            };
            if depth <= 0.0 {
                continue;
            }
            total += depth;
            if deepest.map_or(true, |(_, best)| depth > best) {
                deepest = Some((wall, depth));
            }
        }
    }
    deepest.map(|(wall, _)| (wall, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::scene::{NodeTemplate, Transform};
    use crate::content::{RoomDescription, TextureTable};
    use crate::level::{build_grid, MarkerTable};

    fn spawn_body(world: &mut SceneWorld, physics: &mut PhysicsWorld, at: Vec3) -> EntityId {
        let id = world.spawn(NodeTemplate::untextured("body"), Transform::at(at));
        world.apply_pending();
        physics.add_body(id, 0.25);
        id
    }

    #[test]
    fn velocity_integrates_position_each_step() {
        let mut world = SceneWorld::default();
        let mut physics = PhysicsWorld::default();
        let id = spawn_body(&mut world, &mut physics, Vec3::ZERO);
        physics.set_linear_velocity(id, Vec3::new(2.0, 0.0, 0.0));

        let collisions = physics.step(0.02, &mut world, None);

        assert!(collisions.is_empty());
        let position = world.position_of(id).expect("position");
        assert!((position.x - 0.04).abs() < 1e-6);
    }

    #[test]
    fn wall_tile_blocks_and_reports_collision() {
        let room = RoomDescription::new("r", "floor", "wall", ".|");
        let textures = TextureTable::default();
        let mut world = SceneWorld::default();
        let build =
            build_grid(&room, &textures, &MarkerTable::default(), &mut world).expect("build");
        let mut physics = PhysicsWorld::default();
        let id = spawn_body(&mut world, &mut physics, Vec3::new(0.4, 0.0, 0.0));
        physics.set_linear_velocity(id, Vec3::new(10.0, 0.0, 0.0));

        let collisions = physics.step(0.02, &mut world, Some(&build.grid));

        assert_eq!(collisions.len(), 1);
        assert_eq!(
            collisions[0].other,
            CollisionTarget::Tile {
                grid_x: 1,
                grid_y: 0,
                height: 1
            }
        );
        assert_eq!(physics.velocity(id), Some(Vec3::ZERO));
        assert_eq!(world.position_of(id), Some(Vec3::new(0.4, 0.0, 0.0)));
    }

    fn corridor() -> (SceneWorld, TileGrid) {
        let room = RoomDescription::new("r", "floor", "wall", "....|");
        let mut world = SceneWorld::default();
        let build = build_grid(&room, &TextureTable::default(), &MarkerTable::default(), &mut world)
            .expect("build");
        (world, build.grid)
    }

    #[test]
    fn body_stops_one_radius_short_of_a_wall() {
        let (mut world, grid) = corridor();
        let mut physics = PhysicsWorld::default();
        let id = spawn_body(&mut world, &mut physics, Vec3::ZERO);
        physics.set_linear_velocity(id, Vec3::new(2.0, 0.0, 0.0));

        let mut wall_hits = 0;
        for _ in 0..100 {
            wall_hits += physics.step(0.02, &mut world, Some(&grid)).len();
        }

        assert_eq!(wall_hits, 1);
        let x = world.position_of(id).expect("position").x;
        assert!(x + 0.25 <= 3.5, "body overlaps the wall at x={x}");
        assert!(x > 3.1, "body stopped early at x={x}");
    }

    #[test]
    fn body_touching_a_wall_can_move_away() {
        let (mut world, grid) = corridor();
        let mut physics = PhysicsWorld::default();
        let id = spawn_body(&mut world, &mut physics, Vec3::new(3.3, 0.0, 0.0));
        physics.set_linear_velocity(id, Vec3::new(-2.0, 0.0, 0.0));

        let collisions = physics.step(0.02, &mut world, Some(&grid));

        assert!(collisions.is_empty());
        let x = world.position_of(id).expect("position").x;
        assert!((x - 3.26).abs() < 1e-5);
    }

    #[test]
    fn body_contacts_are_reported_once_per_touch() {
        let mut world = SceneWorld::default();
        let mut physics = PhysicsWorld::default();
        let a = spawn_body(&mut world, &mut physics, Vec3::ZERO);
        let b = spawn_body(&mut world, &mut physics, Vec3::new(0.3, 0.0, 0.0));

        let first = physics.step(0.02, &mut world, None);
        let second = physics.step(0.02, &mut world, None);

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].body, a);
        assert_eq!(first[0].other, CollisionTarget::Body(b));
        assert!(second.is_empty());
    }

    #[test]
    fn body_at_finds_covering_body() {
        let mut world = SceneWorld::default();
        let mut physics = PhysicsWorld::default();
        let id = spawn_body(&mut world, &mut physics, Vec3::new(3.0, 3.0, 0.0));
        assert_eq!(physics.body_at(&world, Vec3::new(3.1, 3.1, 0.0)), Some(id));
        assert_eq!(physics.body_at(&world, Vec3::new(4.0, 3.0, 0.0)), None);
        assert!(physics.remove_body(id));
        assert_eq!(physics.body_at(&world, Vec3::new(3.0, 3.0, 0.0)), None);
    }
}
