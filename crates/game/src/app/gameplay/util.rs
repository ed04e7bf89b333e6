/// Heading in degrees from `from` toward `to` on the play plane, measured
/// counter-clockwise from +x. A zero-length delta faces 0.
fn face_degrees(from: Vec3, to: Vec3) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() <= FACE_EPSILON && dy.abs() <= FACE_EPSILON {
        return 0.0;
    }
    dy.atan2(dx).to_degrees()
}

/// Projects the cursor onto the play plane and hit-tests bodies first, then
/// tiles.
fn sample_pointer(
    world: &SceneWorld,
    physics: &PhysicsWorld,
    room: Option<&TileGrid>,
    input: &InputSnapshot,
    now_seconds: f32,
) -> Option<PointerSample> {
    let screen = input.cursor_position_px()?;
    let viewport = Viewport::from_window_size(input.window_size());
    let camera = world.camera();
    let point = camera.screen_to_world(screen, viewport);
    let origin = camera.eye_above(point);
    let hit = physics
        .body_at(world, point)
        .map(PointerHit::Body)
        .or_else(|| {
            room.and_then(|grid| grid.tile_at_world(point))
                .map(|tile| PointerHit::Tile {
                    grid_x: tile.grid_x(),
                    grid_y: tile.grid_y(),
                })
        });
    Some(PointerSample {
        world: point,
        screen,
        ray: PointerRay {
            origin,
            direction: (point - origin).normalized(),
        },
        time_seconds: now_seconds,
        hit,
    })
}

/// Planar center of the room's occupied cells, in world units.
fn room_center(grid: &TileGrid) -> Vec2 {
    let max_x = grid.tiles().map(|tile| tile.grid_x()).max().unwrap_or(0);
    Vec2::new(max_x as f32 * 0.5, grid.max_row_index() as f32 * 0.5)
}

/// `base` shifted by a uniform amount in `[-variance, variance]`, never
/// below zero.
fn vary_duration(rng: &mut impl Rng, base: f32, variance: f32) -> f32 {
    if variance <= 0.0 {
        return base.max(0.0);
    }
    (base + rng.gen_range(-variance..=variance)).max(0.0)
}
