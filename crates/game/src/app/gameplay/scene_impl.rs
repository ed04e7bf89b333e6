pub(crate) struct GameplayScene {
    config: GameConfig,
    rooms: RoomDatabase,
    textures: TextureTable,
    markers: MarkerTable,
    context: SimulationContext,
    physics: PhysicsWorld,
    interaction: PointerInteraction,
    clock_seconds: f32,
    last_frame_dt_seconds: f32,
    flame_contacts: BTreeSet<(EffectId, EntityId)>,
    rng: ChaCha8Rng,
}

impl GameplayScene {
    pub(crate) fn new(config: GameConfig, rooms: RoomDatabase, textures: TextureTable) -> Self {
        let interaction = PointerInteraction::new(InteractionSettings {
            tap_seconds: config.interaction.tap_seconds,
            drag_distance_px: config.interaction.drag_distance_px,
            active_screen_width: config.interaction.active_screen_width,
        });
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            config,
            rooms,
            textures,
            markers: MarkerTable::default(),
            context: SimulationContext::default(),
            physics: PhysicsWorld::default(),
            interaction,
            clock_seconds: 0.0,
            last_frame_dt_seconds: 0.0,
            flame_contacts: BTreeSet::new(),
            rng,
        }
    }

    /// Replaces the current room. On error the previous room stays as it was.
    pub(crate) fn build_room(
        &mut self,
        world: &mut SceneWorld,
        room_id: &str,
    ) -> Result<(), RoomBuildError> {
        let build = match build_room(&self.rooms, room_id, &self.textures, &self.markers, world) {
            Ok(build) => build,
            Err(error) => {
                warn!(room = room_id, error = %error, "room_build_failed");
                return Err(error);
            }
        };

        if let Some(previous) = self.context.room.take() {
            for node in previous.node_ids() {
                world.despawn(node);
            }
        }
        world.camera_mut().position = room_center(&build.grid);

        if let (Some(player), Some(start)) = (self.context.player, build.player_start()) {
            world.set_position(player, start);
            self.stop_player();
        }
        info!(
            room = room_id,
            tile_count = build.grid.tile_count(),
            player_start = build.player_start().is_some(),
            "room_entered"
        );
        self.context.room = Some(build.grid);
        Ok(())
    }

    pub(crate) fn spawn_player(&mut self, world: &mut SceneWorld, position: Vec3) -> EntityId {
        if let Some(previous) = self.context.player.take() {
            world.despawn(previous);
            self.physics.remove_body(previous);
        }
        let id = world.spawn(PLAYER_NODE, Transform::at(position.with_z(0.0)));
        self.physics.add_body(id, self.config.player.radius);
        self.context.player = Some(id);
        self.context.player_locomotion = Some(Locomotion::new(self.config.player.speed));
        id
    }

    pub(crate) fn spawn_enemy(&mut self, world: &mut SceneWorld, position: Vec3) -> EntityId {
        let id = world.spawn(ENEMY_NODE, Transform::at(position.with_z(0.0)));
        self.physics.add_body(id, self.config.enemy.radius);
        self.context.enemies.insert(
            id,
            Enemy {
                locomotion: Locomotion::new(self.config.enemy.speed),
                health: Health::new(self.config.enemy.max_health),
            },
        );
        debug!(enemy = id.0, x = position.x, y = position.y, "enemy_spawned");
        id
    }

    /// `None` when `id` was never an enemy of this scene.
    pub(crate) fn damage_enemy(
        &mut self,
        world: &mut SceneWorld,
        id: EntityId,
        amount: f32,
        over_time: bool,
    ) -> Option<DamageOutcome> {
        let enemy = self.context.enemies.get_mut(&id)?;
        let outcome = enemy
            .health
            .damage(amount, over_time, self.last_frame_dt_seconds);
        match outcome {
            DamageOutcome::Died => {
                enemy.locomotion.stop();
                world.despawn(id);
                self.physics.remove_body(id);
                info!(enemy = id.0, "enemy_died");
            }
            DamageOutcome::Applied { remaining } => {
                debug!(enemy = id.0, amount, over_time, remaining, "enemy_damaged");
            }
            DamageOutcome::AlreadyDead => {
                debug!(enemy = id.0, "damage_ignored_dead");
            }
        }
        Some(outcome)
    }

    pub(crate) fn cast_ground_fire(
        &mut self,
        world: &mut SceneWorld,
        position: Vec3,
        source: Option<EntityId>,
    ) -> EffectId {
        let settings = self.config.ground_fire;
        let duration_seconds = vary_duration(
            &mut self.rng,
            settings.duration_seconds,
            settings.duration_variance_seconds,
        );
        let id = world.spawn_effect(EffectSpec::ground_fire(
            position.with_z(0.0),
            duration_seconds,
            settings.fade_seconds,
            settings.radius,
            source,
        ));
        info!(
            effect = id.0,
            x = position.x,
            y = position.y,
            duration_seconds,
            source = ?source.map(|id| id.0),
            "ground_fire_cast"
        );
        id
    }

    pub(crate) fn player_id(&self) -> Option<EntityId> {
        self.context.player
    }

    #[cfg(test)]
    pub(crate) fn player_locomotion(&self) -> Option<Locomotion> {
        self.context.player_locomotion
    }

    /// Every enemy spawned since load, dead ones included, in spawn order.
    pub(crate) fn enemy_ids(&self) -> Vec<EntityId> {
        self.context.enemies.keys().copied().collect()
    }

    #[cfg(test)]
    pub(crate) fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.context.enemies.get(&id)
    }

    pub(crate) fn room(&self) -> Option<&TileGrid> {
        self.context.room.as_ref()
    }

    pub(crate) fn interaction_phase(&self) -> PointerPhase {
        self.interaction.phase()
    }

    pub(crate) fn clock_seconds(&self) -> f32 {
        self.clock_seconds
    }
}

impl Scene for GameplayScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.context.clear();
        self.physics.clear();
        self.interaction.reset();
        self.flame_contacts.clear();
        self.clock_seconds = 0.0;
        self.last_frame_dt_seconds = 0.0;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);

        self.spawn_player(world, Vec3::ZERO);
        let start_room = self.config.start_room.clone();
        if self.build_room(world, &start_room).is_err() {
            warn!(room = %start_room, "start_room_unavailable");
        }
        let spawn_points = self.config.enemy.spawn_points.clone();
        for point in spawn_points {
            self.spawn_enemy(world, Vec3::new(point.x, point.y, 0.0));
        }

        world.apply_pending();
        info!(
            room = %start_room,
            entity_count = world.node_count(),
            enemy_count = self.context.enemies.len(),
            "scene_loaded"
        );
    }

    fn fixed_update(&mut self, fixed_dt_seconds: f32, world: &mut SceneWorld) {
        self.run_locomotion_step(fixed_dt_seconds, world);
    }

    fn update(
        &mut self,
        frame_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        self.last_frame_dt_seconds = frame_dt_seconds;
        self.clock_seconds += frame_dt_seconds;

        let sample = sample_pointer(
            world,
            &self.physics,
            self.context.room.as_ref(),
            input,
            self.clock_seconds,
        );
        for command in self.interaction.update(input, sample, self.clock_seconds) {
            self.apply_interaction(command, world);
        }

        self.run_enemy_pursuit(world);
        self.run_ground_fire(world);

        SceneCommand::None
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        world.clear();
        self.physics.clear();
        self.context.clear();
        self.interaction.reset();
        self.flame_contacts.clear();
        info!("scene_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let alive = self
            .context
            .enemies
            .values()
            .filter(|enemy| !enemy.health.is_dead())
            .count();
        Some(format!(
            "room={} enemies={} pointer={:?} t={:.2}",
            self.room().map(TileGrid::room_id).unwrap_or("-"),
            alive,
            self.interaction_phase(),
            self.clock_seconds()
        ))
    }
}
