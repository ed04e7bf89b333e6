impl GameplayScene {
    /// Every mover computes its command from the same pre-step positions,
    /// then commands are applied, then physics integrates once.
    fn run_locomotion_step(&mut self, fixed_dt_seconds: f32, world: &mut SceneWorld) {
        let movers = self
            .context
            .player
            .into_iter()
            .chain(
                self.context
                    .enemies
                    .iter()
                    .filter(|(_, enemy)| !enemy.health.is_dead())
                    .map(|(id, _)| *id),
            )
            .collect::<Vec<_>>();

        let mut commands = Vec::with_capacity(movers.len());
        for id in movers {
            let Some(position) = world.position_of(id) else {
                continue;
            };
            if let Some(locomotion) = self.context.locomotion_mut(id) {
                commands.push((id, locomotion.fixed_step(position, fixed_dt_seconds)));
            }
        }

        for (id, command) in commands {
            match command {
                LocomotionCommand::Velocity(velocity) => {
                    self.physics.set_linear_velocity(id, velocity);
                }
                LocomotionCommand::SnapAndStop(target) => {
                    world.set_position(id, target);
                    self.physics.set_linear_velocity(id, Vec3::ZERO);
                    if let Some(locomotion) = self.context.locomotion_mut(id) {
                        locomotion.stop();
                    }
                    debug!(entity = id.0, x = target.x, y = target.y, "walk_arrived");
                }
            }
        }

        let collisions = self
            .physics
            .step(fixed_dt_seconds, world, self.context.room.as_ref());
        for collision in collisions {
            match collision.other {
                CollisionTarget::Tile {
                    grid_x,
                    grid_y,
                    height,
                } if height > 0 && Some(collision.body) == self.context.player => {
                    self.stop_player();
                    debug!(grid_x, grid_y, "player_hit_wall");
                }
                CollisionTarget::Body(other) => {
                    debug!(body = collision.body.0, other = other.0, "body_contact");
                }
                CollisionTarget::Tile { .. } => {}
            }
        }
    }

    /// Enemies re-target the player's current position every frame.
    fn run_enemy_pursuit(&mut self, world: &mut SceneWorld) {
        let Some(player_position) = self.context.player.and_then(|id| world.position_of(id))
        else {
            return;
        };
        for (id, enemy) in self
            .context
            .enemies
            .iter_mut()
            .filter(|(_, enemy)| !enemy.health.is_dead())
        {
            enemy.locomotion.walk_to(player_position);
            if let Some(position) = world.position_of(*id) {
                world.set_orientation_degrees(*id, face_degrees(position, player_position));
            }
        }
    }

    /// Ground fire burns every living enemy inside its radius except the
    /// entity that cast it.
    fn run_ground_fire(&mut self, world: &mut SceneWorld) {
        let fires = world
            .effects()
            .iter()
            .filter(|effect| effect.kind == EffectKind::GroundFire)
            .cloned()
            .collect::<Vec<_>>();

        let mut contacts = BTreeSet::new();
        let mut burning = Vec::new();
        for fire in &fires {
            for (id, enemy) in &self.context.enemies {
                if enemy.health.is_dead() || fire.source == Some(*id) {
                    continue;
                }
                let Some(position) = world.position_of(*id) else {
                    continue;
                };
                if !fire.contains_planar(position) {
                    continue;
                }
                if !self.flame_contacts.contains(&(fire.id, *id)) {
                    info!(effect = fire.id.0, enemy = id.0, "flame_hit");
                }
                contacts.insert((fire.id, *id));
                burning.push(*id);
            }
        }
        self.flame_contacts = contacts;

        let damage_per_second = self.config.ground_fire.damage_per_second;
        for id in burning {
            self.damage_enemy(world, id, damage_per_second, true);
        }
    }

    fn apply_interaction(&mut self, command: InteractionCommand, world: &mut SceneWorld) {
        match command {
            InteractionCommand::WalkTo(target) => self.walk_player_to(world, target),
            InteractionCommand::ShowTap(position) => {
                world.spawn_effect(EffectSpec::tap_indicator(
                    position,
                    self.config.interaction.tap_indicator_seconds,
                ));
            }
            InteractionCommand::StopWalking => self.stop_player(),
        }
    }

    fn walk_player_to(&mut self, world: &mut SceneWorld, target: Vec3) {
        let Some(player) = self.context.player else {
            return;
        };
        let Some(locomotion) = self.context.player_locomotion.as_mut() else {
            return;
        };
        locomotion.walk_to(target);
        if let Some(position) = world.position_of(player) {
            world.set_orientation_degrees(player, face_degrees(position, target));
        }
    }

    fn stop_player(&mut self) {
        if let Some(locomotion) = self.context.player_locomotion.as_mut() {
            locomotion.stop();
        }
        if let Some(player) = self.context.player {
            self.physics.set_linear_velocity(player, Vec3::ZERO);
        }
    }
}
