/// Walks an entity toward a point on the play plane. Shared by the player
/// and by enemies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Locomotion {
    speed: f32,
    walking: bool,
    walk_target: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LocomotionCommand {
    Velocity(Vec3),
    SnapAndStop(Vec3),
}

impl Locomotion {
    pub(crate) fn new(speed: f32) -> Self {
        Self {
            speed,
            walking: false,
            walk_target: Vec3::ZERO,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_walking(&self) -> bool {
        self.walking
    }

    #[cfg(test)]
    pub(crate) fn walk_target(&self) -> Vec3 {
        self.walk_target
    }

    pub(crate) fn walk_to(&mut self, target: Vec3) {
        self.walk_target = target.with_z(0.0);
        self.walking = true;
    }

    pub(crate) fn stop(&mut self) {
        self.walking = false;
    }

    /// Command for one fixed step. Arrival snaps instead of overshooting.
    pub(crate) fn fixed_step(&self, position: Vec3, fixed_dt_seconds: f32) -> LocomotionCommand {
        if !self.walking {
            return LocomotionCommand::Velocity(Vec3::ZERO);
        }
        let delta = self.walk_target - position;
        if delta.length() < self.speed * fixed_dt_seconds {
            LocomotionCommand::SnapAndStop(self.walk_target)
        } else {
            LocomotionCommand::Velocity(delta.normalized() * self.speed)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Health {
    current: f32,
    max: f32,
    dead: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DamageOutcome {
    Applied { remaining: f32 },
    Died,
    AlreadyDead,
}

impl Health {
    pub(crate) fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> f32 {
        self.current
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.dead
    }

    /// Negative amounts heal. `over_time` amounts are per second and scale
    /// by `frame_dt_seconds`.
    pub(crate) fn damage(
        &mut self,
        amount: f32,
        over_time: bool,
        frame_dt_seconds: f32,
    ) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::AlreadyDead;
        }
        let amount = if over_time {
            amount * frame_dt_seconds
        } else {
            amount
        };
        self.current = (self.current - amount).min(self.max);
        if self.current <= 0.0 {
            self.dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Applied {
                remaining: self.current,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) locomotion: Locomotion,
    pub(crate) health: Health,
}

/// Per-scene simulation state that everything in the frame and fixed steps
/// reads: who the player is, the enemy table, and the current room.
#[derive(Debug, Default)]
pub(crate) struct SimulationContext {
    pub(crate) player: Option<EntityId>,
    pub(crate) player_locomotion: Option<Locomotion>,
    pub(crate) enemies: BTreeMap<EntityId, Enemy>,
    pub(crate) room: Option<TileGrid>,
}

impl SimulationContext {
    fn clear(&mut self) {
        self.player = None;
        self.player_locomotion = None;
        self.enemies.clear();
        self.room = None;
    }

    fn locomotion_mut(&mut self, id: EntityId) -> Option<&mut Locomotion> {
        if self.player == Some(id) {
            return self.player_locomotion.as_mut();
        }
        self.enemies
            .get_mut(&id)
            .filter(|enemy| !enemy.health.is_dead())
            .map(|enemy| &mut enemy.locomotion)
    }
}
