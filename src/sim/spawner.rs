//! Enemy spawning, difficulty pacing and the orb life cycle
//!
//! The spawner owns the live enemy and orb sets. Enemies are removed once
//! their death animation has finished, leaving an orb behind.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::geom::random_point_in_ring;
use super::orb::{OrbOutcome, XpOrb};
use super::player::Player;
use super::state::GameEvent;
use crate::tuning::{EnemyTuning, Tuning};

/// Seconds between spawns at `level`
pub fn spawn_interval(level: u32, tuning: &EnemyTuning) -> f32 {
    let steps = level.saturating_sub(1) as f32;
    (tuning.initial_spawn_rate - steps * tuning.spawn_rate_decrease).max(tuning.min_spawn_rate)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Live enemies, including dying ones (sorted by id)
    pub enemies: Vec<Enemy>,
    /// Uncollected orbs (sorted by id)
    pub orbs: Vec<XpOrb>,
    pub kill_count: u32,
    spawn_timer: f32,
    spawn_interval: f32,
    next_id: u32,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            enemies: Vec::new(),
            orbs: Vec::new(),
            kill_count: 0,
            spawn_timer: 0.0,
            spawn_interval: tuning.enemies.initial_spawn_rate,
            next_id: 1,
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    /// Recompute the interval for a new player level
    pub fn update_spawn_rate(&mut self, level: u32, tuning: &EnemyTuning) {
        self.spawn_interval = spawn_interval(level, tuning);
    }

    /// Spawn one enemy on the ring around the player
    pub fn spawn_enemy<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        player: &Player,
        tuning: &EnemyTuning,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let position = random_point_in_ring(
            rng,
            player.position,
            tuning.min_spawn_distance,
            tuning.spawn_distance,
            0.0,
        );
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, position, player.level, tuning));
        log::debug!("enemy {id} spawned at level {}", player.level);
        events.push(GameEvent::EnemySpawned {
            enemy_id: id,
            position,
        });
        id
    }

    pub fn spawn_orb(&mut self, position: Vec3, tuning: &Tuning) -> u32 {
        let id = self.next_entity_id();
        self.orbs.push(XpOrb::new(id, position, &tuning.xp));
        id
    }

    /// Advance spawning, enemy AI and orbs by one tick.
    /// Returns the number of levels the player gained from collected orbs.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        player: &mut Player,
        dt: f32,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 && self.alive_count() < tuning.enemies.max_enemies {
            self.spawn_enemy(rng, player, &tuning.enemies, events);
            self.spawn_timer = self.spawn_interval;
        }

        for enemy in &mut self.enemies {
            enemy.update(player.position, dt);
        }
        self.remove_dead(tuning);

        self.update_orbs(player, dt, tuning, events)
    }

    fn remove_dead(&mut self, tuning: &Tuning) {
        let mut fallen = Vec::new();
        self.enemies.retain(|enemy| {
            if enemy.is_dead() {
                fallen.push(enemy.position);
                false
            } else {
                true
            }
        });

        for position in fallen {
            self.kill_count += 1;
            self.spawn_orb(position, tuning);
        }
    }

    fn update_orbs(
        &mut self,
        player: &mut Player,
        dt: f32,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let mut levels = 0;
        for orb in &mut self.orbs {
            let Some(outcome) =
                orb.update(player.position, player.stats.pickup_radius, dt, &tuning.xp)
            else {
                continue;
            };
            if let OrbOutcome::Collected { value } = outcome {
                events.push(GameEvent::XpCollected { amount: value });
                if player.add_xp(value, &tuning.xp) {
                    levels += 1;
                    log::info!("level up: {}", player.level);
                    events.push(GameEvent::LeveledUp {
                        level: player.level,
                    });
                }
            }
        }
        self.orbs.retain(|orb| !orb.is_finished());
        levels
    }

    /// Drop every entity and restore level-1 pacing
    pub fn clear(&mut self, tuning: &Tuning) {
        self.enemies.clear();
        self.orbs.clear();
        self.kill_count = 0;
        self.spawn_timer = 0.0;
        self.spawn_interval = tuning.enemies.initial_spawn_rate;
    }
}
