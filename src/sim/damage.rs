//! Damage application, death notifications and the contact pass

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::combat::AttackResult;
use super::enemy::{DamageOutcome, Enemy};
use super::geom::knockback_direction;
use super::player::Player;
use super::state::GameEvent;
use crate::consts::{CONTACT_PUSH_FORCE, DEATH_NOTIFY_FRACTION};
use crate::tuning::Tuning;

/// Hit numbers float this far above an enemy's head
const ENEMY_HIT_MARKER_OFFSET: f32 = 0.3;
/// ...and this far above the player's
const PLAYER_HIT_MARKER_OFFSET: f32 = 0.5;

/// A kill whose notification is still waiting on the death animation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingDeath {
    enemy_id: u32,
    position: Vec3,
    remaining: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageResolver {
    pending: Vec<PendingDeath>,
    player_death_reported: bool,
}

impl DamageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of kills whose `EnemyDied` has not fired yet
    pub fn pending_deaths(&self) -> usize {
        self.pending.len()
    }

    /// Damage the enemy with `enemy_id`. An id that is no longer in the set
    /// is skipped. Hits on dying enemies are ignored and raise no `Hit` event.
    #[allow(clippy::too_many_arguments)]
    pub fn damage_enemy(
        &mut self,
        enemies: &mut [Enemy],
        enemy_id: u32,
        amount: f32,
        sliced: bool,
        slice_direction: Option<Vec3>,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> DamageOutcome {
        let Some(enemy) = enemies.iter_mut().find(|e| e.id == enemy_id) else {
            log::debug!("hit on missing enemy {enemy_id} dropped");
            return DamageOutcome::Ignored;
        };
        self.hit_enemy(enemy, amount, sliced, slice_direction, tuning, events)
    }

    fn hit_enemy(
        &mut self,
        enemy: &mut Enemy,
        amount: f32,
        sliced: bool,
        slice_direction: Option<Vec3>,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> DamageOutcome {
        let outcome = enemy.take_damage(amount, sliced, slice_direction);
        if !outcome.landed() {
            return outcome;
        }

        events.push(GameEvent::Hit {
            position: enemy.position
                + Vec3::Y * (tuning.enemies.height + ENEMY_HIT_MARKER_OFFSET),
            amount,
            is_player: false,
        });

        if outcome == DamageOutcome::Killed {
            log::debug!("enemy {} killed (sliced: {sliced})", enemy.id);
            self.pending.push(PendingDeath {
                enemy_id: enemy.id,
                position: enemy.position,
                remaining: tuning.enemies.death_anim_duration * DEATH_NOTIFY_FRACTION,
            });
        }
        outcome
    }

    /// Apply every hit of an attack, in order, with its knockback.
    /// Returns the number of kills.
    pub fn apply_attack(
        &mut self,
        attack: &AttackResult,
        enemies: &mut [Enemy],
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> usize {
        let mut kills = 0;
        for hit in &attack.hits {
            let Some(enemy) = enemies.iter_mut().find(|e| e.id == hit.enemy_id) else {
                log::debug!("hit on missing enemy {} dropped", hit.enemy_id);
                continue;
            };
            if !enemy.is_alive() {
                continue;
            }
            // Knockback first: a kill records where the body lands
            enemy.apply_knockback(hit.knockback_direction, hit.knockback_force);
            let outcome = self.hit_enemy(
                enemy,
                hit.damage,
                attack.is_sliced(),
                attack.slice_direction,
                tuning,
                events,
            );
            if outcome == DamageOutcome::Killed {
                kills += 1;
            }
        }
        kills
    }

    /// Damage the player. Returns true on the call that kills them.
    pub fn damage_player(
        &mut self,
        player: &mut Player,
        amount: f32,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if !player.is_alive() {
            return false;
        }

        player.take_damage(amount);
        events.push(GameEvent::Hit {
            position: player.position
                + Vec3::Y * (tuning.player.height + PLAYER_HIT_MARKER_OFFSET),
            amount,
            is_player: true,
        });

        if !player.is_alive() && !self.player_death_reported {
            self.player_death_reported = true;
            events.push(GameEvent::PlayerDied);
            return true;
        }
        false
    }

    /// Living enemies touching the player deal contact damage, then get
    /// pushed back and start their cooldown.
    pub fn process_contact_damage(
        &mut self,
        player: &mut Player,
        enemies: &mut [Enemy],
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) {
        for enemy in enemies.iter_mut() {
            if !player.is_alive() {
                return;
            }
            if !enemy.can_deal_contact_damage()
                || !enemy.is_colliding_with(player.position, tuning.player.radius, tuning.enemies.size)
            {
                continue;
            }

            self.damage_player(player, enemy.damage, tuning, events);
            enemy.did_deal_contact_damage(tuning.enemies.touch_damage_cooldown);
            let push = knockback_direction(player.position, enemy.position);
            enemy.apply_knockback(push, CONTACT_PUSH_FORCE);
        }
    }

    /// Count down pending death notifications
    pub fn update(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        for death in &mut self.pending {
            death.remaining -= dt;
        }
        self.pending.retain(|death| {
            if death.remaining > 0.0 {
                return true;
            }
            events.push(GameEvent::EnemyDied {
                enemy_id: death.enemy_id,
                position: death.position,
            });
            false
        });
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.player_death_reported = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combat::Hit;
    use crate::sim::player::Weapon;

    fn setup() -> (DamageResolver, Tuning, Vec<Enemy>) {
        let tuning = Tuning::default();
        let enemies = vec![Enemy::new(7, Vec3::new(0.0, 0.0, -5.0), 1, &tuning.enemies)];
        (DamageResolver::new(), tuning, enemies)
    }

    fn hit_count(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Hit { .. }))
            .count()
    }

    #[test]
    fn test_twenty_twenty_five() {
        let (mut damage, tuning, mut enemies) = setup();
        let mut events = Vec::new();

        let outcomes: Vec<DamageOutcome> = [20.0, 20.0, 5.0]
            .iter()
            .map(|&amount| {
                damage.damage_enemy(&mut enemies, 7, amount, false, None, &tuning, &mut events)
            })
            .collect();

        assert_eq!(
            outcomes,
            vec![DamageOutcome::Wounded, DamageOutcome::Killed, DamageOutcome::Ignored]
        );
        assert!(enemies[0].is_dying());
        assert_eq!(hit_count(&events), 2);
        assert_eq!(damage.pending_deaths(), 1);

        // Dying enemies never deal contact damage
        let mut player = Player::new(&tuning);
        enemies[0].position = Vec3::new(0.0, 0.0, -0.5);
        events.clear();
        damage.process_contact_damage(&mut player, &mut enemies, &tuning, &mut events);
        assert_eq!(player.hp, 100.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_hits_on_dying_enemy_are_silent() {
        let (mut damage, tuning, mut enemies) = setup();
        let mut events = Vec::new();
        damage.damage_enemy(&mut enemies, 7, 100.0, true, Some(Vec3::X), &tuning, &mut events);
        assert_eq!(hit_count(&events), 1);
        events.clear();

        let outcome =
            damage.damage_enemy(&mut enemies, 7, 30.0, false, None, &tuning, &mut events);
        assert_eq!(outcome, DamageOutcome::Ignored);
        assert!(events.is_empty());
        assert_eq!(damage.pending_deaths(), 1);
    }

    #[test]
    fn test_death_notification_is_delayed() {
        let (mut damage, tuning, mut enemies) = setup();
        let mut events = Vec::new();
        damage.damage_enemy(&mut enemies, 7, 100.0, false, None, &tuning, &mut events);
        events.clear();

        // 0.4 * 0.9 = 0.36s
        damage.update(0.3, &mut events);
        assert!(events.is_empty());
        damage.update(0.1, &mut events);
        assert_eq!(
            events,
            vec![GameEvent::EnemyDied {
                enemy_id: 7,
                position: Vec3::new(0.0, 0.0, -5.0),
            }]
        );
        assert_eq!(damage.pending_deaths(), 0);

        // Paused time never fires it
        let (mut damage, tuning, mut enemies) = setup();
        damage.damage_enemy(&mut enemies, 7, 100.0, false, None, &tuning, &mut events);
        events.clear();
        for _ in 0..100 {
            damage.update(0.0, &mut events);
        }
        assert!(events.is_empty());
    }

    #[test]
    fn test_missing_enemy_is_skipped() {
        let (mut damage, tuning, mut enemies) = setup();
        let mut events = Vec::new();
        let attack = AttackResult {
            weapon: Weapon::Melee,
            hits: vec![
                Hit {
                    enemy_id: 99,
                    damage: 40.0,
                    point: Vec3::ZERO,
                    knockback_direction: Vec3::NEG_Z,
                    knockback_force: 6.0,
                },
                Hit {
                    enemy_id: 7,
                    damage: 40.0,
                    point: Vec3::ZERO,
                    knockback_direction: Vec3::NEG_Z,
                    knockback_force: 6.0,
                },
            ],
            slice_direction: Some(Vec3::NEG_Z),
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            end: Vec3::NEG_Z,
        };
        let kills = damage.apply_attack(&attack, &mut enemies, &tuning, &mut events);
        assert_eq!(kills, 1);
        assert_eq!(hit_count(&events), 1);
        // Knockback 6 * 0.3 along -Z
        assert!((enemies[0].position.z + 6.8).abs() < 1e-5);
        match enemies[0].state {
            crate::sim::enemy::EnemyState::Dying { sliced, .. } => assert!(sliced),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_player_death_reported_once() {
        let (mut damage, tuning, _) = setup();
        let mut player = Player::new(&tuning);
        let mut events = Vec::new();
        assert!(!damage.damage_player(&mut player, 60.0, &tuning, &mut events));
        assert!(damage.damage_player(&mut player, 60.0, &tuning, &mut events));
        assert_eq!(player.hp, 0.0);
        assert!(!damage.damage_player(&mut player, 60.0, &tuning, &mut events));
        let deaths = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerDied))
            .count();
        assert_eq!(deaths, 1);
        assert_eq!(hit_count(&events), 2);
    }

    #[test]
    fn test_contact_damage_respects_cooldown() {
        let (mut damage, tuning, _) = setup();
        let mut enemies = vec![Enemy::new(1, Vec3::new(0.0, 0.0, -1.0), 1, &tuning.enemies)];
        let mut player = Player::new(&tuning);
        let mut events = Vec::new();

        damage.process_contact_damage(&mut player, &mut enemies, &tuning, &mut events);
        assert_eq!(player.hp, 90.0);
        // Pushed back by 3 * 0.3
        assert!((enemies[0].position.z + 1.9).abs() < 1e-5);

        enemies[0].position = Vec3::new(0.0, 0.0, -1.0);
        damage.process_contact_damage(&mut player, &mut enemies, &tuning, &mut events);
        assert_eq!(player.hp, 90.0);

        enemies[0].update(Vec3::new(0.0, 0.0, 0.3), 0.5);
        enemies[0].position = Vec3::new(0.0, 0.0, -1.0);
        damage.process_contact_damage(&mut player, &mut enemies, &tuning, &mut events);
        assert_eq!(player.hp, 80.0);
    }

    #[test]
    fn test_clear_resets_death_latch() {
        let (mut damage, tuning, mut enemies) = setup();
        let mut events = Vec::new();
        damage.damage_enemy(&mut enemies, 7, 100.0, false, None, &tuning, &mut events);
        let mut player = Player::new(&tuning);
        damage.damage_player(&mut player, 500.0, &tuning, &mut events);
        damage.clear();
        assert_eq!(damage.pending_deaths(), 0);

        player.reset(&tuning);
        events.clear();
        damage.damage_player(&mut player, 500.0, &tuning, &mut events);
        assert!(events.contains(&GameEvent::PlayerDied));
    }
}
