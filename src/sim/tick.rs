//! Per-tick simulation step
//!
//! The caller samples input and camera, advances the [`Clock`], then calls
//! [`tick`]. Gameplay always runs on the clock's scaled delta.

use glam::{Vec2, Vec3};

use super::clock::Clock;
use super::combat::{resolve_melee, resolve_ranged};
use super::player::Weapon;
use super::state::{GameEvent, GamePhase, GameState};
use crate::{yaw_forward, yaw_right};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement axes: x strafes right, y moves forward
    pub movement: Vec2,
    pub run: bool,
    /// Jump pressed this tick (dives while slow motion is active)
    pub jump: bool,
    /// Fire held
    pub fire: bool,
    /// Slow-motion toggle pressed this tick
    pub slow_mo_toggle: bool,
    /// Weapon slot pressed this tick (0 = pistols, 1 = sword)
    pub weapon_select: Option<u8>,
    /// Swap to the other weapon
    pub cycle_weapon: bool,
    /// Pause toggle
    pub pause: bool,
    /// Index into the current upgrade offer
    pub choose_upgrade: Option<usize>,
    /// Start a new run after a game over
    pub restart: bool,
}

/// What the camera collaborator reports each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Eye position (ranged attack origin)
    pub position: Vec3,
    /// Unit look direction
    pub aim: Vec3,
    /// Horizontal forward (movement basis)
    pub forward: Vec3,
    /// Horizontal right (movement basis)
    pub right: Vec3,
    pub yaw: f32,
}

impl CameraView {
    /// Camera at `position` looking along yaw, pitched down by `pitch`
    pub fn from_yaw_pitch(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let forward = yaw_forward(yaw);
        let aim = (forward * pitch.cos() - Vec3::Y * pitch.sin()).normalize_or_zero();
        Self {
            position,
            aim,
            forward,
            right: yaw_right(yaw),
            yaw,
        }
    }

    /// Third-person orbit: sits `distance` behind and above `target`, looking
    /// at `look_height` over it
    pub fn orbit(
        target: Vec3,
        yaw: f32,
        pitch: f32,
        distance: f32,
        height: f32,
        look_height: f32,
    ) -> Self {
        let flat = distance * pitch.cos();
        let offset = Vec3::new(yaw.sin() * flat, distance * pitch.sin() + height, yaw.cos() * flat);
        let position = target + offset;
        let look_at = target + Vec3::Y * look_height;
        let aim = (look_at - position).try_normalize().unwrap_or(yaw_forward(yaw));
        Self {
            position,
            aim,
            forward: yaw_forward(yaw),
            right: yaw_right(yaw),
            yaw,
        }
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self::from_yaw_pitch(Vec3::new(0.0, 2.5, 6.0), 0.0, 0.0)
    }
}

/// Advance the session by one tick using the clock's current deltas
pub fn tick(
    state: &mut GameState,
    clock: &mut Clock,
    input: &TickInput,
    camera: &CameraView,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Phase handling
    match state.phase {
        GamePhase::GameOver => {
            if input.restart {
                restart(state, clock, &mut events);
            }
            return events;
        }
        GamePhase::ChoosingUpgrade => {
            if let Some(index) = input.choose_upgrade {
                pick_upgrade(state, clock, index, &mut events);
            }
            return events;
        }
        GamePhase::Paused => {
            if input.pause {
                clock.resume();
                set_phase(state, GamePhase::Playing, &mut events);
            }
            return events;
        }
        GamePhase::Playing => {
            if input.pause {
                clock.pause();
                set_phase(state, GamePhase::Paused, &mut events);
                return events;
            }
        }
    }

    if input.slow_mo_toggle {
        clock.toggle_slow_mo();
        events.push(GameEvent::SlowMoChanged {
            active: clock.is_slow_mo(),
        });
    }

    let requested = match (input.weapon_select, input.cycle_weapon) {
        (Some(slot), _) => Some(Weapon::from_slot(slot)),
        (None, true) => Some(state.player.weapon.other()),
        (None, false) => None,
    };
    if let Some(weapon) = requested.filter(|w| *w != state.player.weapon) {
        state.player.switch_weapon(weapon);
        events.push(GameEvent::WeaponSwitched { weapon });
    }

    let dt = clock.scaled_delta();
    let now = clock.elapsed();
    state.time_ticks += 1;

    let tuning = &state.tuning;

    state
        .player
        .update(input, camera, clock.is_slow_mo(), dt, tuning, &mut events);

    let levels = state
        .spawner
        .update(&mut state.rng, &mut state.player, dt, tuning, &mut events);

    // Only the equipped weapon attacks
    if input.fire && state.player.is_alive() {
        let weapon = state.player.weapon;
        let attack = match weapon {
            Weapon::Ranged if state.player.can_fire(now) => {
                state.player.did_fire(now);
                let attack = resolve_ranged(
                    &mut state.rng,
                    camera,
                    &state.player,
                    &state.spawner.enemies,
                    tuning,
                );
                events.push(GameEvent::ShotFired {
                    origin: state.player.muzzle_position(),
                    end: attack.end,
                    hit: !attack.hits.is_empty(),
                });
                Some(attack)
            }
            Weapon::Melee if state.player.can_slash(now, &tuning.melee) => {
                state.player.did_slash(now, &tuning.melee);
                let attack = resolve_melee(&state.player, &state.spawner.enemies, tuning);
                events.push(GameEvent::Slashed {
                    origin: attack.origin,
                    direction: attack.direction,
                    range: state.player.stats.melee_range,
                });
                Some(attack)
            }
            _ => None,
        };

        if let Some(attack) = attack {
            state
                .damage
                .apply_attack(&attack, &mut state.spawner.enemies, tuning, &mut events);
        }
    }

    state.damage.update(dt, &mut events);
    state.damage.process_contact_damage(
        &mut state.player,
        &mut state.spawner.enemies,
        tuning,
        &mut events,
    );

    state.normalize_order();

    if !state.player.is_alive() {
        log::info!(
            "game over at level {} with {} kills",
            state.player.level,
            state.spawner.kill_count
        );
        clock.pause();
        set_phase(state, GamePhase::GameOver, &mut events);
        return events;
    }

    if levels > 0 {
        state.pending_level_ups += levels;
        state
            .spawner
            .update_spawn_rate(state.player.level, &state.tuning.enemies);
        offer_upgrade(state, clock, &mut events);
    }

    events
}

fn set_phase(state: &mut GameState, phase: GamePhase, events: &mut Vec<GameEvent>) {
    state.phase = phase;
    events.push(GameEvent::PhaseChanged { phase });
}

fn offer_upgrade(state: &mut GameState, clock: &mut Clock, events: &mut Vec<GameEvent>) {
    let options = state.roll_upgrade_offer().to_vec();
    clock.pause();
    set_phase(state, GamePhase::ChoosingUpgrade, events);
    events.push(GameEvent::UpgradeOffered { options });
}

fn pick_upgrade(state: &mut GameState, clock: &mut Clock, index: usize, events: &mut Vec<GameEvent>) {
    let Some(kind) = state.choose_upgrade(index) else {
        log::warn!("upgrade choice {index} is not on offer");
        return;
    };
    events.push(GameEvent::UpgradeApplied { kind });

    if state.pending_level_ups > 0 {
        offer_upgrade(state, clock, events);
    } else {
        clock.resume();
        set_phase(state, GamePhase::Playing, events);
    }
}

fn restart(state: &mut GameState, clock: &mut Clock, events: &mut Vec<GameEvent>) {
    state.reset();
    clock.set_slow_mo(false);
    clock.resume();
    events.push(GameEvent::SessionReset);
    events.push(GameEvent::PhaseChanged {
        phase: GamePhase::Playing,
    });
}
