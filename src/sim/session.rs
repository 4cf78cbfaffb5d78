//! Input state machine
//!
//! Idle -> Charging -> Resolving -> Idle, driven by [`InputEvent`]s and the
//! round-end timer. Every transition returns the [`GameEvent`]s it produced so
//! the shell can fan them out to particles, audio and reporting.

use glam::Vec2;
use rand::Rng;

use super::ballistics::resolve_with_rng;
use super::input::{InputEvent, Key};
use super::state::{
    GamePhase, GameState, Impact, PullState, ResultMessage, ScoreTier, SessionStats, WindVector,
};
use super::wind::generate_wind;
use crate::clamp_to_square;
use crate::consts::*;

/// Something a transition did that the outside world may react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Bow drawn from idle
    ChargeStarted,
    /// Charging power crossed another tension step
    Tension { intensity: f32 },
    /// Arrow loosed
    Released { power: f32 },
    /// Arrow landed; `shot_id` must be handed back to [`finish_round`]
    Resolved { impact: Impact, shot_id: u64 },
    /// Back to idle with fresh wind
    RoundEnded { wind: WindVector },
    /// Last arrow of the match resolved
    MatchFinished { score: u32, attempts: u32 },
    SessionReset,
}

/// Feed one input event through the state machine
///
/// Input that has no meaning in the current phase is dropped. While resolving
/// that covers everything, which keeps a second release from firing before
/// the round-end timer.
pub fn handle_input(
    state: &mut GameState,
    event: &InputEvent,
    now_ms: f64,
    rng: &mut impl Rng,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    match (state.phase, *event) {
        (GamePhase::Idle, InputEvent::PointerDown { pos }) => {
            state.aim = clamp_to_square(pos, AIM_BOUND);
            begin_charge(state, pos, &mut events);
        }
        (GamePhase::Idle, InputEvent::PointerMove { pos }) => {
            state.aim = clamp_to_square(pos, AIM_BOUND);
        }
        (
            GamePhase::Idle,
            InputEvent::KeyDown {
                key: Key::Charge,
                repeat: false,
            },
        ) => {
            let origin = state.aim;
            begin_charge(state, origin, &mut events);
        }
        (
            GamePhase::Idle,
            InputEvent::KeyDown {
                key: Key::QuickFire,
                repeat: false,
            },
        ) => {
            release(state, QUICK_FIRE_POWER, now_ms, rng, &mut events);
        }
        (GamePhase::Idle, InputEvent::KeyDown { key, .. }) => {
            if let Some(dir) = key.aim_direction() {
                state.aim = clamp_to_square(state.aim + dir * AIM_KEY_STEP, AIM_BOUND);
            }
        }
        (GamePhase::Charging, InputEvent::PointerMove { pos }) => {
            state.aim = clamp_to_square(pos, AIM_BOUND);
            // Any drag direction draws the bow
            let distance = (pos - state.pull.origin).length();
            let power = (distance / MAX_PULL_DISTANCE * MAX_POWER).min(MAX_POWER);
            set_power(state, power, &mut events);
        }
        (
            GamePhase::Charging,
            InputEvent::KeyDown {
                key: Key::Charge,
                repeat: true,
            },
        ) => {
            let power = (state.pull.power + KEY_PULL_STEP).min(MAX_POWER);
            set_power(state, power, &mut events);
        }
        (
            GamePhase::Charging,
            InputEvent::PointerUp
            | InputEvent::PointerLeave
            | InputEvent::KeyUp { key: Key::Charge }
            | InputEvent::KeyDown {
                key: Key::QuickFire,
                ..
            },
        ) => {
            let power = state.pull.power;
            release(state, power, now_ms, rng, &mut events);
        }
        (phase, event) => {
            log::trace!("Ignoring {:?} in {:?}", event, phase);
        }
    }

    events
}

/// Round-end timer callback for the shot identified by `shot_id`
///
/// A timer that outlived its shot (the session was reset meanwhile) is a no-op.
pub fn finish_round(state: &mut GameState, shot_id: u64, rng: &mut impl Rng) -> Vec<GameEvent> {
    if state.phase != GamePhase::Resolving || shot_id != state.shot_id {
        log::trace!(
            "Stale round-end for shot {} (current {}, {:?})",
            shot_id,
            state.shot_id,
            state.phase
        );
        return Vec::new();
    }

    state.message = None;

    if state.arrows_left() == Some(0) {
        state.phase = GamePhase::Finished;
        log::info!(
            "Match finished: {} points from {} arrows",
            state.stats.score,
            state.stats.attempts
        );
        return vec![GameEvent::MatchFinished {
            score: state.stats.score,
            attempts: state.stats.attempts,
        }];
    }

    state.wind = generate_wind(rng);
    state.phase = GamePhase::Idle;
    log::debug!(
        "Round over, wind {:.1} {:?}",
        state.wind.speed,
        state.wind.direction
    );
    vec![GameEvent::RoundEnded { wind: state.wind }]
}

/// Explicit user reset: clear counters and history, start a new round
pub fn reset(state: &mut GameState, rng: &mut impl Rng) -> Vec<GameEvent> {
    state.stats = SessionStats::default();
    state.impacts.clear();
    state.message = None;
    state.pull = PullState::default();
    state.tension_level = 0;
    state.aim = Vec2::ZERO;
    // Invalidates any pending round-end timer
    state.shot_id += 1;
    state.wind = generate_wind(rng);
    state.phase = GamePhase::Idle;
    log::info!("Session reset");
    vec![GameEvent::SessionReset]
}

fn begin_charge(state: &mut GameState, origin: Vec2, events: &mut Vec<GameEvent>) {
    state.pull = PullState::begin(origin);
    state.tension_level = 0;
    state.phase = GamePhase::Charging;
    events.push(GameEvent::ChargeStarted);
}

fn set_power(state: &mut GameState, power: f32, events: &mut Vec<GameEvent>) {
    state.pull.power = power;
    let level = (power / TENSION_STEP).floor() as u32;
    if level > state.tension_level {
        events.push(GameEvent::Tension {
            intensity: power / MAX_POWER,
        });
    }
    state.tension_level = level;
}

fn release(
    state: &mut GameState,
    power: f32,
    now_ms: f64,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    state.pull = PullState::default();
    state.tension_level = 0;

    let impact = resolve_with_rng(state.aim, power, &state.wind, rng);
    state.record_impact(impact);
    state.stats.score += impact.score;
    state.stats.attempts += 1;
    if impact.tier == ScoreTier::Perfect {
        state.stats.perfects += 1;
    }
    state.message = Some(ResultMessage::for_impact(&impact, now_ms));
    state.shot_id += 1;
    state.phase = GamePhase::Resolving;

    log::debug!(
        "Shot {} at power {:.0}: ({:.2}, {:.2}) scores {}",
        state.shot_id,
        power,
        impact.pos.x,
        impact.pos.y,
        impact.score
    );

    events.push(GameEvent::Released { power });
    events.push(GameEvent::Resolved {
        impact,
        shot_id: state.shot_id,
    });
}
