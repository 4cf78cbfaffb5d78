//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches the browser:
//! - Randomness is injected (`impl Rng`)
//! - Time is passed in by the caller
//! - Transitions report what happened as `GameEvent`s

pub mod ballistics;
pub mod input;
pub mod particles;
pub mod session;
pub mod state;
pub mod wind;

pub use ballistics::{flight_time, resolve, resolve_with_rng, sample_jitter, score_for_distance};
pub use input::{InputEvent, Key};
pub use particles::{Particle, ParticleEngine};
pub use session::{GameEvent, finish_round, handle_input, reset};
pub use state::{
    GamePhase, GameState, Impact, PullState, ResultMessage, ScoreTier, SessionStats,
    WindDirection, WindVector,
};
pub use wind::generate_wind;
