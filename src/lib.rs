//! Bullseye - an aim-and-release archery game
//!
//! Core modules:
//! - `sim`: Simulation (wind, ballistics, input state machine, particles)
//! - `game`: Routes simulation events to effects, audio and persistence
//! - `audio`: Procedural sound cues with a lazily built backend
//! - `renderer`: Scene tessellation and the WebGPU pipeline
//! - `ranking`: Leaderboard boundary (validation + score reporting)
//! - `settings` / `highscores`: Persisted preferences and local best matches
//! - `storage`: LocalStorage reads and writes shared by both

pub mod audio;
pub mod game;
pub mod highscores;
pub mod ranking;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod storage;

pub use game::{Game, Hud, ShellAction};
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// Distances are in target units: the target sits at the origin with y up,
/// and the browser shell maps canvas pixels into this space.
pub mod consts {
    /// Target face radius
    pub const TARGET_RADIUS: f32 = 24.0;
    /// Number of equal-width scoring rings on the face
    pub const RING_COUNT: u32 = 10;
    /// Extra room around the face the aim point may wander into
    pub const AIM_MARGIN: f32 = 6.0;
    /// Half-width of the square the aim point is clamped to
    pub const AIM_BOUND: f32 = TARGET_RADIUS + AIM_MARGIN;
    /// Half-extent of the drawn scene (aim square plus HUD gutter)
    pub const VIEW_RADIUS: f32 = 36.0;

    /// Pull power ceiling
    pub const MAX_POWER: f32 = 100.0;
    /// Drag distance that saturates pull power
    pub const MAX_PULL_DISTANCE: f32 = 20.0;
    /// Power gained per auto-repeated charge key press
    pub const KEY_PULL_STEP: f32 = 5.0;
    /// Aim movement per arrow key press
    pub const AIM_KEY_STEP: f32 = 0.5;
    /// Power used when quick-firing from idle
    pub const QUICK_FIRE_POWER: f32 = 60.0;
    /// Power interval between tension cues while charging
    pub const TENSION_STEP: f32 = 10.0;

    /// Wind speed is drawn from [0, WIND_MAX_SPEED)
    pub const WIND_MAX_SPEED: f32 = 10.0;
    /// Drift per unit of wind speed per second of flight
    pub const WIND_FACTOR: f32 = 0.15;
    /// Flight time at zero power (seconds)
    pub const FLIGHT_TIME_MAX: f32 = 1.2;
    /// Flight time shaved off at full power
    pub const FLIGHT_TIME_POWER_SPAN: f32 = 0.6;

    /// Full width of the raw per-axis hand-shake sample
    pub const AIM_JITTER: f32 = 1.0;
    /// Jitter multiplier at zero power
    pub const JITTER_BASE_SCALE: f32 = 0.8;
    /// Extra jitter multiplier at full power
    pub const JITTER_POWER_SCALE: f32 = 1.2;

    /// Impacts kept on the target face
    pub const IMPACT_HISTORY_LEN: usize = 8;
    /// How long a result stays up before the next round starts (ms)
    pub const ROUND_END_DELAY_MS: f64 = 1500.0;
    /// Arrows in a match unless settings say otherwise
    pub const DEFAULT_ARROWS_PER_MATCH: u32 = 10;

    /// Particles in a perfect-shot burst (before quality scaling)
    pub const PERFECT_BURST: usize = 40;
    /// Hard cap on live particles
    pub const MAX_PARTICLES: usize = 256;
    /// Downward acceleration applied to particles (units/s²)
    pub const PARTICLE_GRAVITY: f32 = 30.0;
    /// Alpha lost per second
    pub const PARTICLE_DECAY: f32 = 1.25;
    /// Burst speed range (units/s)
    pub const PARTICLE_SPEED_MIN: f32 = 8.0;
    pub const PARTICLE_SPEED_MAX: f32 = 30.0;
    /// Particle size range (units)
    pub const PARTICLE_SIZE_MIN: f32 = 0.25;
    pub const PARTICLE_SIZE_MAX: f32 = 0.7;
    /// Particle step clamp (seconds) so lifetime is bounded in ticks
    pub const MIN_TICK_DT: f32 = 1.0 / 240.0;
    pub const MAX_TICK_DT: f32 = 0.1;
}

/// Clamp a point to the axis-aligned square of half-width `half`
#[inline]
pub fn clamp_to_square(p: Vec2, half: f32) -> Vec2 {
    Vec2::new(p.x.clamp(-half, half), p.y.clamp(-half, half))
}

/// Scale from game units to NDC for a viewport, keeping the scene square
#[inline]
fn ndc_scale(width: f32, height: f32, view_radius: f32) -> (f32, f32) {
    let aspect = width / height.max(1.0);
    let scale = 1.0 / view_radius;
    if aspect > 1.0 {
        // Wider than tall
        (scale / aspect, scale)
    } else {
        // Taller than wide
        (scale, scale * aspect)
    }
}

/// Convert game coordinates to normalized device coordinates
#[inline]
pub fn game_to_ndc(p: Vec2, width: f32, height: f32, view_radius: f32) -> Vec2 {
    let (sx, sy) = ndc_scale(width, height, view_radius);
    Vec2::new(p.x * sx, p.y * sy)
}

/// Convert a canvas pixel position (origin top-left, y down) to game coordinates
#[inline]
pub fn screen_to_game(px: f32, py: f32, width: f32, height: f32, view_radius: f32) -> Vec2 {
    let ndc_x = (px / width.max(1.0)) * 2.0 - 1.0;
    let ndc_y = 1.0 - (py / height.max(1.0)) * 2.0;
    let (sx, sy) = ndc_scale(width, height, view_radius);
    Vec2::new(ndc_x / sx, ndc_y / sy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_center_maps_to_origin() {
        let p = screen_to_game(400.0, 300.0, 800.0, 600.0, consts::VIEW_RADIUS);
        assert!(p.length() < 1e-4);
    }

    #[test]
    fn test_screen_to_game_inverts_ndc() {
        let (w, h) = (1024.0, 640.0);
        let game = Vec2::new(12.0, -7.5);
        let ndc = game_to_ndc(game, w, h, consts::VIEW_RADIUS);
        let px = (ndc.x + 1.0) * 0.5 * w;
        let py = (1.0 - ndc.y) * 0.5 * h;
        let back = screen_to_game(px, py, w, h, consts::VIEW_RADIUS);
        assert!((back - game).length() < 1e-3);
    }

    #[test]
    fn test_clamp_to_square() {
        let p = clamp_to_square(Vec2::new(50.0, -3.0), 30.0);
        assert_eq!(p, Vec2::new(30.0, -3.0));
    }
}
