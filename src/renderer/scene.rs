//! Frame builder
//!
//! Turns a read-only view of the game into one triangle list in game units.
//! Nothing here can touch gameplay state.

use glam::Vec2;

use super::shapes::{self, with_alpha};
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::sim::{GamePhase, GameState, Particle, WindVector};

/// Peak aim wobble at full draw
const AIM_WOBBLE_MAX: f32 = 0.9;
/// Height of the HUD strip above and below the aim square
const HUD_Y: f32 = AIM_BOUND + 3.0;
const BAR_HALF_WIDTH: f32 = 14.0;
const BAR_HEIGHT: f32 = 1.4;

/// Per-frame inputs that are not game state
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    /// Frame timestamp (ms)
    pub time_ms: f64,
    pub reduced_motion: bool,
    /// Tessellation for full circles
    pub circle_segments: u32,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self {
            time_ms: 0.0,
            reduced_motion: false,
            circle_segments: 48,
        }
    }
}

/// Ring fill from the outermost (index 0) inwards, two rings per color
fn ring_color(index_from_outside: u32) -> [f32; 4] {
    match index_from_outside / 2 {
        0 => colors::RING_WHITE,
        1 => colors::RING_BLACK,
        2 => colors::RING_BLUE,
        3 => colors::RING_RED,
        _ => colors::RING_GOLD,
    }
}

/// Drawn offset of the aim marker; grows with draw power
pub fn aim_wobble(power: f32, time_ms: f64, reduced_motion: bool) -> Vec2 {
    if reduced_motion || power <= 0.0 {
        return Vec2::ZERO;
    }
    let amp = AIM_WOBBLE_MAX * (power / MAX_POWER).clamp(0.0, 1.0);
    let t = (time_ms / 1000.0) as f32;
    // Two incommensurate frequencies keep the motion from looking periodic
    Vec2::new((t * 7.3).sin(), (t * 5.1).cos()) * amp
}

/// Charge bar fill color, green at rest to red at full draw
fn bar_color(power01: f32) -> [f32; 4] {
    let mut c = [0.0; 4];
    for (i, out) in c.iter_mut().enumerate() {
        *out = colors::BAR_LOW[i] + (colors::BAR_HIGH[i] - colors::BAR_LOW[i]) * power01;
    }
    c
}

fn target(out: &mut Vec<Vertex>, segments: u32) {
    // Stand legs behind the face
    shapes::line(
        out,
        Vec2::new(-TARGET_RADIUS * 0.6, -AIM_BOUND),
        Vec2::new(0.0, 0.0),
        1.2,
        colors::TARGET_STAND,
    );
    shapes::line(
        out,
        Vec2::new(TARGET_RADIUS * 0.6, -AIM_BOUND),
        Vec2::new(0.0, 0.0),
        1.2,
        colors::TARGET_STAND,
    );

    let ring_width = TARGET_RADIUS / RING_COUNT as f32;
    for i in 0..RING_COUNT {
        let radius = TARGET_RADIUS - i as f32 * ring_width;
        shapes::circle(out, Vec2::ZERO, radius, ring_color(i), segments);
        shapes::ring(
            out,
            Vec2::ZERO,
            radius - 0.08,
            radius,
            colors::RING_LINE,
            segments,
        );
    }
}

fn impacts(out: &mut Vec<Vertex>, state: &GameState) {
    let n = state.impacts.len();
    for (i, impact) in state.impacts.iter().enumerate() {
        let latest = i + 1 == n;
        if latest {
            shapes::ring(out, impact.pos, 0.55, 0.8, colors::IMPACT_LATEST, 16);
            shapes::circle(out, impact.pos, 0.45, colors::IMPACT, 12);
        } else {
            // Older hits fade toward the back of the history
            let age = (n - 1 - i) as f32 / IMPACT_HISTORY_LEN as f32;
            let alpha = colors::IMPACT[3] * (1.0 - 0.6 * age);
            shapes::circle(out, impact.pos, 0.35, with_alpha(colors::IMPACT, alpha), 10);
        }
    }
}

fn particles(out: &mut Vec<Vertex>, list: &[Particle]) {
    for p in list {
        let color = [p.color[0], p.color[1], p.color[2], p.alpha.clamp(0.0, 1.0)];
        shapes::circle(out, p.pos, p.size, color, 6);
    }
}

fn aim_marker(out: &mut Vec<Vertex>, state: &GameState, frame: &FrameInfo) {
    let charging = state.phase == GamePhase::Charging;
    let power = if charging { state.pull.power } else { 0.0 };
    let pos = state.aim + aim_wobble(power, frame.time_ms, frame.reduced_motion);

    let alpha = if state.accepts_input() { 1.0 } else { 0.4 };
    let color = with_alpha(colors::AIM, colors::AIM[3] * alpha);
    shapes::crosshair(out, pos, 1.4, 0.18, color);
    shapes::ring(out, pos, 0.9, 1.08, color, 24);

    if charging {
        // Draw string from the drag origin
        shapes::line(
            out,
            state.pull.origin,
            state.aim,
            0.1,
            with_alpha(colors::AIM, 0.35),
        );
    }
}

/// Arrow at the top of the view: length by speed, pointing downwind
pub fn wind_indicator(out: &mut Vec<Vertex>, wind: &WindVector) {
    let anchor = Vec2::new(0.0, HUD_Y);
    let half = 1.0 + (wind.speed / WIND_MAX_SPEED).clamp(0.0, 1.0) * 9.0;
    let dir = Vec2::X * wind.direction.sign();
    if wind.speed < 0.05 {
        shapes::circle(out, anchor, 0.5, colors::WIND, 12);
        return;
    }
    shapes::arrow(out, anchor - dir * half, anchor + dir * half, 0.5, colors::WIND);
}

/// Horizontal draw-strength bar at the bottom of the view
pub fn charge_bar(out: &mut Vec<Vertex>, power: f32) {
    let power01 = (power / MAX_POWER).clamp(0.0, 1.0);
    let min = Vec2::new(-BAR_HALF_WIDTH, -HUD_Y - BAR_HEIGHT * 0.5);
    let max = Vec2::new(BAR_HALF_WIDTH, -HUD_Y + BAR_HEIGHT * 0.5);
    shapes::rect(out, min, max, colors::BAR_TRACK);
    if power01 > 0.0 {
        let fill_max = Vec2::new(min.x + (max.x - min.x) * power01, max.y);
        shapes::rect(out, min, fill_max, bar_color(power01));
    }
}

/// Build the whole frame
pub fn build_scene(
    state: &GameState,
    particle_list: &[Particle],
    frame: &FrameInfo,
) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(8192);

    target(&mut out, frame.circle_segments);
    impacts(&mut out, state);
    particles(&mut out, particle_list);
    if state.phase != GamePhase::Finished {
        aim_marker(&mut out, state, frame);
    }
    wind_indicator(&mut out, &state.wind);
    charge_bar(&mut out, state.pull.power);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Impact, ScoreTier, WindDirection};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state() -> GameState {
        let mut rng = Pcg32::seed_from_u64(11);
        GameState::new(10, &mut rng)
    }

    #[test]
    fn test_wobble_scales_with_power() {
        let t = 1234.0;
        assert_eq!(aim_wobble(0.0, t, false), Vec2::ZERO);
        let half = aim_wobble(50.0, t, false).length();
        let full = aim_wobble(100.0, t, false).length();
        assert!((full - half * 2.0).abs() < 1e-4);
        assert!(full <= AIM_WOBBLE_MAX * std::f32::consts::SQRT_2 + 1e-4);
    }

    #[test]
    fn test_reduced_motion_disables_wobble() {
        assert_eq!(aim_wobble(100.0, 777.0, true), Vec2::ZERO);
    }

    #[test]
    fn test_charge_bar_fill_only_when_drawn() {
        let mut empty = Vec::new();
        charge_bar(&mut empty, 0.0);
        assert_eq!(empty.len(), 6);

        let mut full = Vec::new();
        charge_bar(&mut full, 100.0);
        assert_eq!(full.len(), 12);
        let right = full[6..].iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((right - BAR_HALF_WIDTH).abs() < 1e-4);
    }

    #[test]
    fn test_wind_arrow_points_downwind() {
        let mut out = Vec::new();
        let wind = WindVector {
            speed: 8.0,
            direction: WindDirection::Left,
        };
        wind_indicator(&mut out, &wind);
        // Tip of the head is the last vertex pushed
        let tip = out.last().map(|v| v.position[0]).unwrap();
        assert!(tip < 0.0);
    }

    #[test]
    fn test_scene_grows_with_history_and_particles() {
        let mut s = state();
        let frame = FrameInfo::default();
        let base = build_scene(&s, &[], &frame).len();

        s.record_impact(Impact {
            pos: Vec2::new(1.0, 1.0),
            score: 9,
            tier: ScoreTier::Gold,
            power: 70.0,
        });
        let with_hit = build_scene(&s, &[], &frame).len();
        assert!(with_hit > base);

        let p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            color: [1.0; 3],
            alpha: 0.5,
            size: 0.3,
        };
        assert_eq!(build_scene(&s, &[p], &frame).len(), with_hit + 6 * 3);
    }

    #[test]
    fn test_everything_inside_view() {
        let mut s = state();
        s.aim = Vec2::splat(AIM_BOUND);
        s.pull.power = 100.0;
        s.phase = GamePhase::Charging;
        let verts = build_scene(&s, &[], &FrameInfo::default());
        for v in verts {
            assert!(v.position[0].abs() <= VIEW_RADIUS);
            assert!(v.position[1].abs() <= VIEW_RADIUS);
        }
    }
}
