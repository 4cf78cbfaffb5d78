//! Game state and core simulation types
//!
//! Everything the renderer reads lives here. Only the transitions in
//! `session` write to it.

use glam::Vec2;
use rand::Rng;

use super::wind::generate_wind;
use crate::consts::*;

/// Current phase of the input state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Free aiming
    Idle,
    /// Pointer or charge key held, power rising
    Charging,
    /// Shot fired, result on screen, input rejected
    Resolving,
    /// Every arrow of the match has been shot
    Finished,
}

/// Horizontal wind direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindDirection {
    Left,
    Right,
}

impl WindDirection {
    /// +1 for right, -1 for left
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            WindDirection::Left => -1.0,
            WindDirection::Right => 1.0,
        }
    }
}

/// Wind for one round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindVector {
    /// Speed in [0, WIND_MAX_SPEED)
    pub speed: f32,
    pub direction: WindDirection,
}

impl WindVector {
    pub const CALM: WindVector = WindVector {
        speed: 0.0,
        direction: WindDirection::Right,
    };
}

/// Bow draw state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PullState {
    pub active: bool,
    /// 0..=100, nonzero only while active
    pub power: f32,
    /// Where the drag started
    pub origin: Vec2,
}

impl PullState {
    pub fn begin(origin: Vec2) -> Self {
        Self {
            active: true,
            power: 0.0,
            origin,
        }
    }
}

/// Score bands that drive effects, sound and message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreTier {
    Miss,
    Outer,
    Inner,
    Gold,
    Perfect,
}

impl ScoreTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => ScoreTier::Miss,
            1..=4 => ScoreTier::Outer,
            5..=7 => ScoreTier::Inner,
            8 | 9 => ScoreTier::Gold,
            _ => ScoreTier::Perfect,
        }
    }

    /// Particles spawned for this tier before quality scaling
    pub fn burst_count(self) -> usize {
        match self {
            ScoreTier::Perfect => PERFECT_BURST,
            _ => 0,
        }
    }
}

/// A resolved shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub pos: Vec2,
    pub score: u32,
    pub tier: ScoreTier,
    /// Power the arrow was released with
    pub power: f32,
}

/// Result text shown while resolving
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMessage {
    pub text: String,
    pub tier: ScoreTier,
    /// Timestamp (ms) when the shot resolved
    pub shown_at_ms: f64,
}

impl ResultMessage {
    pub fn for_impact(impact: &Impact, shown_at_ms: f64) -> Self {
        let text = match impact.tier {
            ScoreTier::Miss => "Miss".to_string(),
            ScoreTier::Perfect => "PERFECT! +10".to_string(),
            ScoreTier::Gold => format!("Great shot! +{}", impact.score),
            _ => format!("+{}", impact.score),
        };
        Self {
            text,
            tier: impact.tier,
            shown_at_ms,
        }
    }

    /// Opacity at `now_ms`, fading linearly over the round-end delay
    pub fn alpha_at(&self, now_ms: f64) -> f32 {
        let elapsed = (now_ms - self.shown_at_ms).max(0.0);
        (1.0 - elapsed / ROUND_END_DELAY_MS).clamp(0.0, 1.0) as f32
    }
}

/// Per-session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub score: u32,
    pub attempts: u32,
    /// Count of 10s
    pub perfects: u32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub aim: Vec2,
    pub pull: PullState,
    pub wind: WindVector,
    /// Most recent last, bounded by IMPACT_HISTORY_LEN
    pub impacts: Vec<Impact>,
    pub stats: SessionStats,
    pub message: Option<ResultMessage>,
    /// Arrows per match (0 = endless)
    pub arrows_per_match: u32,
    /// Identifies the shot in flight; round-end timers carry it
    pub shot_id: u64,
    /// Last tension step reported while charging
    pub(crate) tension_level: u32,
}

impl GameState {
    /// Fresh session with a generated wind
    pub fn new(arrows_per_match: u32, rng: &mut impl Rng) -> Self {
        Self {
            phase: GamePhase::Idle,
            aim: Vec2::ZERO,
            pull: PullState::default(),
            wind: generate_wind(rng),
            impacts: Vec::with_capacity(IMPACT_HISTORY_LEN),
            stats: SessionStats::default(),
            message: None,
            arrows_per_match,
            shot_id: 0,
            tension_level: 0,
        }
    }

    /// Append an impact, evicting the oldest past the bound
    pub fn record_impact(&mut self, impact: Impact) {
        self.impacts.push(impact);
        if self.impacts.len() > IMPACT_HISTORY_LEN {
            self.impacts.remove(0);
        }
    }

    pub fn latest_impact(&self) -> Option<&Impact> {
        self.impacts.last()
    }

    /// Arrows left in the match (None when endless)
    pub fn arrows_left(&self) -> Option<u32> {
        (self.arrows_per_match > 0)
            .then(|| self.arrows_per_match.saturating_sub(self.stats.attempts))
    }

    pub fn accepts_input(&self) -> bool {
        matches!(self.phase, GamePhase::Idle | GamePhase::Charging)
    }
}
