//! Game settings and preferences
//!
//! Persisted separately from scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ARROWS_PER_MATCH;
use crate::ranking::DEFAULT_PLAYER_NAME;
use crate::storage;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Particle burst multiplier for this preset
    pub fn burst_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.25,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }

    /// Tessellation segments for full circles
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 24,
            QualityPreset::Medium => 48,
            QualityPreset::High => 96,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle bursts on perfect shots
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no aim wobble while drawing)
    pub reduced_motion: bool,

    // === Match ===
    /// Arrows per match (0 = endless)
    pub arrows_per_match: u32,
    /// Name sent with finished matches
    pub player_name: String,
    /// Report finished matches to the leaderboard
    pub submit_scores: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,

            arrows_per_match: DEFAULT_ARROWS_PER_MATCH,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            submit_scores: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "bullseye_settings";

    /// Effective particle burst multiplier
    pub fn burst_scale(&self) -> f32 {
        if !self.particles {
            0.0
        } else {
            self.quality.burst_scale()
        }
    }

    /// Parse persisted JSON, falling back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    /// Stored settings, or defaults when there are none
    pub fn load() -> Self {
        match storage::read(Self::STORAGE_KEY) {
            Some(json) => Self::from_json(&json),
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if storage::write_json(Self::STORAGE_KEY, self) {
            log::debug!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_off_disables_bursts() {
        let mut settings = Settings {
            quality: QualityPreset::High,
            ..Settings::default()
        };
        assert_eq!(settings.burst_scale(), 1.0);
        settings.particles = false;
        assert_eq!(settings.burst_scale(), 0.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"muted": true, "arrows_per_match": 6}"#);
        assert!(settings.muted);
        assert_eq!(settings.arrows_per_match, 6);
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert!(settings.submit_scores);
    }

    #[test]
    fn test_garbage_json_falls_back() {
        let settings = Settings::from_json("not json");
        assert_eq!(settings.arrows_per_match, DEFAULT_ARROWS_PER_MATCH);
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut settings = Settings::default();
        settings.player_name = "Robin".into();
        settings.reduced_motion = true;
        let json = serde_json::to_string(&settings).unwrap();
        let back = Settings::from_json(&json);
        assert_eq!(back.player_name, "Robin");
        assert!(back.reduced_motion);
    }

    #[test]
    fn test_default_player_name_is_submittable() {
        let settings = Settings::default();
        assert_eq!(settings.player_name, DEFAULT_PLAYER_NAME);
        let accepted = crate::ranking::RankingSubmission::new(&settings.player_name, 87)
            .validate()
            .unwrap();
        assert_eq!(accepted.name, DEFAULT_PLAYER_NAME);
        let json = r#"{"muted": false}"#;
        assert_eq!(Settings::from_json(json).player_name, DEFAULT_PLAYER_NAME);
    }
}
