//! Platform-independent game controller
//!
//! Owns the simulation state and the side systems (particles, audio,
//! persistence) and routes every [`GameEvent`] to them. The browser shell
//! only translates DOM events into calls here and carries out the returned
//! [`ShellAction`]s (timers), so the whole flow also runs headless.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioBackend, AudioCues};
use crate::consts::*;
use crate::ranking::{self, RankingSubmission};
use crate::renderer::FrameInfo;
use crate::sim::{
    GameEvent, GamePhase, GameState, InputEvent, ParticleEngine, ScoreTier, finish_round,
    handle_input, reset,
};
use crate::{HighScores, Settings};

/// Work the host must schedule on behalf of the game
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellAction {
    /// Call [`Game::round_end`] with `shot_id` after `delay_ms`
    ScheduleRoundEnd { shot_id: u64, delay_ms: f64 },
    /// Drop any pending round-end timer
    CancelRoundEnd,
}

/// Text and counters for the DOM overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub attempts: u32,
    pub arrows_left: Option<u32>,
    pub power: u32,
    pub wind: String,
    /// Result text and its current opacity
    pub message: Option<(String, f32)>,
    pub finished: bool,
    pub best: Option<u32>,
}

pub struct Game<B: AudioBackend> {
    pub state: GameState,
    pub particles: ParticleEngine,
    pub audio: AudioCues<B>,
    pub settings: Settings,
    pub highscores: HighScores,
    /// Most recent submission handed to the leaderboard
    pub last_report: Option<RankingSubmission>,
    rng: Pcg32,
}

impl<B: AudioBackend> Game<B> {
    pub fn new(seed: u64, settings: Settings, highscores: HighScores, audio: AudioCues<B>) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = GameState::new(settings.arrows_per_match, &mut rng);
        let particles = ParticleEngine::new(seed ^ 0x9E37_79B9_7F4A_7C15, settings.burst_scale());
        let mut audio = audio;
        audio.apply_settings(&settings);

        Self {
            state,
            particles,
            audio,
            settings,
            highscores,
            last_report: None,
            rng,
        }
    }

    /// Push new preferences into every subsystem
    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio.apply_settings(&settings);
        self.particles.set_burst_scale(settings.burst_scale());
        // Arrow count only changes between matches
        if self.state.stats.attempts == 0 {
            self.state.arrows_per_match = settings.arrows_per_match;
        }
        self.settings = settings;
        self.settings.save();
    }

    /// Route one input event through the state machine
    pub fn input(&mut self, event: InputEvent, now_ms: f64) -> Vec<ShellAction> {
        let events = handle_input(&mut self.state, &event, now_ms, &mut self.rng);
        self.dispatch(events, now_ms)
    }

    /// Round-end timer fired
    pub fn round_end(&mut self, shot_id: u64, now_ms: f64) -> Vec<ShellAction> {
        let events = finish_round(&mut self.state, shot_id, &mut self.rng);
        self.dispatch(events, now_ms)
    }

    /// Start a fresh session
    pub fn reset(&mut self, now_ms: f64) -> Vec<ShellAction> {
        self.state.arrows_per_match = self.settings.arrows_per_match;
        let events = reset(&mut self.state, &mut self.rng);
        self.dispatch(events, now_ms)
    }

    /// Per-frame update of the purely visual systems
    pub fn tick(&mut self, dt: f32) {
        self.particles.tick(dt);
    }

    fn dispatch(&mut self, events: Vec<GameEvent>, now_ms: f64) -> Vec<ShellAction> {
        let mut actions = Vec::new();

        for event in events {
            match event {
                GameEvent::ChargeStarted => {
                    // First gesture is the earliest point a browser allows audio
                    self.audio.init();
                }
                GameEvent::Tension { intensity } => self.audio.tension(intensity),
                GameEvent::Released { power } => {
                    self.audio.release(power);
                    self.audio.flight(power);
                }
                GameEvent::Resolved { impact, shot_id } => {
                    match impact.tier {
                        ScoreTier::Miss => self.audio.miss(),
                        ScoreTier::Perfect => {
                            self.audio.perfect();
                            self.particles.spawn(impact.pos, impact.tier);
                        }
                        tier => self.audio.hit(tier),
                    }
                    actions.push(ShellAction::ScheduleRoundEnd {
                        shot_id,
                        delay_ms: ROUND_END_DELAY_MS,
                    });
                }
                GameEvent::RoundEnded { .. } => {}
                GameEvent::MatchFinished { score, attempts } => {
                    log::info!("Match finished: {} points from {} arrows", score, attempts);
                    self.record_match(score, now_ms);
                }
                GameEvent::SessionReset => {
                    self.particles.clear();
                    actions.push(ShellAction::CancelRoundEnd);
                }
            }
        }

        actions
    }

    fn record_match(&mut self, score: u32, now_ms: f64) {
        let name = ranking::display_name(&self.settings.player_name);
        if let Some(rank) = self.highscores.record(&name, score, now_ms.max(0.0) as u64) {
            log::info!("New local best #{}: {}", rank, score);
            self.highscores.save();
        }

        if !self.settings.submit_scores {
            return;
        }
        match ranking::submission_for(&name, score) {
            Ok(submission) => {
                ranking::report_score(&submission);
                self.last_report = Some(submission);
            }
            Err(e) => log::info!("Score not submitted: {}", e),
        }
    }

    /// Timers to re-arm after the host dropped them (page restored from cache)
    pub fn resume_actions(&self) -> Vec<ShellAction> {
        match self.state.phase {
            GamePhase::Resolving => vec![ShellAction::ScheduleRoundEnd {
                shot_id: self.state.shot_id,
                delay_ms: ROUND_END_DELAY_MS,
            }],
            _ => Vec::new(),
        }
    }

    /// Render options for one frame
    pub fn frame_info(&self, time_ms: f64) -> FrameInfo {
        FrameInfo {
            time_ms,
            reduced_motion: self.settings.reduced_motion,
            circle_segments: self.settings.quality.circle_segments(),
        }
    }

    /// Snapshot of everything the overlay shows
    pub fn hud(&self, now_ms: f64) -> Hud {
        let wind = &self.state.wind;
        let arrow = if wind.direction.sign() > 0.0 { "→" } else { "←" };
        Hud {
            score: self.state.stats.score,
            attempts: self.state.stats.attempts,
            arrows_left: self.state.arrows_left(),
            power: self.state.pull.power.round() as u32,
            wind: format!("{} {:.1}", arrow, wind.speed),
            message: self
                .state
                .message
                .as_ref()
                .map(|m| (m.text.clone(), m.alpha_at(now_ms))),
            finished: self.state.phase == GamePhase::Finished,
            best: self.highscores.top_score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{LogBackend, Voice};
    use crate::settings::QualityPreset;
    use crate::sim::WindVector;
    use glam::Vec2;
    use std::cell::Cell;

    const DEFAULT_NAME: &str = ranking::DEFAULT_PLAYER_NAME;

    thread_local! {
        static VOICES: Cell<usize> = const { Cell::new(0) };
    }

    struct Counting;

    impl AudioBackend for Counting {
        fn play_voice(&self, _voice: &Voice, _volume: f32) {
            VOICES.with(|v| v.set(v.get() + 1));
        }
    }

    fn counting_game(arrows: u32) -> Game<Counting> {
        VOICES.with(|v| v.set(0));
        let settings = Settings {
            arrows_per_match: arrows,
            submit_scores: false,
            ..Settings::default()
        };
        Game::new(7, settings, HighScores::new(), AudioCues::new(|| Some(Counting)))
    }

    fn shoot<B: AudioBackend>(game: &mut Game<B>, now_ms: f64) -> Vec<ShellAction> {
        game.input(
            InputEvent::KeyDown {
                key: crate::sim::Key::QuickFire,
                repeat: false,
            },
            now_ms,
        )
    }

    fn scheduled(actions: &[ShellAction]) -> u64 {
        match actions {
            [ShellAction::ScheduleRoundEnd { shot_id, delay_ms }] => {
                assert_eq!(*delay_ms, ROUND_END_DELAY_MS);
                *shot_id
            }
            other => panic!("expected one round-end, got {:?}", other),
        }
    }

    #[test]
    fn test_shot_schedules_round_end_and_plays_cues() {
        let mut game = counting_game(0);
        let shot = scheduled(&shoot(&mut game, 0.0));
        assert_eq!(game.state.phase, GamePhase::Resolving);
        assert!(VOICES.with(|v| v.get()) > 0);

        assert!(game.round_end(shot, ROUND_END_DELAY_MS).is_empty());
        assert_eq!(game.state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_stale_timer_after_reset_is_ignored() {
        let mut game = counting_game(0);
        let shot = scheduled(&shoot(&mut game, 0.0));
        assert_eq!(game.reset(10.0), vec![ShellAction::CancelRoundEnd]);

        game.round_end(shot, 1500.0);
        assert_eq!(game.state.phase, GamePhase::Idle);
        assert_eq!(game.state.stats.attempts, 0);
    }

    #[test]
    fn test_muted_game_is_silent() {
        let mut game = counting_game(0);
        game.apply_settings(Settings {
            muted: true,
            submit_scores: false,
            ..Settings::default()
        });
        shoot(&mut game, 0.0);
        assert_eq!(VOICES.with(|v| v.get()), 0);
    }

    /// Shoot a whole match dead center in still air; returns the end time
    fn play_calm_match<B: AudioBackend>(game: &mut Game<B>) -> f64 {
        let mut now = 1000.0;
        while game.state.phase != GamePhase::Finished {
            // Each round end rolls new wind
            game.state.wind = WindVector::CALM;
            game.state.aim = Vec2::ZERO;
            let shot = scheduled(&shoot(game, now));
            now += ROUND_END_DELAY_MS;
            game.round_end(shot, now);
        }
        now
    }

    fn log_game(settings: Settings) -> Game<LogBackend> {
        Game::new(3, settings, HighScores::new(), AudioCues::new(LogBackend::create))
    }

    #[test]
    fn test_match_end_records_local_best() {
        let mut game = log_game(Settings {
            arrows_per_match: 3,
            submit_scores: false,
            ..Settings::default()
        });
        let now = play_calm_match(&mut game);

        let hud = game.hud(now);
        assert!(hud.finished);
        assert_eq!(hud.arrows_left, Some(0));
        assert_eq!(hud.attempts, 3);
        // Quick-fire jitter stays inside the bull without wind
        assert_eq!(hud.score, 30);
        assert_eq!(hud.best, Some(30));
        assert_eq!(game.highscores.entries()[0].name, DEFAULT_NAME);
        assert_eq!(game.highscores.entries()[0].date, now as u64);
        assert_eq!(game.last_report, None);

        // Finished rejects input until reset
        assert!(shoot(&mut game, now).is_empty());
        game.reset(now);
        assert_eq!(game.state.arrows_left(), Some(3));
    }

    #[test]
    fn test_default_settings_match_reports_valid_submission() {
        let mut game = log_game(Settings {
            arrows_per_match: 2,
            ..Settings::default()
        });
        play_calm_match(&mut game);

        let report = game.last_report.clone().expect("finished match is reported");
        assert_eq!(report.game, ranking::GAME_ID);
        assert_eq!(report.name, DEFAULT_NAME);
        assert_eq!(report.score, 20.0);
        assert_eq!(report.validate(), Ok(report.clone()));
    }

    #[test]
    fn test_unusable_name_still_reports_under_default() {
        let mut game = log_game(Settings {
            arrows_per_match: 1,
            player_name: "<>".into(),
            ..Settings::default()
        });
        play_calm_match(&mut game);
        assert_eq!(
            game.last_report.as_ref().map(|r| r.name.as_str()),
            Some(DEFAULT_NAME)
        );
    }

    #[test]
    fn test_frame_info_follows_settings() {
        let mut game = counting_game(0);
        let frame = game.frame_info(5.0);
        assert_eq!(frame.time_ms, 5.0);
        assert!(!frame.reduced_motion);
        assert_eq!(frame.circle_segments, QualityPreset::Medium.circle_segments());

        game.apply_settings(Settings {
            reduced_motion: true,
            quality: QualityPreset::Low,
            ..Settings::default()
        });
        let frame = game.frame_info(6.0);
        assert!(frame.reduced_motion);
        assert_eq!(frame.circle_segments, QualityPreset::Low.circle_segments());
    }

    #[test]
    fn test_resume_rearms_dropped_round_end() {
        let mut game = counting_game(0);
        assert!(game.resume_actions().is_empty());

        let shot = scheduled(&shoot(&mut game, 0.0));
        // Host lost the timer while the page was hidden
        assert_eq!(scheduled(&game.resume_actions()), shot);
        game.round_end(shot, 60_000.0);
        assert_eq!(game.state.phase, GamePhase::Idle);
        assert!(game.resume_actions().is_empty());
    }

    #[test]
    fn test_hud_message_fades() {
        let mut game = counting_game(0);
        shoot(&mut game, 1000.0);
        let (_, fresh) = game.hud(1000.0).message.unwrap();
        let (_, later) = game.hud(1000.0 + ROUND_END_DELAY_MS / 2.0).message.unwrap();
        assert_eq!(fresh, 1.0);
        assert!((later - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_settings_change_applies_between_matches_only() {
        let mut game = counting_game(10);
        shoot(&mut game, 0.0);
        game.apply_settings(Settings {
            arrows_per_match: 4,
            submit_scores: false,
            ..Settings::default()
        });
        assert_eq!(game.state.arrows_per_match, 10);
        game.reset(0.0);
        assert_eq!(game.state.arrows_per_match, 4);
    }
}
