//! Leaderboard boundary
//!
//! The leaderboard service lives outside this crate. What lives here is the
//! contract it enforces (name sanitizing, score bounds, ordering) and the
//! outbound report of a finished match.

use serde::{Deserialize, Serialize};

/// Entries returned by a ranking query
pub const RANKING_TOP_N: usize = 10;

/// Maximum characters kept from a submitted name
pub const NAME_MAX_LEN: usize = 16;

/// Scores must stay strictly below this
pub const SCORE_CEILING: f64 = 1_000_000.0;

/// Game identifier sent with every submission
pub const GAME_ID: &str = "archery";

/// Leaderboard endpoint, relative to the page origin
pub const RANKING_ENDPOINT: &str = "/ranking";

/// Name used when the player has not set a usable one
pub const DEFAULT_PLAYER_NAME: &str = "Archer";

/// Validation failures at the leaderboard boundary
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    /// Nothing left of the name after filtering
    #[error("name is empty after sanitizing")]
    EmptyName,

    /// Unknown game identifier
    #[error("invalid game id: {0:?}")]
    InvalidGame(String),

    /// NaN, infinite, negative or at/above the ceiling
    #[error("invalid score: {0}")]
    InvalidScore(f64),
}

fn allowed_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.')
}

/// Filter a display name down to the allowed set and length.
///
/// Never rejects; the result may be empty.
pub fn sanitize_name(raw: &str) -> String {
    let filtered: String = raw.chars().filter(|c| allowed_name_char(*c)).collect();
    filtered
        .trim()
        .chars()
        .take(NAME_MAX_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Sanitized name, or [`DEFAULT_PLAYER_NAME`] when nothing usable is left
pub fn display_name(raw: &str) -> String {
    let name = sanitize_name(raw);
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name
    }
}

/// Body of `POST /ranking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSubmission {
    pub game: String,
    pub name: String,
    pub score: f64,
}

impl RankingSubmission {
    pub fn new(name: &str, score: u32) -> Self {
        Self {
            game: GAME_ID.to_string(),
            name: name.to_string(),
            score: f64::from(score),
        }
    }

    /// Apply the service's acceptance rules, returning the accepted form
    pub fn validate(&self) -> Result<RankingSubmission, RankingError> {
        if self.game != GAME_ID {
            return Err(RankingError::InvalidGame(self.game.clone()));
        }
        if !self.score.is_finite() || self.score < 0.0 || self.score >= SCORE_CEILING {
            return Err(RankingError::InvalidScore(self.score));
        }
        let name = sanitize_name(&self.name);
        if name.is_empty() {
            return Err(RankingError::EmptyName);
        }
        Ok(RankingSubmission {
            game: self.game.clone(),
            name,
            score: self.score.floor(),
        })
    }
}

/// Accepted submission for a finished match played under `player_name`
pub fn submission_for(player_name: &str, score: u32) -> Result<RankingSubmission, RankingError> {
    RankingSubmission::new(&display_name(player_name), score).validate()
}

/// One row of `GET /ranking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: u32,
    /// Unix timestamp (ms)
    pub date: u64,
}

/// Order entries score desc, then most recent first, keeping the top N
pub fn rank_entries(mut entries: Vec<RankingEntry>) -> Vec<RankingEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then(b.date.cmp(&a.date)));
    entries.truncate(RANKING_TOP_N);
    entries
}

/// Fire-and-forget report of an accepted submission.
///
/// Network failures are logged, never surfaced.
#[cfg(target_arch = "wasm32")]
pub fn report_score(submission: &RankingSubmission) {
    let submission = submission.clone();
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = post_submission(&submission).await {
            log::warn!("Leaderboard report failed: {:?}", e);
        }
    });
}

#[cfg(target_arch = "wasm32")]
async fn post_submission(submission: &RankingSubmission) -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Headers, Request, RequestInit, Response};

    let body = serde_json::to_string(submission).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let headers = Headers::new()?;
    headers.set("Content-Type", "application/json")?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(RANKING_ENDPOINT, &init)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;

    if response.ok() {
        log::info!("Score {} reported as {:?}", submission.score, submission.name);
        Ok(())
    } else {
        Err(JsValue::from_f64(f64::from(response.status())))
    }
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
pub fn report_score(submission: &RankingSubmission) {
    log::info!("Would report {} for {:?}", submission.score, submission.name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_disallowed_characters_are_filtered_not_rejected() {
        let sub = RankingSubmission::new("<b>Robin</b> H00d!!", 42);
        let accepted = sub.validate().unwrap();
        assert_eq!(accepted.name, "bRobinb H00d");
        assert_eq!(accepted.score, 42.0);
    }

    #[test]
    fn test_long_names_truncated() {
        let name = sanitize_name("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(name, "abcdefghijklmnop");
        assert_eq!(name.chars().count(), NAME_MAX_LEN);
    }

    #[test]
    fn test_unicode_letters_kept() {
        assert_eq!(sanitize_name("  Zoë 🎯 "), "Zoë");
    }

    #[test]
    fn test_empty_after_sanitize_rejected() {
        let sub = RankingSubmission::new("<<>>", 10);
        assert_eq!(sub.validate(), Err(RankingError::EmptyName));
    }

    #[test]
    fn test_unusable_player_name_falls_back() {
        for raw in ["", "   ", "<<>>", "🎯🎯"] {
            assert_eq!(display_name(raw), DEFAULT_PLAYER_NAME);
            let accepted = submission_for(raw, 87).unwrap();
            assert_eq!(accepted.name, DEFAULT_PLAYER_NAME);
            assert_eq!(accepted.score, 87.0);
        }
        assert_eq!(submission_for(" Robin! ", 3).unwrap().name, "Robin");
    }

    #[test]
    fn test_score_bounds() {
        let mut sub = RankingSubmission::new("ok", 0);
        assert!(sub.validate().is_ok());

        for bad in [f64::NAN, f64::INFINITY, -1.0, SCORE_CEILING] {
            sub.score = bad;
            assert!(matches!(sub.validate(), Err(RankingError::InvalidScore(_))));
        }
    }

    #[test]
    fn test_wrong_game_rejected() {
        let mut sub = RankingSubmission::new("ok", 5);
        sub.game = "pong".into();
        assert_eq!(sub.validate(), Err(RankingError::InvalidGame("pong".into())));
    }

    #[test]
    fn test_rank_order_and_bound() {
        let mut entries: Vec<RankingEntry> = (0..15)
            .map(|i| RankingEntry {
                name: format!("p{}", i),
                score: (i % 5) * 10,
                date: i as u64,
            })
            .collect();
        entries.reverse();
        let ranked = rank_entries(entries);
        assert_eq!(ranked.len(), RANKING_TOP_N);
        assert_eq!(ranked[0].score, 40);
        // Equal scores: most recent first
        assert_eq!(ranked[0].date, 14);
        assert_eq!(ranked[1].date, 9);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_submission_json_shape() {
        let json = serde_json::to_value(RankingSubmission::new("Ann", 7)).unwrap();
        assert_eq!(json["game"], GAME_ID);
        assert_eq!(json["name"], "Ann");
        assert_eq!(json["score"], 7.0);
    }

    proptest! {
        #[test]
        fn prop_sanitized_name_is_bounded_and_clean(raw in ".{0,64}") {
            let name = sanitize_name(&raw);
            prop_assert!(name.chars().count() <= NAME_MAX_LEN);
            prop_assert!(name.chars().all(allowed_name_char));
            prop_assert_eq!(name.trim(), name.as_str());
        }
    }
}
