use super::bubble::{tokenize, Bubble, BubbleId};
use super::params::SimParams;
use bevy::math::Vec2;

/// Result of one seeker looking around
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeekOutcome {
    /// Steering force to add (none when nothing matches or already there)
    pub force: Option<Vec2>,
    /// Matching bubbles and their scores
    pub matches: Vec<(BubbleId, u32)>,
}

/// Number of query words that also appear in `text`
pub fn match_score(query: &[String], text: &str) -> u32 {
    let words = tokenize(text);
    query.iter().filter(|q| words.contains(q)).count() as u32
}

/// Steering of `seeker` toward bubbles whose text shares words with `query`.
///
/// Each match contributes the point where the seeker's center would sit
/// when touching it, weighted by score.
pub fn seek_force(
    seeker: &Bubble,
    query: &[String],
    bubbles: &[Bubble],
    params: &SimParams,
    dt: f32,
) -> SeekOutcome {
    let mut outcome = SeekOutcome::default();
    if query.is_empty() {
        return outcome;
    }

    let mut weighted = Vec2::ZERO;
    let mut total = 0u32;

    for other in bubbles {
        if other.id() == seeker.id() || other.is_popping() || other.text().is_empty() {
            continue;
        }
        let score = match_score(query, other.text());
        if score == 0 {
            continue;
        }

        let delta = other.pos - seeker.pos;
        let d = delta.length();
        if !(d > 0.0) {
            continue;
        }
        let approach = seeker.pos + delta * ((d - other.r() - seeker.r()) / d);
        if !approach.is_finite() {
            continue;
        }

        outcome.matches.push((other.id().clone(), score));
        weighted += approach * score as f32;
        total += score;
    }

    if total == 0 {
        return outcome;
    }

    let goal = weighted / total as f32;
    let to_goal = goal - seeker.pos;
    let dist = to_goal.length();
    if !(dist > params.seek_stop_distance) {
        return outcome;
    }

    let mut speed = params.seek_speed * dt;
    if dist < params.seek_slow_distance {
        speed *= dist / params.seek_slow_distance;
    }
    outcome.force = Some(to_goal / dist * speed);
    outcome
}
