use super::params::SimParams;
use super::surface::{self, Poke, SURFACE_SAMPLES, SAMPLE_ANGLE};
use crate::clock;
use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text prefix that turns a bubble into a seeker
pub const SEEK_PREFIX: &str = "SEEK:";
/// Text prefix that turns a bubble into a spike
pub const SPIKE_PREFIX: &str = "SPIKE:";

/// Parameter ranges accepted at construction (anything else is clamped)
pub const WEIGHT_RANGE: (f32, f32) = (0.1, 10.0);
pub const BOUNCE_RANGE: (f32, f32) = (0.1, 5.0);
pub const GRAVITY_RANGE: (f32, f32) = (0.0, 20.0);

/// Stable identifier of a bubble
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BubbleId(String);

impl BubbleId {
    /// Fresh random id in UUID v4 text form
    pub fn random(rng: &mut impl Rng) -> Self {
        let bits: u128 = rng.random();
        // version 4, RFC 4122 variant
        let bits = (bits & !(0xf << 76)) | (0x4 << 76);
        let bits = (bits & !(0x3 << 62)) | (0x2 << 62);
        let hex = format!("{bits:032x}");
        BubbleId(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    pub fn generate() -> Self {
        Self::random(&mut rand::rng())
    }

}

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BubbleId {
    fn from(s: &str) -> Self {
        BubbleId(s.to_string())
    }
}

impl From<String> for BubbleId {
    fn from(s: String) -> Self {
        BubbleId(s)
    }
}

/// Outgoing spring of a bubble
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Attachment {
    #[default]
    None,
    /// Keep an outer gap of `length` to `target`
    SpringTo { target: BubbleId, length: f32 },
}

impl Attachment {
    pub fn target(&self) -> Option<&BubbleId> {
        match self {
            Attachment::None => None,
            Attachment::SpringTo { target, .. } => Some(target),
        }
    }

    pub fn targets(&self, id: &BubbleId) -> bool {
        self.target() == Some(id)
    }
}

/// What a bubble does besides being pushed around, derived from its text
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Behavior {
    #[default]
    Passive,
    /// Steers toward bubbles sharing words with the query
    Seeker { query: Vec<String> },
    /// Pops whatever it touches
    Spike,
}

impl Behavior {
    pub fn from_text(text: &str) -> Self {
        if let Some(rest) = text.strip_prefix(SEEK_PREFIX) {
            Behavior::Seeker {
                query: tokenize(rest),
            }
        } else if text.starts_with(SPIKE_PREFIX) {
            Behavior::Spike
        } else {
            Behavior::Passive
        }
    }

    pub fn is_spike(&self) -> bool {
        matches!(self, Behavior::Spike)
    }
}

/// Lowercase words of a text, split on anything that isn't a letter or digit
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect()
}

/// Everything needed to create a bubble
#[derive(Debug, Clone)]
pub struct BubbleSpec {
    pub pos: Vec2,
    pub r: f32,
    pub color: String,
    pub text: String,
    pub fixed: bool,
    pub weight: f32,
    pub bounce: f32,
    pub gravity: f32,
    /// Reuse an existing id (scene load); a fresh one is generated otherwise
    pub id: Option<BubbleId>,
    pub stick_to: Option<(BubbleId, f32)>,
}

impl Default for BubbleSpec {
    fn default() -> Self {
        BubbleSpec {
            pos: Vec2::ZERO,
            r: 50.0,
            color: "cornflowerblue".to_string(),
            text: String::new(),
            fixed: false,
            weight: 1.0,
            bounce: 1.0,
            gravity: 0.0,
            id: None,
            stick_to: None,
        }
    }
}

impl BubbleSpec {
    pub fn new(pos: Vec2, r: f32) -> Self {
        BubbleSpec {
            pos,
            r,
            ..Default::default()
        }
    }
}

/// A simulated bubble
#[derive(Debug, Clone)]
pub struct Bubble {
    id: BubbleId,
    pub pos: Vec2,
    pub vel: Vec2,
    r: f32,
    r2: f32,
    pub color: String,
    text: String,
    behavior: Behavior,
    pub weight: f32,
    pub bounce: f32,
    pub gravity: f32,
    pub fixed: bool,
    pub attachment: Attachment,
    pub created_at: u64,
    pub popped_at: Option<u64>,

    // Not persisted
    squish: [f32; SURFACE_SAMPLES],
    pub dragging: bool,
    pub selected: bool,
    /// Pending radius change, applied gradually by the integrator
    pub change_size: f32,
    /// Shrink factor while popping (1.0 at the start, falls toward 0)
    popping: Option<f32>,
}

impl Bubble {
    pub fn new(spec: BubbleSpec, params: &SimParams) -> Self {
        let r = params.clamp_radius(spec.r);
        let attachment = match spec.stick_to {
            Some((target, length)) => Attachment::SpringTo {
                target,
                length: length.max(0.0),
            },
            None => Attachment::None,
        };

        Bubble {
            id: spec.id.unwrap_or_else(BubbleId::generate),
            pos: spec.pos,
            vel: Vec2::ZERO,
            r,
            r2: r * r,
            color: spec.color,
            behavior: Behavior::from_text(&spec.text),
            text: spec.text,
            weight: clamp_finite(spec.weight, WEIGHT_RANGE, 1.0),
            bounce: clamp_finite(spec.bounce, BOUNCE_RANGE, 1.0),
            gravity: clamp_finite(spec.gravity, GRAVITY_RANGE, 0.0),
            fixed: spec.fixed,
            attachment,
            created_at: clock::now_millis(),
            popped_at: None,
            squish: [r; SURFACE_SAMPLES],
            dragging: false,
            selected: false,
            change_size: 0.0,
            popping: None,
        }
    }

    pub fn id(&self) -> &BubbleId {
        &self.id
    }

    pub fn r(&self) -> f32 {
        self.r
    }

    /// Cached `r * r`
    pub fn r2(&self) -> f32 {
        self.r2
    }

    /// Set the radius, clamped to the allowed range
    pub fn set_radius(&mut self, r: f32, params: &SimParams) {
        if !r.is_finite() {
            return;
        }
        self.r = params.clamp_radius(r);
        self.r2 = self.r * self.r;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.behavior = Behavior::from_text(&self.text);
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn squish(&self) -> &[f32; SURFACE_SAMPLES] {
        &self.squish
    }

    /// Back to a perfect circle
    pub fn restore_surface(&mut self) {
        self.squish = [self.r; SURFACE_SAMPLES];
    }

    /// Dent the outline; call once per poking neighbor per step
    pub fn poke(&mut self, poke: &Poke) {
        poke.apply(&mut self.squish, self.r);
    }

    pub fn smooth_surface(&mut self, fuzz: usize) {
        self.squish = surface::smooth_ring(&self.squish, fuzz);
    }

    /// Outline radius in the direction of `point`
    pub fn radius_toward(&self, point: Vec2) -> f32 {
        let delta = point - self.pos;
        let angle = delta.y.atan2(delta.x);
        self.squish[surface::sample_index(angle)]
    }

    /// Outline points in world space, inset by `margin`, scaled while popping
    pub fn outline_points(&self, margin: f32) -> impl Iterator<Item = Vec2> + '_ {
        let scale = self.popping.unwrap_or(1.0);
        self.squish.iter().enumerate().map(move |(n, &radius)| {
            let angle = n as f32 * SAMPLE_ANGLE;
            let radius = ((radius - margin) * scale).max(0.0);
            self.pos + Vec2::from_angle(angle) * radius
        })
    }

    /// Point at `angle` on the circle of radius `r` around this bubble
    pub fn polar(&self, angle: f32, r: f32) -> Vec2 {
        self.pos + Vec2::from_angle(angle) * r
    }

    /// Add the velocity of a release at the end of a drag.
    ///
    /// `delta` is the last pointer movement and `elapsed_ms` the time it took.
    pub fn throw(&mut self, delta: Vec2, elapsed_ms: f32) {
        let factor = 40.0 * self.weight.powf(0.1) / elapsed_ms;
        let impulse = delta * factor;
        if impulse.is_finite() {
            self.vel += impulse;
        }
    }

    /// Queue a gradual resize by a fraction of the current radius
    pub fn grow(&mut self, fraction: f32) {
        self.change_size += self.r * fraction;
    }

    pub fn is_popping(&self) -> bool {
        self.popping.is_some()
    }

    /// Shrink factor while popping
    pub fn pop_factor(&self) -> Option<f32> {
        self.popping
    }

    /// Enter the popping state. Returns false if it was already popping.
    pub fn start_popping(&mut self) -> bool {
        if self.popping.is_some() {
            return false;
        }
        self.popping = Some(1.0);
        self.popped_at = Some(clock::now_millis());
        self.dragging = false;
        self.selected = false;
        true
    }

    pub(super) fn set_pop_factor(&mut self, factor: f32) {
        if self.popping.is_some() {
            self.popping = Some(factor);
        }
    }

    /// Radius to draw with
    pub fn visible_radius(&self) -> f32 {
        self.r * self.popping.unwrap_or(1.0)
    }

    /// Whether the point lies inside the (deformed) outline
    pub fn contains(&self, point: Vec2) -> bool {
        let d2 = point.distance_squared(self.pos);
        if d2 >= self.r2() {
            return false;
        }
        let outline = self.radius_toward(point);
        d2 < outline * outline
    }
}

fn clamp_finite(value: f32, (lo, hi): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}
