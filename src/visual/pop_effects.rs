use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::game::session::SandboxSession;
use crate::sim::{Bubble, SURFACE_SAMPLES};
use crate::visual::draw::bubble_color;

/// Frames a burst stays visible
const BURST_FRAMES: u32 = 20;
/// One fragment per this many outline samples
const FRAGMENT_STRIDE: usize = 5;
const FRAGMENT_SPEED: f32 = 12.0;
const FRAGMENT_JITTER: f32 = 5.0;

/// Resource holding the flying pieces of popped bubbles
#[derive(Resource, Default)]
pub struct PopBursts {
    pub(crate) fragments: Vec<Fragment>,
}

/// A piece of a popped bubble's skin
#[derive(Clone)]
pub(crate) struct Fragment {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub spin: f32,
    pub length: f32,
    pub color: Color,
    pub frames_left: u32,
}

impl Fragment {
    /// Opacity, fading out over the burst
    fn alpha(&self) -> f32 {
        self.frames_left as f32 / BURST_FRAMES as f32
    }
}

/// Break a bubble's outline into fragments flying outward
fn burst(bubble: &Bubble, rng: &mut impl Rng) -> Vec<Fragment> {
    let squish = bubble.squish();
    let piece = TAU * bubble.r() * FRAGMENT_STRIDE as f32 / SURFACE_SAMPLES as f32;
    let color = bubble_color(&bubble.color);

    (0..SURFACE_SAMPLES)
        .step_by(FRAGMENT_STRIDE)
        .map(|n| {
            let a = n as f32 * TAU / SURFACE_SAMPLES as f32;
            let jitter = Vec2::new(rng.random::<f32>(), rng.random::<f32>()) * FRAGMENT_JITTER;
            Fragment {
                position: bubble.polar(a, squish[n]),
                velocity: Vec2::from_angle(a) * FRAGMENT_SPEED + jitter,
                angle: a + FRAC_PI_2,
                spin: rng.random::<f32>() - 0.5,
                length: piece * (1.0 + rng.random::<f32>() * 0.7),
                color,
                frames_left: BURST_FRAMES,
            }
        })
        .collect()
}

/// System: start a burst for every bubble that began popping
pub fn spawn_pop_bursts(mut session: ResMut<SandboxSession>, mut bursts: ResMut<PopBursts>) {
    let popped = session.take_just_popped();
    if popped.is_empty() {
        return;
    }

    let mut rng = rand::rng();
    for id in &popped {
        if let Some(bubble) = session.world().get(id) {
            bursts.fragments.extend(burst(bubble, &mut rng));
            info!("Popped bubble {}", id);
        }
    }
}

impl PopBursts {
    /// Move every fragment one frame and drop the finished ones
    fn advance(&mut self) {
        self.fragments.retain_mut(|fragment| {
            fragment.position += fragment.velocity;
            fragment.angle += fragment.spin;
            fragment.frames_left = fragment.frames_left.saturating_sub(1);

            fragment.frames_left > 0
        });
    }
}

/// System: animate bursts (runs in `FixedUpdate`, one frame per tick)
pub fn update_pop_bursts(mut bursts: ResMut<PopBursts>) {
    bursts.advance();
}

/// System: draw fragments as short fading strokes
pub fn draw_pop_bursts(bursts: Res<PopBursts>, mut gizmos: Gizmos) {
    for fragment in &bursts.fragments {
        let half = Vec2::from_angle(fragment.angle) * fragment.length * 0.5;
        gizmos.line_2d(
            fragment.position - half,
            fragment.position + half,
            fragment.color.with_alpha(fragment.alpha()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BubbleSpec, SimParams};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_burst_surrounds_bubble() {
        let bubble = Bubble::new(BubbleSpec::new(Vec2::new(10.0, 20.0), 50.0), &SimParams::default());
        let mut rng = StdRng::seed_from_u64(5);

        let fragments = burst(&bubble, &mut rng);

        assert_eq!(fragments.len(), SURFACE_SAMPLES / FRAGMENT_STRIDE);
        for fragment in &fragments {
            let d = fragment.position.distance(bubble.pos);
            assert!((d - 50.0).abs() < 1e-3);
            // moving outward
            assert!((fragment.position - bubble.pos).dot(fragment.velocity) > 0.0);
        }
    }

    #[test]
    fn test_fragments_expire() {
        let bubble = Bubble::new(BubbleSpec::new(Vec2::ZERO, 50.0), &SimParams::default());
        let mut bursts = PopBursts {
            fragments: burst(&bubble, &mut StdRng::seed_from_u64(5)),
        };
        let start = bursts.fragments[0].position;

        for _ in 0..BURST_FRAMES - 1 {
            bursts.advance();
        }
        assert!(!bursts.fragments.is_empty());
        assert!(bursts.fragments[0].position.distance(start) > 100.0);
        assert!(bursts.fragments[0].alpha() < 0.1);

        bursts.advance();
        assert!(bursts.fragments.is_empty());
    }
}
