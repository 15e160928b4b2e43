use super::bubble::{Behavior, Bubble, BubbleId};
use super::forces::ForceAccumulator;
use super::integrator::{integrate, Integrated};
use super::pairwise::{pair_forces, punctures};
use super::params::SimParams;
use super::seek::seek_force;
use super::surface::Poke;

/// Share of its other forces a seeker keeps while steering
const SEEKER_FORCE_KEEP: f32 = 0.5;

/// A seeker's interest in another bubble, for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct SeekLink {
    pub seeker: BubbleId,
    pub target: BubbleId,
    pub score: u32,
}

/// Transitions a step asks the owner of the bubbles to carry out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Punctured this step and should start popping
    pub to_pop: Vec<BubbleId>,
    /// Finished popping and should be removed
    pub removed: Vec<BubbleId>,
    pub seek_links: Vec<SeekLink>,
}

impl StepReport {
    pub fn is_quiet(&self) -> bool {
        self.to_pop.is_empty() && self.removed.is_empty()
    }
}

/// Everything the force phase gathers from one snapshot of the bubbles
#[derive(Debug, Default)]
pub struct ForcePass {
    pub forces: ForceAccumulator,
    /// Dents to apply, by bubble index
    pub pokes: Vec<(usize, Poke)>,
    pub to_pop: Vec<BubbleId>,
    pub seek_links: Vec<SeekLink>,
}

/// Gather forces, dents and punctures without touching any bubble
pub fn compute_forces(bubbles: &[Bubble], params: &SimParams, dt: f32) -> ForcePass {
    let mut pass = ForcePass::default();

    for (i, a) in bubbles.iter().enumerate() {
        if a.is_popping() {
            continue;
        }
        for b in bubbles {
            if let Some(poke) = pair_forces(a, b, params, dt, &mut pass.forces) {
                pass.pokes.push((i, poke));
            }
            if punctures(a, b) && !pass.to_pop.contains(b.id()) {
                pass.to_pop.push(b.id().clone());
            }
        }
    }

    for seeker in bubbles.iter().filter(|b| !b.is_popping()) {
        let Behavior::Seeker { query } = seeker.behavior() else {
            continue;
        };
        pass.forces.scale(seeker.id(), SEEKER_FORCE_KEEP);
        let outcome = seek_force(seeker, query, bubbles, params, dt);
        if let Some(steer) = outcome.force {
            pass.forces.add(seeker.id(), steer);
        }
        pass.seek_links
            .extend(outcome.matches.into_iter().map(|(target, score)| SeekLink {
                seeker: seeker.id().clone(),
                target,
                score,
            }));
    }

    pass
}

/// Advance every bubble by `dt`.
///
/// Forces all come from the positions at the start of the step; bubbles
/// only move in the final integration pass.
pub fn step(bubbles: &mut [Bubble], params: &SimParams, dt: f32) -> StepReport {
    for bubble in bubbles.iter_mut().filter(|b| !b.is_popping()) {
        bubble.restore_surface();
    }

    let ForcePass {
        forces,
        pokes,
        to_pop,
        seek_links,
    } = compute_forces(bubbles, params, dt);

    for (i, poke) in &pokes {
        bubbles[*i].poke(poke);
    }
    for bubble in bubbles.iter_mut().filter(|b| !b.is_popping()) {
        bubble.smooth_surface(params.surface_fuzz);
    }

    let friction = params.friction(dt);
    let mut removed = Vec::new();
    for bubble in bubbles.iter_mut() {
        let force = forces.get(bubble.id());
        if integrate(bubble, force, dt, friction, params) == Integrated::Popped {
            removed.push(bubble.id().clone());
        }
    }

    StepReport {
        to_pop,
        removed,
        seek_links,
    }
}
