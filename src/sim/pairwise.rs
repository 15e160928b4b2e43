use super::bubble::{Attachment, Bubble};
use super::forces::ForceAccumulator;
use super::params::SimParams;
use super::surface::Poke;

/// Squared-gap band in which bubbles repel before touching
const REPULSION_BAND: f32 = 10_000.0;
/// Spring pressure limit per step
const MAX_SPRING_PRESSURE: f32 = 200.0;
/// Relative velocity limit used for spring damping
const MAX_SPRING_CLOSING_SPEED: f32 = 40.0;
/// Gravity is softened inside these outer gaps to stop wiggling at contact
const GRAVITY_SOFTEN_GAPS: [f32; 2] = [10.0, 5.0];
const GRAVITY_SOFTEN_FACTOR: f32 = 1.2;

/// Forces between bubble `a` and bubble `b`, as seen from `a`.
///
/// Every contribution goes into `forces`; neither bubble is modified. Some
/// forces are reciprocal (collision, spring, gravity) and are written for
/// both bubbles here, others (mild repulsion) only for `a` because the
/// reverse evaluation covers `b`. Returns the dent `a` should receive.
pub fn pair_forces(
    a: &Bubble,
    b: &Bubble,
    params: &SimParams,
    dt: f32,
    forces: &mut ForceAccumulator,
) -> Option<Poke> {
    if a.id() == b.id() || a.is_popping() || b.is_popping() {
        return None;
    }

    let delta = b.pos - a.pos;
    let d = delta.length();
    let reach = a.r() + b.r();
    let closeness = d * d - reach * reach;
    let dir = (d > 0.0 && d.is_finite()).then(|| delta / d);

    // magnitude pushing `a` away from `b` (negative pulls it closer)
    let mut f_a = 0.0;
    let mut poke = None;

    if closeness < 0.0 {
        let f = (-closeness).sqrt() * params.bounce * a.bounce * dt * a.r().powf(-0.25);
        if let Some(dir) = dir {
            forces.add(b.id(), dir * f);
        }
        f_a = f;
        poke = Some(Poke {
            depth: (reach - d) / 2.0,
            angle: delta.y.atan2(delta.x),
            distance: d,
            other_radius: b.r(),
        });
    } else if closeness < REPULSION_BAND {
        f_a = params.repulsion * dt * 10.0 / (closeness + 10.0);
    }

    let spring = match &a.attachment {
        Attachment::SpringTo { target, length } if target == b.id() => Some(*length),
        _ => None,
    };

    if let Some(length) = spring {
        if let Some(dir) = dir {
            let outer_gap = (d - reach) - length;
            let mut pressure = (params.spring_force * outer_gap * dt)
                .clamp(-MAX_SPRING_PRESSURE, MAX_SPRING_PRESSURE);
            let closing = (a.vel - b.vel)
                .dot(dir)
                .clamp(-MAX_SPRING_CLOSING_SPEED, MAX_SPRING_CLOSING_SPEED);
            pressure -= closing * params.spring_damping;
            f_a -= pressure;
            forces.add(b.id(), -dir * pressure);
        }
    } else if b.gravity != 0.0 && !b.attachment.targets(a.id()) {
        let f_g = gravity_pull(a, b, d, params, dt);
        f_a += f_g;
        if let Some(dir) = dir {
            forces.add(b.id(), dir * f_g);
        }
    }

    if f_a != 0.0 && f_a.is_finite() {
        if let Some(dir) = dir {
            forces.add(a.id(), -dir * f_a);
        }
    }

    poke
}

/// Signed gravity magnitude of `b` acting on `a` (negative means attraction).
///
/// Falls off exponentially with distance rather than with its square.
fn gravity_pull(a: &Bubble, b: &Bubble, d: f32, params: &SimParams, dt: f32) -> f32 {
    let falloff = 0.5_f32.powf((d - b.r()) / params.gravity_half_distance);
    let mut f_g = -b.gravity * params.gravity_scale * dt * falloff * a.weight.sqrt();

    let outer_gap = d - a.r() - b.r();
    for gap in GRAVITY_SOFTEN_GAPS {
        if outer_gap < gap {
            f_g /= GRAVITY_SOFTEN_FACTOR;
        }
    }
    f_g
}

/// Whether `a` punctures `b` this step
pub fn punctures(a: &Bubble, b: &Bubble) -> bool {
    if !a.behavior().is_spike() || a.id() == b.id() {
        return false;
    }
    if b.behavior().is_spike() || b.fixed || b.is_popping() || a.is_popping() {
        return false;
    }
    let reach = a.r() + b.r();
    a.pos.distance_squared(b.pos) < reach * reach
}
