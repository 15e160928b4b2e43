use super::bubble::Bubble;
use super::params::SimParams;
use super::world::clamp_to_world;
use bevy::math::Vec2;

/// Popping bubbles are removed once shrunk below this fraction of their size
pub const POP_DONE_FACTOR: f32 = 0.1;
/// Share of the pending resize applied per unit of time
const RESIZE_RATE: f32 = 0.8;
/// Extra distance kept between a bubble and the world edge
const WORLD_EDGE_MARGIN: f32 = 10.0;

/// What happened to a bubble during integration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrated {
    Moved,
    /// Held in place (fixed or dragged)
    Held,
    /// Finished its pop animation and should be removed
    Popped,
}

/// Advance one bubble by `dt` under `force`.
///
/// `friction` is the velocity decay for this step, usually
/// `params.friction(dt)`.
pub fn integrate(
    bubble: &mut Bubble,
    force: Vec2,
    dt: f32,
    friction: f32,
    params: &SimParams,
) -> Integrated {
    if bubble.fixed || bubble.dragging {
        bubble.vel = Vec2::ZERO;
        apply_resize(bubble, dt, params);
        return advance_pop(bubble, dt, params).unwrap_or(Integrated::Held);
    }

    let mut force = if bubble.is_popping() { Vec2::ZERO } else { force };
    if force.x.abs() < params.bg_friction && force.y.abs() < params.bg_friction {
        force = Vec2::ZERO;
    }
    if !force.is_finite() {
        log::warn!("Discarding non-finite force {} on bubble {}", force, bubble.id());
        force = Vec2::ZERO;
    }

    bubble.vel += force;
    let pos = bubble.pos + bubble.vel * params.inertia;
    bubble.pos = clamp_to_world(pos, bubble.r() + WORLD_EDGE_MARGIN, params.world_radius);
    bubble.vel *= friction;

    apply_resize(bubble, dt, params);

    advance_pop(bubble, dt, params).unwrap_or(Integrated::Moved)
}

/// Shrink a popping bubble; `Some(Popped)` once it is small enough to
/// remove. `None` for bubbles that aren't popping.
fn advance_pop(bubble: &mut Bubble, dt: f32, params: &SimParams) -> Option<Integrated> {
    let factor = bubble.pop_factor()? * params.pop_decay.powf(dt);
    bubble.set_pop_factor(factor);
    (factor < POP_DONE_FACTOR).then_some(Integrated::Popped)
}

fn apply_resize(bubble: &mut Bubble, dt: f32, params: &SimParams) {
    let pending = bubble.change_size;
    if pending == 0.0 {
        return;
    }
    if !pending.is_finite() {
        bubble.change_size = 0.0;
        return;
    }
    let amount = if pending.abs() < 1.0 {
        pending
    } else {
        dt * RESIZE_RATE * pending
    };
    bubble.set_radius(bubble.r() + amount, params);
    bubble.change_size -= amount;
}
