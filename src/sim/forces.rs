use super::bubble::BubbleId;
use bevy::math::Vec2;
use std::collections::HashMap;

/// Forces gathered from every source during one step, keyed by bubble
///
/// Contributions are summed; nothing touches bubble state until the
/// integration phase reads the totals back.
#[derive(Debug, Clone, Default)]
pub struct ForceAccumulator {
    forces: HashMap<BubbleId, Vec2>,
}

impl ForceAccumulator {
    /// Add a contribution to a bubble's total
    pub fn add(&mut self, id: &BubbleId, force: Vec2) {
        if !force.is_finite() {
            return;
        }
        *self.forces.entry(id.clone()).or_insert(Vec2::ZERO) += force;
    }

    /// Total force for a bubble (zero if nothing was recorded)
    pub fn get(&self, id: &BubbleId) -> Vec2 {
        self.forces.get(id).copied().unwrap_or(Vec2::ZERO)
    }

    /// Multiply whatever has been recorded for a bubble so far
    pub fn scale(&mut self, id: &BubbleId, factor: f32) {
        if let Some(force) = self.forces.get_mut(id) {
            *force *= factor;
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }
}
