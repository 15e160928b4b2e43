use super::bubble::{Attachment, Bubble, BubbleId};
use super::params::SimParams;
use super::record::BubbleRecord;
use super::step::{self, StepReport};
use bevy::math::Vec2;
use std::fmt;

/// Gap kept by a new spring unless told otherwise
pub const DEFAULT_SPRING_LENGTH: f32 = 50.0;

/// Pull `pos` back inside the circular world, keeping `margin` from its edge
pub fn clamp_to_world(pos: Vec2, margin: f32, world_radius: f32) -> Vec2 {
    let limit = world_radius - margin;
    if !(limit > 0.0) {
        return Vec2::ZERO;
    }
    let d2 = pos.length_squared();
    if d2 < limit * limit {
        return pos;
    }
    pos * (limit / d2.sqrt())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    UnknownBubble(BubbleId),
    SelfAttachment(BubbleId),
    DuplicateId(BubbleId),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::UnknownBubble(id) => write!(f, "No bubble with id {}", id),
            WorldError::SelfAttachment(id) => write!(f, "Bubble {} cannot stick to itself", id),
            WorldError::DuplicateId(id) => write!(f, "A bubble with id {} already exists", id),
        }
    }
}

impl std::error::Error for WorldError {}

/// Every bubble in the sandbox, plus the archive of popped ones
#[derive(Debug, Clone)]
pub struct World {
    bubbles: Vec<Bubble>,
    /// Popped bubbles that had text, kept when `archive_popped` is set
    pub popped: Vec<BubbleRecord>,
    pub archive_popped: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        World {
            bubbles: Vec::new(),
            popped: Vec::new(),
            archive_popped: true,
        }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn bubbles_mut(&mut self) -> std::slice::IterMut<'_, Bubble> {
        self.bubbles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    fn index_of(&self, id: &BubbleId) -> Option<usize> {
        self.bubbles.iter().position(|b| b.id() == id)
    }

    pub fn get(&self, id: &BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id() == id)
    }

    pub fn get_mut(&mut self, id: &BubbleId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.id() == id)
    }

    /// Add a bubble; its id must be new
    pub fn add(&mut self, bubble: Bubble) -> Result<&BubbleId, WorldError> {
        if self.get(bubble.id()).is_some() {
            return Err(WorldError::DuplicateId(bubble.id().clone()));
        }
        if bubble.attachment.targets(bubble.id()) {
            return Err(WorldError::SelfAttachment(bubble.id().clone()));
        }
        self.bubbles.push(bubble);
        let added = &self.bubbles[self.bubbles.len() - 1];
        Ok(added.id())
    }

    /// Remove a bubble outright; springs pointing at it are dropped
    pub fn remove(&mut self, id: &BubbleId) -> Option<Bubble> {
        let index = self.index_of(id)?;
        let referrers: Vec<BubbleId> = self.referrers(id).into_iter().cloned().collect();
        for referrer in &referrers {
            self.unstick(referrer);
        }
        Some(self.bubbles.remove(index))
    }

    /// Bubbles whose spring targets `id`
    pub fn referrers(&self, id: &BubbleId) -> Vec<&BubbleId> {
        self.bubbles
            .iter()
            .filter(|b| b.attachment.targets(id))
            .map(|b| b.id())
            .collect()
    }

    /// Attach a spring from `source` to `target`, replacing any previous one
    pub fn stick(
        &mut self,
        source: &BubbleId,
        target: &BubbleId,
        length: f32,
    ) -> Result<(), WorldError> {
        if source == target {
            return Err(WorldError::SelfAttachment(source.clone()));
        }
        if self.get(target).is_none() {
            return Err(WorldError::UnknownBubble(target.clone()));
        }
        let bubble = self
            .get_mut(source)
            .ok_or_else(|| WorldError::UnknownBubble(source.clone()))?;
        let length = if length.is_finite() { length.max(0.0) } else { DEFAULT_SPRING_LENGTH };
        bubble.attachment = Attachment::SpringTo {
            target: target.clone(),
            length,
        };
        log::debug!("Stuck {} to {} at {}", source, target, length);
        Ok(())
    }

    /// Drop the spring of `source`. Returns whether there was one.
    pub fn unstick(&mut self, source: &BubbleId) -> bool {
        match self.get_mut(source) {
            Some(bubble) => {
                let had = bubble.attachment != Attachment::None;
                bubble.attachment = Attachment::None;
                had
            }
            None => false,
        }
    }

    /// Lengthen (or shorten) the spring of `source`, never below zero.
    /// Returns the new length.
    pub fn adjust_spring(&mut self, source: &BubbleId, delta: f32) -> Option<f32> {
        let bubble = self.get_mut(source)?;
        match &mut bubble.attachment {
            Attachment::SpringTo { length, .. } => {
                *length = (*length + delta).max(0.0);
                Some(*length)
            }
            Attachment::None => None,
        }
    }

    /// Start popping a bubble. Returns false if it doesn't exist or is
    /// already popping.
    pub fn pop(&mut self, id: &BubbleId) -> bool {
        let archive = self.archive_popped;
        let Some(bubble) = self.get_mut(id) else {
            return false;
        };
        if !bubble.start_popping() {
            return false;
        }
        let record = (archive && !bubble.text().is_empty()).then(|| BubbleRecord::from(&*bubble));
        if let Some(record) = record {
            self.popped.push(record);
        }
        log::debug!("Popping bubble {}", id);
        true
    }

    /// The nearest non-popping bubble whose outline contains `point`
    pub fn bubble_at(&self, point: Vec2) -> Option<&BubbleId> {
        self.bubbles
            .iter()
            .filter(|b| !b.is_popping() && b.contains(point))
            .min_by(|a, b| {
                a.pos
                    .distance_squared(point)
                    .total_cmp(&b.pos.distance_squared(point))
            })
            .map(|b| b.id())
    }

    /// Advance the world by `dt` and carry out the resulting pops and
    /// removals
    pub fn step(&mut self, params: &SimParams, dt: f32) -> StepReport {
        let report = step::step(&mut self.bubbles, params, dt);
        self.apply_report(&report);
        report
    }

    pub fn apply_report(&mut self, report: &StepReport) {
        for id in &report.to_pop {
            self.pop(id);
        }
        for id in &report.removed {
            self.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bubble::BubbleSpec;

    fn add(world: &mut World, id: &str, x: f32, y: f32, r: f32) -> BubbleId {
        let bubble = Bubble::new(
            BubbleSpec {
                id: Some(BubbleId::from(id)),
                ..BubbleSpec::new(Vec2::new(x, y), r)
            },
            &SimParams::default(),
        );
        world.add(bubble).unwrap().clone()
    }

    #[test]
    fn test_clamp_to_world() {
        assert_eq!(clamp_to_world(Vec2::new(100.0, 0.0), 10.0, 6000.0), Vec2::new(100.0, 0.0));

        let clamped = clamp_to_world(Vec2::new(8000.0, 6000.0), 10.0, 6000.0);
        assert!((clamped.length() - 5990.0).abs() < 1e-2);
        assert!((clamped.y / clamped.x - 0.75).abs() < 1e-5);

        assert_eq!(clamp_to_world(Vec2::new(5.0, 5.0), 7000.0, 6000.0), Vec2::ZERO);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut world = World::new();
        add(&mut world, "a", 0.0, 0.0, 30.0);

        let again = Bubble::new(
            BubbleSpec {
                id: Some(BubbleId::from("a")),
                ..BubbleSpec::default()
            },
            &SimParams::default(),
        );

        assert_eq!(world.add(again).unwrap_err(), WorldError::DuplicateId(BubbleId::from("a")));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_stick_checks_both_ends() {
        let mut world = World::new();
        let a = add(&mut world, "a", 0.0, 0.0, 30.0);
        let b = add(&mut world, "b", 100.0, 0.0, 30.0);
        let ghost = BubbleId::from("ghost");

        assert_eq!(world.stick(&a, &a, 10.0), Err(WorldError::SelfAttachment(a.clone())));
        assert_eq!(world.stick(&a, &ghost, 10.0), Err(WorldError::UnknownBubble(ghost.clone())));
        assert_eq!(world.stick(&ghost, &a, 10.0), Err(WorldError::UnknownBubble(ghost.clone())));

        world.stick(&a, &b, DEFAULT_SPRING_LENGTH).unwrap();
        assert_eq!(world.referrers(&b), vec![&a]);
        assert_eq!(world.adjust_spring(&a, -70.0), Some(0.0));
        assert_eq!(world.adjust_spring(&b, 5.0), None);

        assert!(world.unstick(&a));
        assert!(!world.unstick(&a));
        assert!(world.referrers(&b).is_empty());
    }

    #[test]
    fn test_removal_clears_springs_to_it() {
        let mut world = World::new();
        let a = add(&mut world, "a", 0.0, 0.0, 30.0);
        let b = add(&mut world, "b", 100.0, 0.0, 30.0);
        let c = add(&mut world, "c", 200.0, 0.0, 30.0);
        world.stick(&a, &b, 20.0).unwrap();
        world.stick(&c, &b, 20.0).unwrap();
        world.stick(&b, &c, 20.0).unwrap();

        let removed = world.remove(&b).unwrap();

        assert_eq!(removed.id(), &b);
        assert_eq!(world.get(&a).unwrap().attachment, Attachment::None);
        assert_eq!(world.get(&c).unwrap().attachment, Attachment::None);
        assert!(world.remove(&b).is_none());
    }

    #[test]
    fn test_bubble_at_prefers_nearest_center() {
        let mut world = World::new();
        let big = add(&mut world, "big", 0.0, 0.0, 200.0);
        let small = add(&mut world, "small", 150.0, 0.0, 40.0);

        assert_eq!(world.bubble_at(Vec2::new(140.0, 0.0)), Some(&small));
        assert_eq!(world.bubble_at(Vec2::new(-100.0, 0.0)), Some(&big));
        assert_eq!(world.bubble_at(Vec2::new(0.0, 500.0)), None);

        world.pop(&small);
        assert_eq!(world.bubble_at(Vec2::new(140.0, 0.0)), Some(&big));
    }

    #[test]
    fn test_pop_archives_bubbles_with_text() {
        let params = SimParams::default();
        let mut world = World::new();
        let plain = add(&mut world, "plain", 0.0, 0.0, 30.0);
        let named = world
            .add(Bubble::new(
                BubbleSpec {
                    text: "remember me".into(),
                    ..BubbleSpec::new(Vec2::new(300.0, 0.0), 30.0)
                },
                &params,
            ))
            .unwrap()
            .clone();

        assert!(world.pop(&plain));
        assert!(world.pop(&named));
        assert!(!world.pop(&named));
        assert!(!world.pop(&BubbleId::from("ghost")));

        assert_eq!(world.popped.len(), 1);
        assert_eq!(world.popped[0].text, "remember me");
        assert!(world.popped[0].popped_at.is_some());

        let mut quiet = World::new();
        quiet.archive_popped = false;
        let id = add(&mut quiet, "x", 0.0, 0.0, 30.0);
        quiet.get_mut(&id).unwrap().set_text("forget me");
        quiet.pop(&id);
        assert!(quiet.popped.is_empty());
    }

    #[test]
    fn test_popped_bubbles_leave_after_shrinking() {
        let params = SimParams::default();
        let mut world = World::new();
        let a = add(&mut world, "a", 0.0, 0.0, 30.0);
        let b = add(&mut world, "b", 500.0, 0.0, 30.0);
        world.stick(&b, &a, 10.0).unwrap();
        world.pop(&a);

        for _ in 0..25 {
            world.step(&params, 0.1);
        }

        assert!(world.get(&a).is_none());
        assert_eq!(world.get(&b).unwrap().attachment, Attachment::None);
    }

    #[test]
    fn test_pinned_bubbles_are_removed_after_popping() {
        let params = SimParams::default();
        let mut world = World::new();
        let pinned = add(&mut world, "pinned", 0.0, 0.0, 140.0);
        world.get_mut(&pinned).unwrap().fixed = true;

        assert!(world.pop(&pinned));
        for _ in 0..25 {
            world.step(&params, 0.1);
        }

        assert!(world.get(&pinned).is_none());
        assert!(world.is_empty());
    }

    #[test]
    fn test_spikes_pop_what_they_touch() {
        let params = SimParams::default();
        let mut world = World::new();
        world
            .add(Bubble::new(
                BubbleSpec {
                    text: "SPIKE: sharp".into(),
                    ..BubbleSpec::new(Vec2::ZERO, 30.0)
                },
                &params,
            ))
            .unwrap();
        let victim = add(&mut world, "victim", 50.0, 0.0, 30.0);

        let report = world.step(&params, 0.1);

        assert_eq!(report.to_pop, vec![victim.clone()]);
        assert!(world.get(&victim).unwrap().is_popping());
    }

    #[test]
    fn test_spring_settles_at_its_length() {
        let params = SimParams::default();
        let mut world = World::new();
        let a = add(&mut world, "a", 0.0, 0.0, 30.0);
        let b = add(&mut world, "b", 150.0, 0.0, 30.0);
        world.stick(&a, &b, 50.0).unwrap();

        for _ in 0..500 {
            world.step(&params, 0.1);
        }

        let (a, b) = (world.get(&a).unwrap(), world.get(&b).unwrap());
        let gap = a.pos.distance(b.pos) - a.r() - b.r();
        assert!((gap - 50.0).abs() < 1.0, "gap settled at {gap}");
        assert!(a.vel.length() < 0.5);
    }
}
