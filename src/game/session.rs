use crate::game::demo::{self, DEMO_EVENT_CHANCE, DEMO_MAX_BUBBLES, DEMO_MIN_BUBBLES};
use crate::sim::*;
use bevy::prelude::Resource;
use rand::Rng;

/// Share of the radius added or removed by one resize
pub const RESIZE_STEP: f32 = 0.15;

/// A sandbox session - owns the world and the physics it runs under
#[derive(Debug, Clone, Resource)]
pub struct SandboxSession {
    world: World,
    params: SimParams,
    /// Randomly adds and pops bubbles when set
    demo: bool,
    /// Bubbles that started popping since the renderer last looked
    just_popped: Vec<BubbleId>,
    /// Seek interests from the last step
    seek_links: Vec<SeekLink>,
}

impl SandboxSession {
    pub fn new(world: World, params: SimParams) -> Self {
        SandboxSession {
            world,
            params,
            demo: false,
            just_popped: Vec::new(),
            seek_links: Vec::new(),
        }
    }

    /// Session in demo mode, starting from the demo scene
    pub fn demo(rng: &mut impl Rng, params: SimParams) -> Self {
        let world = demo::demo_scene(rng, &params);
        SandboxSession {
            demo: true,
            ..Self::new(world, params)
        }
    }

    // === Query Methods (for Bevy systems to read state) ===

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub fn seek_links(&self) -> &[SeekLink] {
        &self.seek_links
    }

    /// The selected bubble, if any
    pub fn selected(&self) -> Option<&BubbleId> {
        self.world
            .bubbles()
            .iter()
            .find(|b| b.selected)
            .map(|b| b.id())
    }

    /// Everything needed to restore this session later
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::from_world(&self.world, Some(&self.params))
    }

    // === Mutation Methods (for handling user input) ===

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Advance the simulation by `dt`
    pub fn advance(&mut self, dt: f32) -> StepReport {
        let report = self.world.step(&self.params, dt);
        for id in &report.to_pop {
            log::info!("Bubble {} was punctured", id);
        }
        for id in &report.removed {
            log::debug!("Bubble {} finished popping", id);
        }
        self.just_popped.extend(report.to_pop.iter().cloned());
        self.seek_links = report.seek_links.clone();
        report
    }

    /// Ids of bubbles that started popping since the last call
    pub fn take_just_popped(&mut self) -> Vec<BubbleId> {
        std::mem::take(&mut self.just_popped)
    }

    pub fn spawn(&mut self, spec: BubbleSpec) -> Result<BubbleId, WorldError> {
        let bubble = Bubble::new(spec, &self.params);
        self.world.add(bubble).cloned()
    }

    pub fn spawn_random(&mut self, rng: &mut impl Rng) -> Option<BubbleId> {
        let bubble = demo::random_bubble(rng, &self.params);
        match self.world.add(bubble) {
            Ok(id) => Some(id.clone()),
            Err(e) => {
                log::warn!("Could not add bubble: {}", e);
                None
            }
        }
    }

    pub fn pop(&mut self, id: &BubbleId) -> bool {
        let popped = self.world.pop(id);
        if popped {
            self.just_popped.push(id.clone());
        }
        popped
    }

    /// Make `id` the only selected bubble (or clear the selection)
    pub fn select(&mut self, id: Option<&BubbleId>) {
        for bubble in self.world.bubbles_mut() {
            bubble.selected = Some(bubble.id()) == id && !bubble.is_popping();
        }
    }

    /// Flip the pinned state of a bubble; returns the new state
    pub fn toggle_pinned(&mut self, id: &BubbleId) -> Option<bool> {
        let bubble = self.world.get_mut(id)?;
        bubble.fixed = !bubble.fixed;
        Some(bubble.fixed)
    }

    /// Grow (positive steps) or shrink (negative) a bubble gradually
    pub fn resize(&mut self, id: &BubbleId, steps: f32) {
        if let Some(bubble) = self.world.get_mut(id) {
            bubble.grow(RESIZE_STEP * steps);
        }
    }

    /// Stick `source` to `target` with the default spring length
    pub fn stick(&mut self, source: &BubbleId, target: &BubbleId) -> Result<(), WorldError> {
        self.world.stick(source, target, DEFAULT_SPRING_LENGTH)?;
        log::info!("Stuck {} to {}", source, target);
        Ok(())
    }

    /// Switch to the next friction preset; returns its name
    pub fn cycle_preset(&mut self) -> &'static str {
        let next = self
            .params
            .matching_preset()
            .map_or(0, |index| (index + 1) % presets::ALL.len());
        let preset = &presets::ALL[next];
        self.params.apply_preset(preset);
        log::info!("Physics preset: {}", preset.name);
        preset.name
    }

    /// One demo-mode tick: maybe add a bubble, maybe pop one (never the
    /// first, which is the title)
    pub fn demo_tick(&mut self, rng: &mut impl Rng) {
        if !self.demo {
            return;
        }
        if rng.random_bool(DEMO_EVENT_CHANCE) && self.world.len() < DEMO_MAX_BUBBLES {
            self.spawn_random(rng);
        }
        if rng.random_bool(DEMO_EVENT_CHANCE) && self.world.len() > DEMO_MIN_BUBBLES {
            let index = rng.random_range(1..self.world.len());
            let id = self.world.bubbles()[index].id().clone();
            self.pop(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session_with(bubbles: &[(f32, f32, f32)]) -> (SandboxSession, Vec<BubbleId>) {
        let mut session = SandboxSession::new(World::new(), SimParams::default());
        let ids = bubbles
            .iter()
            .map(|&(x, y, r)| session.spawn(BubbleSpec::new(Vec2::new(x, y), r)).unwrap())
            .collect();
        (session, ids)
    }

    #[test]
    fn test_cycle_preset_wraps() {
        let (mut session, _) = session_with(&[]);
        assert_eq!(session.params().matching_preset(), Some(1));

        assert_eq!(session.cycle_preset(), "friction: high");
        assert_eq!(session.params().v_friction, 0.1);
        assert_eq!(session.cycle_preset(), "friction: low");
        assert_eq!(session.cycle_preset(), "friction: med");
        assert_eq!(session.params(), &SimParams::default());
    }

    #[test]
    fn test_snapshot_restores_live_bubbles() {
        let (mut session, ids) = session_with(&[(0.0, 0.0, 40.0), (200.0, 0.0, 40.0), (0.0, 300.0, 40.0)]);
        session.stick(&ids[0], &ids[1]).unwrap();
        session.pop(&ids[2]);

        let json = session.snapshot().to_json().unwrap();
        let snapshot = WorldSnapshot::from_json(&json).unwrap();
        assert!(snapshot.world.is_some());

        let world = snapshot.to_world(session.params());
        assert_eq!(world.len(), 2);
        assert!(world.get(&ids[2]).is_none());
        assert_eq!(world.get(&ids[0]).unwrap().attachment.target(), Some(&ids[1]));
    }

    #[test]
    fn test_pops_are_queued_once() {
        let (mut session, ids) = session_with(&[(0.0, 0.0, 30.0), (300.0, 0.0, 30.0)]);

        assert!(session.pop(&ids[0]));
        assert!(!session.pop(&ids[0]));

        assert_eq!(session.take_just_popped(), vec![ids[0].clone()]);
        assert!(session.take_just_popped().is_empty());
    }

    #[test]
    fn test_punctures_reach_the_pop_queue() {
        let (mut session, ids) = session_with(&[(50.0, 0.0, 30.0)]);
        session
            .spawn(BubbleSpec {
                text: "SPIKE: pin".into(),
                ..BubbleSpec::new(Vec2::ZERO, 30.0)
            })
            .unwrap();

        session.advance(0.1);

        assert_eq!(session.take_just_popped(), ids);
    }

    #[test]
    fn test_selection_is_exclusive() {
        let (mut session, ids) = session_with(&[(0.0, 0.0, 30.0), (300.0, 0.0, 30.0)]);

        session.select(Some(&ids[0]));
        session.select(Some(&ids[1]));
        assert_eq!(session.selected(), Some(&ids[1]));
        assert!(!session.world().get(&ids[0]).unwrap().selected);

        session.select(None);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_pin_resize_and_stick() {
        let (mut session, ids) = session_with(&[(0.0, 0.0, 40.0), (300.0, 0.0, 30.0)]);

        assert_eq!(session.toggle_pinned(&ids[0]), Some(true));
        assert_eq!(session.toggle_pinned(&ids[0]), Some(false));

        session.resize(&ids[0], -1.0);
        assert!((session.world().get(&ids[0]).unwrap().change_size + 6.0).abs() < 1e-4);

        session.stick(&ids[0], &ids[1]).unwrap();
        assert_eq!(session.world().referrers(&ids[1]), vec![&ids[0]]);
        assert!(session.stick(&ids[0], &ids[0]).is_err());
    }

    #[test]
    fn test_demo_keeps_bubble_count_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = SandboxSession::demo(&mut rng, SimParams::default());
        let title = session.world().bubbles()[0].id().clone();

        for _ in 0..2000 {
            session.demo_tick(&mut rng);
            session.advance(0.1);
            let count = session.world().len();
            assert!(count <= DEMO_MAX_BUBBLES);
        }

        assert!(session.world().get(&title).is_some(), "title bubble never pops");
        assert!(session.world().popped.is_empty());
    }

    #[test]
    fn test_demo_tick_is_inert_outside_demo() {
        let (mut session, _) = session_with(&[(0.0, 0.0, 30.0)]);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..500 {
            session.demo_tick(&mut rng);
        }

        assert_eq!(session.world().len(), 1);
    }
}
