use bevy::prelude::*;

use crate::game::session::SandboxSession;

/// Simulation time covered by one fixed tick
pub const FRAME_DT: f32 = 0.1;
/// Wall time of one fixed tick (the simulation runs at 25 frames a second)
pub const FRAME_SECONDS: f64 = 0.04;
/// How often demo mode rolls for new and popped bubbles
const DEMO_TICK_SECONDS: f32 = 0.15;

/// Paces demo-mode updates
#[derive(Resource)]
pub struct DemoTimer(pub Timer);

impl Default for DemoTimer {
    fn default() -> Self {
        DemoTimer(Timer::from_seconds(DEMO_TICK_SECONDS, TimerMode::Repeating))
    }
}

/// System: advance the world by one frame (runs in `FixedUpdate`)
pub fn step_simulation(mut session: ResMut<SandboxSession>) {
    let report = session.advance(FRAME_DT);
    if report.is_quiet() {
        return;
    }
    if !report.removed.is_empty() {
        debug!(
            "Removed {} popped bubble(s), {} left",
            report.removed.len(),
            session.world().len()
        );
    }
}

/// System: random additions and pops while in demo mode
pub fn run_demo(time: Res<Time>, mut timer: ResMut<DemoTimer>, mut session: ResMut<SandboxSession>) {
    if !session.is_demo() {
        return;
    }
    timer.0.tick(time.delta());
    let mut rng = rand::rng();
    for _ in 0..timer.0.times_finished_this_tick() {
        session.demo_tick(&mut rng);
    }
}
