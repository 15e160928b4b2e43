mod bubble;
mod forces;
mod integrator;
mod pairwise;
mod params;
mod record;
mod seek;
mod step;
mod surface;
mod world;

pub use bubble::{Attachment, Bubble, BubbleId, BubbleSpec};
pub use params::{presets, SimParams};
pub use record::WorldSnapshot;
pub use step::{SeekLink, StepReport};
pub use surface::SURFACE_SAMPLES;
pub use world::{clamp_to_world, World, WorldError, DEFAULT_SPRING_LENGTH};
