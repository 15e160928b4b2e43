pub mod scene;

pub use scene::{setup_scene, starting_session};
