pub mod keys;
pub mod pointer;

pub use keys::handle_keyboard;
pub use pointer::{DragState, handle_pointer_input};
