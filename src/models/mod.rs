pub mod manuscript;
pub mod recognizer;
pub mod signal;

pub use manuscript::*;
pub use recognizer::*;
pub use signal::*;
