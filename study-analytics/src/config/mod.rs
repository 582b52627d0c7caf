//! Service configuration and dependency wiring.

mod dependencies;

pub use dependencies::{Dependencies, LogFormat};
