//! Core data types shared by the engine and its collaborators.

pub mod enums;
pub mod found_volume;
pub mod pair;

pub use enums::*;
pub use found_volume::*;
pub use pair::*;
