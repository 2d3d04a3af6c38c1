// Pokemon Arena Schema - Shared type definitions
// This crate contains the plain-data types shared between the battle engine,
// the fixture Pokedex, and any transport layer: elemental types and their
// damage relations, move metadata, and species stat blocks.

// Re-export the main types
pub use move_types::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod move_types;
pub mod pokemon_types;
pub mod species_data;
