//! Simulator world files for generated line follower arenas.
//!
//! Everything here is free of I/O: [`to_wbt`] renders a [`WorldFile`] into
//! a `String`, and [`FrictionDatabase::from_json`] parses a document the
//! caller has already read.

pub mod arena;
pub mod friction;
pub mod node;
pub mod nodes;
pub mod wbt;

pub use arena::{ArenaWorld, ContactMaterial, image_url, world_and_image_file_names};
pub use friction::{Coefficient, Friction, FrictionDatabase, FrictionError, MaterialPair};
pub use node::{CodeFormat, Field, Node};
pub use wbt::{Proto, WorldFile, to_wbt};
