//! pokesprite library crate.
//!
//! Renders pixel art as truecolor terminal text and manages a local cache of
//! Pokémon sprites to render from.

pub mod art;
pub mod cli;
pub mod config;
pub mod sprites;
