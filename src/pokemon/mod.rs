//! Pokémon domain knowledge: names, natures, and the Pokesol text format.

pub mod names;
pub mod nature;
pub mod record;

pub use names::NameResolver;
pub use nature::classify_nature;
pub use record::{assemble, to_pokesol_text, PokemonRecord};
