pub mod assignments;
pub mod colors;
pub mod coords;
pub mod document;
pub mod hex;
pub mod influence;
pub mod location;

pub use assignments::*;
pub use coords::*;
pub use document::MapDocument;
pub use hex::{Bounds, HexLayout};
pub use location::*;
