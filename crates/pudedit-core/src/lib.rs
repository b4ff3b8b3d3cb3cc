//! Editing core of the PUD map editor: the cell grid, unit placement,
//! compressed undo history and conversion to and from the map file model.

mod cell;
mod config;
mod grid;
mod history;
mod index;
mod observer;
mod session;

pub mod placement;
pub mod sync;
pub mod terrain;

pub use crate::cell::*;
pub use crate::config::*;
pub use crate::grid::*;
pub use crate::history::*;
pub use crate::index::*;
pub use crate::observer::*;
pub use crate::session::*;

pub use crate::placement::{Footprint, PlacementError, Removed, Stamp};
pub use crate::sync::{MapMeta, SyncError};
pub use crate::terrain::TerrainClass;
