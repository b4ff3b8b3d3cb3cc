mod codec;
mod ids;
mod map_file;
mod unit;
pub mod wire;

pub use crate::codec::*;
pub use crate::ids::*;
pub use crate::map_file::*;
pub use crate::unit::*;
