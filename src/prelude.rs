pub use crate::bitset::Bitset;
pub use crate::cli::{self, Config, LgResult};
pub use crate::functions;
pub use crate::lattice::{self, Lattice};
pub use crate::model::{self, Model};
pub use crate::solve;
pub use crate::{CellType, ForceAxis};
