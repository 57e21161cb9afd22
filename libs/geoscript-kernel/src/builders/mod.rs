//! Mesh builders that consume paths or raw points.

pub mod extrude;
pub mod fill;
pub mod hull;
pub mod lathe;
pub mod loft;

pub use extrude::{extrude, Along};
pub use fill::fill;
pub use hull::hull;
pub use lathe::lathe;
pub use loft::loft;
