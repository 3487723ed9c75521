//! Integer geometry for the matrix.
//!
//! - `vertical`: Splits the canvas height into margins, gaps and transit rows
//! - `row`: Places badge, destination and ETA boxes inside one row
//! - `mapping`: Maps logical pixels to (panel, local x, local y) for both wirings
//!
//! Everything here is pure arithmetic on small integers, recomputed every frame.

pub mod mapping;
pub mod row;
pub mod vertical;

pub use mapping::{LinearMapper, PanelMapper, PhysicalPoint, SerpentineMapper, Wiring};
pub use row::{RowLayout, compute_row_layout, odd_diameter, text_width};
pub use vertical::{RowFrame, VerticalLayout, distribute_extra};
