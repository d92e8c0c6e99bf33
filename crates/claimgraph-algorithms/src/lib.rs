pub mod common;
pub mod community;
pub mod degree;
pub mod stats;

pub use common::{GraphView, NodeId};
pub use community::{weakly_connected_components, WccResult};
pub use degree::{degree_counts, DegreeCount};
pub use stats::{population_summary, Summary};
