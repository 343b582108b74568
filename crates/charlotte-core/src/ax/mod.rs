//! Accessibility tree arena and extractor (components 2 and the arena half of the design notes).

pub mod extractor;
pub mod node;

pub use extractor::extract;
pub use node::{Arena, AxNode, CheckedState, NodeId};
