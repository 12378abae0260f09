//! Input resources: the airport graph and its loader.

mod airports;
mod loader;

pub use airports::{AirportGraphData, AirportRecord, LinkRecord, NodeRef};
pub use loader::{fetch_text, load_resources};
