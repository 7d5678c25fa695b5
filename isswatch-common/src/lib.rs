pub mod types;

pub use types::{EnrichedSample, Position, StreamEvent, ABOVE_WATER_FIELD};
