pub mod stats;
pub mod plot;

pub use stats::{ChannelStats, STD_SCALE};
pub use plot::{LinePlot, Series, PALETTE};
