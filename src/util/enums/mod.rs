pub use azimuth_trend::*;
pub use body::*;
pub use session_state::*;

mod azimuth_trend;
mod body;
mod session_state;
