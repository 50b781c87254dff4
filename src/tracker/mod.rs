pub use angle_mapper::*;
pub use connection::{Transport, TransportBuilder};
pub use frame::*;
pub use operator::*;
pub use position::*;
pub use registry::*;
pub use session::*;

mod angle_mapper;
mod clock;
pub mod connection;
mod frame;
mod operator;
mod position;
mod registry;
mod session;
#[cfg(test)]
mod test_util;
