pub use enums::*;
pub use result::*;
pub use tasks::*;

mod tasks {
    pub use cancel_signal::*;

    mod cancel_signal;
}

mod enums;
mod result;
