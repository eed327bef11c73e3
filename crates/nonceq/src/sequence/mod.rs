mod atomic;
mod ensured;
mod interface;

pub use atomic::*;
pub use ensured::*;
pub use interface::*;
