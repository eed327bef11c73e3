#![doc = include_str!("../README.md")]

mod allocator;
mod authority;
mod error;
pub(crate) mod mutex;
mod retry;
mod sequence;

pub use crate::allocator::*;
pub use crate::authority::*;
pub use crate::error::*;
pub use crate::retry::DEFAULT_RETRY_CAPACITY;
pub use crate::sequence::*;
