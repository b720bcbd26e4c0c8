//! Records module - donor and recipient records consumed by the matcher

mod donor;
mod request;
pub(crate) mod lenient;

pub use donor::*;
pub use request::*;
