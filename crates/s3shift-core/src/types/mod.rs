//! Core types for s3shift

mod location;
mod object;
mod part;
mod transfer;

pub use location::*;
pub use object::*;
pub use part::*;
pub use transfer::*;
