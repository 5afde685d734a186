//! Category encodings for the `day_of_week` and `season` fields.

pub mod category;

pub use category::*;
