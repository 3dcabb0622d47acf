//! Boundary record types for the panel backend.
//!
//! Every record is decoded defensively: optional fields default, loosely
//! typed numbers and flags are coerced, and nothing in a payload is
//! allowed to abort a render.

mod de;
mod range;
mod records;

pub use range::*;
pub use records::*;
