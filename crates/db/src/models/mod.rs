//! Row models and write payloads.
//!
//! Each submodule contains:
//! - A `FromRow` struct matching the database row (plus joined columns)
//! - `From` conversions into the wire types defined in `tickmate-core`
//! - Plain write-payload structs consumed by the repositories

pub mod category;
pub mod todo;
