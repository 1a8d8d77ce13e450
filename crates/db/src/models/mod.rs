//! Row models mapping database tables to domain types.

pub mod product;
pub mod submission;
