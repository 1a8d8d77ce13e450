pub mod moderation;
pub mod product;
pub mod submission;
