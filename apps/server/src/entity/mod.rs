//! SeaORM entity definitions.

pub mod document;
pub mod job;
pub mod password_reset_token;
pub mod profile;
pub mod user;
