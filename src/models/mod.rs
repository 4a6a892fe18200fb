pub mod common;
pub mod environment;
pub mod tag;
pub mod template;

pub use common::{ListQuery, Patch};
