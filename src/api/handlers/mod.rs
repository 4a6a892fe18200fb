pub mod environments;
pub mod health;
pub mod meta;
pub mod tags;
pub mod templates;
