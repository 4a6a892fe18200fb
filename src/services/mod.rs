pub mod environments;
pub mod health;
pub mod tags;
pub mod templates;
