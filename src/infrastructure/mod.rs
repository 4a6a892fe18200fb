pub mod cache;
pub mod database;
pub mod migrations;
pub mod seed;
