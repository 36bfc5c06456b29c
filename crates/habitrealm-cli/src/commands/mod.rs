pub mod account;
pub mod config;
pub mod data;
pub mod emoji;
pub mod habit;
pub mod prefs;
pub mod shop;
pub mod trophy;
