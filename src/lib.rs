#![doc = include_str!("../README.md")]

pub use app::App;

#[macro_use]
mod macros;

mod app;
pub mod backend;
pub mod city;
pub mod command;
pub mod config;
pub mod conversion;
pub mod inflight;
pub mod render;
pub mod session;
pub mod state;
pub mod time_of_day;
