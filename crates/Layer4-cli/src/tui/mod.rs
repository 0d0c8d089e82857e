//! TUI (Terminal User Interface) module

mod app;
mod components;
mod event;
mod pages;
pub mod theme;

pub use app::run;
