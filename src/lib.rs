pub mod backend;
pub mod cli;
pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod exit;
pub mod export;
pub mod render;
pub mod state;
pub mod tui;
pub mod ui;
pub mod view;
pub mod wizard;
