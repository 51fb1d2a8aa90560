pub mod builder;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod shell;
pub mod source;

pub use trip_core as core;
pub use trip_core::model;
pub use trip_core::render;

pub use builder::{BuildReport, Page, SiteBuilder};
pub use trip_core::AppConfig;
