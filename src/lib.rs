pub use trip_site::builder;
pub use trip_site::cli;
pub use trip_site::commands;
pub use trip_site::config;
pub use trip_site::source;
pub use trip_site::AppConfig;

pub use trip_core as core;
pub use trip_core::model;
pub use trip_core::render;

pub use trip_notes as notes;
