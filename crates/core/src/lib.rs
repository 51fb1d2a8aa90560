pub mod annotate;
pub mod config;
pub mod dates;
pub mod i18n;
pub mod markup;
pub mod model;
pub mod render;
pub mod timeline;

pub use config::{AppConfig, ConfigOverrides, DataLocation};
pub use i18n::{Locale, Translations};
pub use markup::{el, Element, Node};
pub use model::*;
pub use render::{PageKind, Rendered};
pub use timeline::{StayInterval, TimelineError, TimelinePlacement, TripWindow};
