//! Page renderers. Each takes decoded documents plus [`Translations`] and
//! returns a [`Rendered`] fragment tree; nothing here performs I/O.

pub mod accommodation;
pub mod day_detail;
pub mod flights;
pub mod header;
pub mod itinerary;
pub mod navigation;
pub mod tasks;
pub mod todo;

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use clap::ValueEnum;

use crate::i18n::Translations;
use crate::markup::{el, Node};

pub use accommodation::render_accommodation;
pub use day_detail::render_day_detail;
pub use flights::render_flights;
pub use header::render_header;
pub use itinerary::{render_itinerary, CommentFragment, ItineraryContext, NotesState};
pub use navigation::{day_links, CommentTarget, DayLink, DayNavigation};
pub use tasks::render_tasks;
pub use todo::render_todo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Flight,
    Itinerary,
    Accommodation,
    Task,
    Todo,
    Day,
}

impl PageKind {
    /// Pages linked from the common header, in display order.
    pub const NAV: [PageKind; 5] = [
        PageKind::Flight,
        PageKind::Itinerary,
        PageKind::Accommodation,
        PageKind::Task,
        PageKind::Todo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Flight => "flight",
            PageKind::Itinerary => "itinerary",
            PageKind::Accommodation => "accommodation",
            PageKind::Task => "task",
            PageKind::Todo => "todo",
            PageKind::Day => "day",
        }
    }

    /// Output file for the navigable pages. Day pages are named per id, see
    /// [`navigation::day_page_file`].
    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            PageKind::Flight => Some("flight.html"),
            PageKind::Itinerary => Some("itinerary.html"),
            PageKind::Accommodation => Some("accommodation.html"),
            PageKind::Task => Some("task.html"),
            PageKind::Todo => Some("todo.html"),
            PageKind::Day => None,
        }
    }

    /// Translation key of the page title; the same key labels its nav link.
    pub fn title_key(&self) -> &'static str {
        self.as_str()
    }

    pub fn load_error_key(&self) -> &'static str {
        match self {
            PageKind::Flight => "loadFlightsError",
            PageKind::Itinerary => "loadItineraryError",
            PageKind::Accommodation => "loadAccommodationError",
            PageKind::Task => "loadTasksError",
            PageKind::Todo => "loadTodoError",
            PageKind::Day => "loadDayError",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flight" | "flights" => Ok(PageKind::Flight),
            "itinerary" => Ok(PageKind::Itinerary),
            "accommodation" | "sleep" => Ok(PageKind::Accommodation),
            "task" | "tasks" => Ok(PageKind::Task),
            "todo" => Ok(PageKind::Todo),
            "day" => Ok(PageKind::Day),
            other => Err(anyhow!(
                "Unknown page '{}': expected flight|itinerary|accommodation|task|todo|day",
                other
            )),
        }
    }
}

impl ValueEnum for PageKind {
    fn value_variants<'a>() -> &'a [Self] {
        const VARIANTS: [PageKind; 6] = [
            PageKind::Flight,
            PageKind::Itinerary,
            PageKind::Accommodation,
            PageKind::Task,
            PageKind::Todo,
            PageKind::Day,
        ];
        &VARIANTS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Output of one renderer: the body fragment plus one warning per record or
/// section that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub body: Node,
    pub warnings: Vec<String>,
}

impl Rendered {
    pub fn new(body: impl Into<Node>) -> Self {
        Self {
            body: body.into(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    /// A page whose document could not be loaded at all.
    pub fn failed(tr: &Translations, kind: PageKind, detail: impl fmt::Display) -> Self {
        Self {
            body: error_block(tr.t(kind.load_error_key())),
            warnings: vec![format!("{} page: {}", kind, detail)],
        }
    }

    pub fn is_error(&self) -> bool {
        !self.body.find_by_class("error-message").is_empty()
    }
}

/// Visible, localized error message that replaces a page body.
pub fn error_block(message: &str) -> Node {
    el("div")
        .class("error-message")
        .attr("role", "alert")
        .text(message)
        .into()
}
