use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Stage;

/// Comment target that marks a day with its own detail page.
pub const DAY_TEMPLATE: &str = "day_template.html";

static DAY_PARAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"day=([^&]+)").expect("valid regex"));

/// Output file of the detail page for `id`.
pub fn day_page_file(id: &str) -> String {
    format!("day-{}.html", id)
}

/// Day ids become file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_day_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Fragment paths are joined onto the data root, so absolute paths, `..`
/// segments, schemes and drive letters are refused.
fn is_data_relative(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && !path.contains(':')
        && path.split('/').all(|segment| segment != "..")
}

/// What the `comments` field of an itinerary day points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    /// `day_template.html?day=<id>`: link to the generated day page.
    DayPage(String),
    /// Markup fragment shown in a modal; path relative to the data root.
    Fragment(String),
    /// Day template reference without a usable id, or a fragment path that
    /// leaves the data root.
    Invalid(String),
}

impl CommentTarget {
    pub fn classify(comments: &str) -> Self {
        let comments = comments.trim();
        if !comments.contains(DAY_TEMPLATE) {
            if is_data_relative(comments) {
                return CommentTarget::Fragment(comments.to_string());
            }
            return CommentTarget::Invalid(comments.to_string());
        }
        match DAY_PARAM_RE.captures(comments) {
            Some(captures) if is_valid_day_id(&captures[1]) => {
                CommentTarget::DayPage(captures[1].to_string())
            }
            _ => CommentTarget::Invalid(comments.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLink {
    pub id: String,
    pub date: String,
}

impl DayLink {
    pub fn href(&self) -> String {
        day_page_file(&self.id)
    }
}

/// Days with a detail page, in itinerary order.
pub fn day_links(stages: &[Stage]) -> Vec<DayLink> {
    stages
        .iter()
        .flat_map(|stage| stage.itinerary.iter())
        .filter_map(|day| match CommentTarget::classify(day.comments.as_deref()?) {
            CommentTarget::DayPage(id) => Some(DayLink {
                id,
                date: day.date.clone(),
            }),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayNavigation {
    pub prev: Option<DayLink>,
    pub next: Option<DayLink>,
}

impl DayNavigation {
    /// Neighbours of `current`. `None` when the id is not listed or when it
    /// is the only entry.
    pub fn locate(links: &[DayLink], current: &str) -> Option<Self> {
        let index = links.iter().position(|link| link.id == current)?;
        let prev = index.checked_sub(1).map(|i| links[i].clone());
        let next = links.get(index + 1).cloned();
        if prev.is_none() && next.is_none() {
            return None;
        }
        Some(Self { prev, next })
    }
}
