//! Placement of stay intervals on a 0–100% track spanning the whole trip.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::dates::{self, DateError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("trip window has zero length")]
    EmptyWindow,
    #[error("range ends before it starts ({start} > {end})")]
    InvertedRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error(transparent)]
    Date(#[from] DateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TripWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, TimelineError> {
        if start > end {
            return Err(TimelineError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, TimelineError> {
        Self::new(dates::parse_iso(start)?, dates::parse_iso(end)?)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration_days(&self) -> f64 {
        dates::days_between(self.start, self.end)
    }

    /// Position and width of `interval` on this window's track.
    ///
    /// The interval is clipped to the window: one that starts before the
    /// window is pinned to 0 and one that runs past the end is truncated so
    /// that `position + width == 100`. A zero-length window has no track and
    /// is rejected.
    pub fn place(&self, interval: &StayInterval) -> Result<TimelinePlacement, TimelineError> {
        let duration = self.duration_days();
        if duration <= 0.0 {
            return Err(TimelineError::EmptyWindow);
        }

        let raw_position = 100.0 * dates::days_between(self.start, interval.start) / duration;
        let position = raw_position.clamp(0.0, 100.0);

        let width = if interval.end >= self.end {
            100.0 - position
        } else {
            let visible_start = interval.start.max(self.start);
            let visible = dates::days_between(visible_start, interval.end).max(0.0);
            (100.0 * visible / duration).min(100.0 - position)
        };

        Ok(TimelinePlacement {
            position,
            width: width.max(0.0),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StayInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: String,
}

impl StayInterval {
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        label: impl Into<String>,
    ) -> Result<Self, TimelineError> {
        if start > end {
            return Err(TimelineError::InvertedRange { start, end });
        }
        Ok(Self {
            start,
            end,
            label: label.into(),
        })
    }

    pub fn parse(start: &str, end: &str, label: impl Into<String>) -> Result<Self, TimelineError> {
        Self::new(dates::parse_iso(start)?, dates::parse_iso(end)?, label)
    }
}

/// Percentages of the track, both within `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelinePlacement {
    pub position: f64,
    pub width: f64,
}

impl TimelinePlacement {
    pub fn css(&self) -> String {
        format!("left: {:.2}%; width: {:.2}%", self.position, self.width)
    }
}

/// Badge and bar colours keyed by the number of nights: (background, text).
pub fn nights_palette(nights: i64) -> (&'static str, &'static str) {
    match nights {
        1 => ("#FF9AA2", "#333333"),
        2 => ("#FFB7B2", "#333333"),
        3 => ("#FFDAC1", "#333333"),
        4 => ("#E2F0CB", "#333333"),
        5 => ("#B5EAD7", "#333333"),
        6 => ("#C7CEEA", "#333333"),
        7 => ("#D8BFD8", "#333333"),
        _ => ("#F0F0F0", "#666666"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn window() -> TripWindow {
        TripWindow::parse("2026-02-07", "2026-03-02").unwrap()
    }

    fn stay(start: &str, end: &str) -> StayInterval {
        StayInterval::parse(start, end, "stay").unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn places_interval_inside_window() {
        let placement = window().place(&stay("2026-02-10", "2026-02-13")).unwrap();
        assert!(approx(placement.position, 300.0 / 23.0));
        assert!(approx(placement.width, 300.0 / 23.0));
        assert_eq!(placement.css(), "left: 13.04%; width: 13.04%");
    }

    #[test]
    fn interval_starting_before_window_is_pinned_to_zero() {
        let placement = window().place(&stay("2026-02-01", "2026-02-10")).unwrap();
        assert_eq!(placement.position, 0.0);
        assert!(approx(placement.width, 300.0 / 23.0));
    }

    #[test]
    fn interval_past_window_end_is_truncated() {
        let placement = window().place(&stay("2026-02-25", "2026-03-08")).unwrap();
        assert!(approx(placement.position, 1800.0 / 23.0));
        assert_eq!(placement.position + placement.width, 100.0);
    }

    #[test]
    fn interval_covering_window_fills_track() {
        let placement = window().place(&stay("2026-01-01", "2026-04-01")).unwrap();
        assert_eq!(placement.position, 0.0);
        assert_eq!(placement.width, 100.0);
    }

    #[test]
    fn interval_outside_window_has_no_width() {
        let before = window().place(&stay("2026-01-01", "2026-01-05")).unwrap();
        assert_eq!(before.position, 0.0);
        assert_eq!(before.width, 0.0);

        let after = window().place(&stay("2026-03-10", "2026-03-12")).unwrap();
        assert_eq!(after.position, 100.0);
        assert_eq!(after.width, 0.0);
    }

    #[test]
    fn placements_inside_window_stay_on_track() {
        let window = window();
        for (start, end) in [
            ("2026-02-07", "2026-02-08"),
            ("2026-02-12", "2026-02-20"),
            ("2026-02-28", "2026-03-02"),
        ] {
            let placement = window.place(&stay(start, end)).unwrap();
            assert!(placement.position >= 0.0);
            assert!(placement.position + placement.width <= 100.0 + 1e-9);
        }
    }

    #[test]
    fn zero_length_window_is_rejected() {
        let window = TripWindow::parse("2026-02-07", "2026-02-07").unwrap();
        let err = window.place(&stay("2026-02-07", "2026-02-08")).unwrap_err();
        assert_eq!(err, TimelineError::EmptyWindow);
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        assert!(matches!(
            TripWindow::parse("2026-03-02", "2026-02-07"),
            Err(TimelineError::InvertedRange { .. })
        ));
        assert!(matches!(
            StayInterval::parse("2026-02-13", "2026-02-10", "x"),
            Err(TimelineError::InvertedRange { .. })
        ));
    }

    #[test]
    fn palette_falls_back_for_long_stays() {
        assert_eq!(nights_palette(3), ("#FFDAC1", "#333333"));
        assert_eq!(nights_palette(9), ("#F0F0F0", "#666666"));
        assert_eq!(nights_palette(0), ("#F0F0F0", "#666666"));
    }
}
