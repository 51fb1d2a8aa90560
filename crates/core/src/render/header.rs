use crate::dates::{self, DateStyle};
use crate::i18n::Translations;
use crate::markup::{el, Node};
use crate::model::TripInfo;

use super::PageKind;

/// Trip title, date range with total days, and links to every other page.
/// A failed `trip-info.json` or `language.json` load becomes an error block.
pub fn render_header(info: Option<&TripInfo>, tr: &Translations, current: PageKind) -> Node {
    let Some(info) = info else {
        return super::error_block(tr.t("loadHeaderError"));
    };

    let locale = tr.locale();
    let start = dates::format_date(&info.start_date, locale, DateStyle::Long);
    let end = dates::format_date(&info.end_date, locale, DateStyle::Long);
    let total = dates::trip_days(&info.start_date, &info.end_date)
        .map(|days| format!(" {}", tr.total_days(days)))
        .unwrap_or_default();

    let links = PageKind::NAV
        .into_iter()
        .filter(|kind| *kind != current)
        .filter_map(|kind| {
            let file = kind.file_name()?;
            Some(
                el("a")
                    .class("nav-btn")
                    .attr("href", file)
                    .text(tr.t(kind.title_key())),
            )
        });

    el("header")
        .class("common-header")
        .child(
            el("div").class("trip-info").child(
                el("div")
                    .class("trip-info-container")
                    .child(el("div").class("trip-title").text(tr.t("title")))
                    .child(
                        el("div")
                            .class("trip-dates")
                            .child(el("span").text(tr.t("travelDates")))
                            .text(format!("{} - {}{}", start, end, total)),
                    ),
            ),
        )
        .child(el("nav").class("navigation-buttons").children(links))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use pretty_assertions::assert_eq;

    fn info() -> TripInfo {
        TripInfo {
            start_date: "2026-02-07".into(),
            end_date: "2026-03-02".into(),
            participants: vec!["Jane".into()],
            note_authors: vec![],
        }
    }

    #[test]
    fn shows_range_and_inclusive_days() {
        let tr = Translations::builtin(Locale::ZhTw);
        let header = render_header(Some(&info()), &tr, PageKind::Flight);
        let dates = header.find_by_class("trip-dates");
        assert_eq!(
            Node::from(dates[0].clone()).text_content(),
            "旅行日期：2026年2月7日 - 2026年3月2日 (共24天)"
        );
    }

    #[test]
    fn omits_link_to_current_page() {
        let tr = Translations::builtin(Locale::En);
        let header = render_header(Some(&info()), &tr, PageKind::Itinerary);
        let hrefs: Vec<&str> = header
            .find_by_class("nav-btn")
            .into_iter()
            .filter_map(|a| a.get_attr("href"))
            .collect();
        assert_eq!(
            hrefs,
            vec!["flight.html", "accommodation.html", "task.html", "todo.html"]
        );
    }

    #[test]
    fn day_pages_link_to_every_nav_page() {
        let tr = Translations::builtin(Locale::En);
        let header = render_header(Some(&info()), &tr, PageKind::Day);
        assert_eq!(header.find_by_class("nav-btn").len(), 5);
    }

    #[test]
    fn missing_trip_info_is_an_error_block() {
        let tr = Translations::builtin(Locale::ZhTw);
        let header = render_header(None, &tr, PageKind::Task);
        assert_eq!(header.find_by_class("error-message").len(), 1);
        assert_eq!(header.text_content(), "載入資料失敗");
    }
}
