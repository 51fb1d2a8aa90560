use crate::annotate::LinkSource;
use crate::dates::{self, DateStyle};
use crate::i18n::Translations;
use crate::markup::{el, Element};
use crate::model::{decode_records, Stay, StayDocument, StayStatus};
use crate::timeline::{nights_palette, StayInterval, TripWindow};

use super::Rendered;

/// A stay whose dates parsed, numbered across both lists.
struct StayCard<'a> {
    index: usize,
    stay: &'a Stay,
    status: StayStatus,
    nights: i64,
}

/// Confirmed and canceled stays plus a timeline of the confirmed ones.
///
/// `window` is the trip span from `trip-info.json`; without it the timeline
/// spans the confirmed stays themselves.
pub fn render_accommodation(
    doc: &StayDocument,
    window: Option<TripWindow>,
    tr: &Translations,
) -> Rendered {
    let confirmed = decode_records::<Stay>("confirmed stay", &doc.confirmed);
    let canceled = decode_records::<Stay>("canceled stay", &doc.canceled);
    let mut warnings = confirmed.warnings;
    warnings.extend(canceled.warnings);

    let mut cards = Vec::new();
    let all = confirmed
        .items
        .iter()
        .map(|stay| (stay, StayStatus::Confirmed))
        .chain(canceled.items.iter().map(|stay| (stay, StayStatus::Canceled)));
    for (stay, status) in all {
        match dates::nights_between(&stay.date_start, &stay.date_end) {
            Ok(nights) => cards.push(StayCard {
                index: cards.len(),
                stay,
                status,
                nights,
            }),
            Err(err) => warnings.push(format!("skipped stay '{}': {}", stay.accommodation, err)),
        }
    }

    let mut body = el("div").class("accommodation");

    let confirmed_cards: Vec<&StayCard> = cards
        .iter()
        .filter(|card| card.status == StayStatus::Confirmed)
        .collect();
    if !confirmed_cards.is_empty() {
        if let Some(overview) = overview(&confirmed_cards, window, tr, &mut warnings) {
            body = body.child(overview);
        }
    }

    for (status, heading) in [
        (StayStatus::Confirmed, "confirmedHeading"),
        (StayStatus::Canceled, "canceledHeading"),
    ] {
        let section: Vec<Element> = cards
            .iter()
            .filter(|card| card.status == status)
            .map(|card| stay_card(card, tr))
            .collect();
        if section.is_empty() {
            continue;
        }
        body = body.child(
            el("section")
                .class(status.as_str())
                .child(el("h2").text(tr.t(heading)))
                .child(el("div").class("accommodation-list").children(section)),
        );
    }

    Rendered::new(body).with_warnings(warnings)
}

fn overview(
    cards: &[&StayCard],
    window: Option<TripWindow>,
    tr: &Translations,
    warnings: &mut Vec<String>,
) -> Option<Element> {
    let mut intervals = Vec::new();
    for card in cards {
        match StayInterval::parse(&card.stay.date_start, &card.stay.date_end, &card.stay.location) {
            Ok(interval) => intervals.push((card, interval)),
            Err(err) => warnings.push(format!(
                "timeline: stay '{}' left out: {}",
                card.stay.accommodation, err
            )),
        }
    }

    let window = match window {
        Some(window) => window,
        None => {
            let start = intervals.iter().map(|(_, i)| i.start).min()?;
            let end = intervals.iter().map(|(_, i)| i.end).max()?;
            TripWindow::new(start, end).ok()?
        }
    };

    let mut items = Vec::new();
    for (card, interval) in &intervals {
        let placement = match window.place(interval) {
            Ok(placement) => placement,
            Err(err) => {
                warnings.push(format!("timeline: {}", err));
                return None;
            }
        };
        let (background, color) = nights_palette(card.nights);
        items.push(
            el("a")
                .class("overview-item confirmed")
                .attr("href", format!("#stay-{}", card.index))
                .data("index", card.index.to_string())
                .attr(
                    "style",
                    format!(
                        "{}; background-color: {}; color: {}",
                        placement.css(),
                        background,
                        color
                    ),
                )
                .attr("title", format!("{} - {}", interval.label, tr.nights(card.nights)))
                .child(el("span").class("overview-nights").text(card.nights.to_string())),
        );
    }

    Some(
        el("div")
            .class("stay-overview")
            .child(el("h3").text(tr.t("stayOverview")))
            .child(el("div").class("overview-items").children(items)),
    )
}

fn stay_card(card: &StayCard, tr: &Translations) -> Element {
    let stay = card.stay;
    let locale = tr.locale();
    let (background, color) = nights_palette(card.nights);
    let status_label = match card.status {
        StayStatus::Confirmed => tr.t("statusConfirmed"),
        StayStatus::Canceled => tr.t("statusCanceled"),
    };
    let range = format!(
        "{} – {}",
        dates::format_date(&stay.date_start, locale, DateStyle::Long),
        dates::format_date(&stay.date_end, locale, DateStyle::Long)
    );

    let mut details = el("div")
        .class("accommodation-details")
        .child(detail_row(tr.t("bookingSource"), &stay.booking_source))
        .child(detail_row(tr.t("stayType"), &stay.details));
    for (key, value) in [
        ("address", &stay.address),
        ("checkIn", &stay.check_in),
        ("checkOut", &stay.check_out),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            details = details.child(detail_row(tr.t(key), value));
        }
    }

    let links = stay.link_list();
    if !links.is_empty() {
        details = details.child(
            el("div")
                .class("links-container")
                .child(el("strong").text(tr.t("relatedLinks")))
                .child(el("div").class("links-list").children(links.into_iter().map(|link| {
                    el("a")
                        .class("link-button")
                        .attr("href", link)
                        .attr("target", "_blank")
                        .attr("rel", "noopener")
                        .child(el("span").class("link-icon").text("🔗"))
                        .child(
                            el("span")
                                .class("link-text")
                                .text(LinkSource::detect(link).label(tr)),
                        )
                }))),
        );
    }

    el("article")
        .class("accommodation-item")
        .id(format!("stay-{}", card.index))
        .data("index", card.index.to_string())
        .data("nights", card.nights.to_string())
        .child(
            el("div")
                .class("accommodation-header")
                .child(
                    el("div")
                        .class("accommodation-title")
                        .child(el("h3").text(stay.accommodation.clone()))
                        .child(el("div").class("location-badge").text(stay.location.clone())),
                )
                .child(
                    el("span")
                        .class(format!("status {}", card.status.as_str()))
                        .text(status_label),
                ),
        )
        .child(
            el("div")
                .class("stay-duration")
                .child(
                    el("div")
                        .class("nights-badge")
                        .attr(
                            "style",
                            format!("background-color: {}; color: {}", background, color),
                        )
                        .text(tr.nights(card.nights)),
                )
                .child(el("div").class("date-range").text(range)),
        )
        .child(details)
}

fn detail_row(label: &str, value: &str) -> Element {
    el("div")
        .class("detail-row")
        .child(el("span").class("detail-label").text(label))
        .child(el("span").class("detail-value").text(value))
}
