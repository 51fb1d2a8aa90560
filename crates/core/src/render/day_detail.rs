use crate::i18n::Translations;
use crate::markup::{el, Element};
use crate::model::{
    decode_records, ComparisonSection, DayDetail, DayFooter, Feature, HikeInfoSection,
    LabeledValue, Section, SectionLink, ZoneSection,
};

use super::navigation::DayNavigation;
use super::{PageKind, Rendered};

const FOOTER_NOTE_PREFIX: &str = "NOTE:";

pub fn render_day_detail(
    detail: &DayDetail,
    nav: Option<&DayNavigation>,
    tr: &Translations,
) -> Rendered {
    let sections = decode_records::<Section>("section", &detail.sections);
    let meta = &detail.meta;

    let mut header = el("div")
        .class("header")
        .child(el("h1").text(meta.title.clone()))
        .child(el("p").class("subtitle").text(meta.subtitle.clone()));
    if let Some(note) = meta.driving_note.as_deref().filter(|n| !n.trim().is_empty()) {
        header = header.child(el("div").class("driving-note").text(note));
    }

    let body = el("div")
        .class("day-detail")
        .child(
            el("a")
                .class("back-btn")
                .attr("href", PageKind::Itinerary.file_name().unwrap_or_default())
                .text(tr.t("backToItinerary")),
        )
        .child(header)
        .children(sections.items.iter().map(|section| match section {
            Section::Zone(zone) => zone_section(zone),
            Section::HikeInfo(hike) => hike_info_section(hike, tr),
            Section::ComparisonTable(table) => comparison_section(table, tr),
        }))
        .children(detail.footer.as_ref().map(footer))
        .children(nav.map(navigation));

    Rendered::new(body).with_warnings(sections.warnings)
}

fn info_grid(items: &[LabeledValue]) -> Option<Element> {
    if items.is_empty() {
        return None;
    }
    Some(el("div").class("info-grid").children(items.iter().map(|item| {
        el("div")
            .class("info-item")
            .child(el("strong").text(item.label.clone()))
            .child(el("p").text(item.value.clone()))
    })))
}

fn link_container(links: &[SectionLink]) -> Option<Element> {
    if links.is_empty() {
        return None;
    }
    Some(el("div").class("link-container").children(links.iter().map(|link| {
        el("a")
            .class("map-link")
            .attr("href", link.url.clone())
            .attr("target", "_blank")
            .attr("rel", "noopener")
            .text(link.text.clone())
    })))
}

fn bullet_list(items: &[String]) -> Element {
    el("ul").children(items.iter().map(|item| el("li").text(item.clone())))
}

fn zone_section(zone: &ZoneSection) -> Element {
    let mut section = el("div").class("zone-section");
    if let Some(title) = &zone.title {
        section = section.child(
            el("div")
                .class("zone-header")
                .child(el("div").class("zone-title").text(title.clone()))
                .children(
                    zone.badge
                        .as_ref()
                        .map(|badge| el("div").class("duration-badge").text(badge.clone())),
                ),
        );
        if let Some(description) = &zone.description {
            section = section.child(el("p").class("zone-description").text(description.clone()));
        }
    }

    section = section
        .children(info_grid(&zone.items))
        .children(link_container(&zone.links));

    if let Some(highlight) = &zone.highlight {
        let class = if highlight.is_warning() {
            "difficulty-highlight warning"
        } else {
            "difficulty-highlight"
        };
        section = section.child(el("div").class(class).text(highlight.text.clone()));
    }

    section.children(zone.time_blocks.iter().map(|block| {
        el("div")
            .class("time-block")
            .child(
                el("div")
                    .class("time-header")
                    .child(el("span").text(block.header.time.clone()))
                    .child(el("span").class("duration").text(block.header.label.clone())),
            )
            .child(el("div").class("activity-details").children(block.rows.iter().map(|row| {
                el("div")
                    .class("detail-row")
                    .child(el("div").class("detail-label").text(row.label.clone()))
                    .child(el("div").class("detail-content").text(row.content.clone()))
            })))
    }))
}

fn hike_info_section(hike: &HikeInfoSection, tr: &Translations) -> Element {
    let content = hike_info_content(hike, tr);
    match &hike.header_title {
        Some(title) => el("div")
            .class("trail-section")
            .child(
                el("div")
                    .class("trail-header")
                    .child(
                        el("div")
                            .class("trail-icon")
                            .text(hike.header_icon.clone().unwrap_or_default()),
                    )
                    .child(el("div").class("trail-name").text(title.clone())),
            )
            .child(content),
        None => content,
    }
}

fn hike_info_content(hike: &HikeInfoSection, tr: &Translations) -> Element {
    let mut div = el("div")
        .class("hike-info")
        .children(hike.title.as_ref().map(|title| el("h2").text(title.clone())))
        .children(info_grid(&hike.items));

    if let Some(taxi) = &hike.water_taxi {
        div = div.child(
            el("div")
                .class("water-taxi-alert")
                .child(el("strong").text(taxi.title.clone()))
                .text(taxi.description.clone()),
        );
        if !taxi.schedule.is_empty() {
            div = div.child(
                el("div")
                    .class("timetable")
                    .child(el("h3").text(tr.t("waterTaxiTimetable")))
                    .child(el("div").class("timetable-grid").children(taxi.schedule.iter().map(
                        |departure| {
                            el("div")
                                .class("timetable-item")
                                .child(
                                    el("div")
                                        .class("timetable-direction")
                                        .text(departure.direction.clone()),
                                )
                                .child(
                                    el("div")
                                        .class("timetable-times")
                                        .text(departure.times.clone()),
                                )
                        },
                    ))),
            );
        }
    }

    if let Some(highlight) = &hike.highlight {
        div = div.child(
            el("div")
                .class("difficulty-highlight")
                .child(el("strong").text(highlight.text.clone()))
                .children(
                    highlight
                        .detail
                        .as_ref()
                        .map(|detail| el("p").text(detail.clone())),
                ),
        );
    }

    if let Some(feature) = &hike.feature {
        div = div.child(feature_block("trail-feature", feature));
    }

    if let Some(points) = &hike.key_point_section {
        div = div
            .child(el("h2").class("key-points-title").text(points.title.clone()))
            .child(el("div").class("key-points").children(points.items.iter().map(|item| {
                el("div")
                    .class("key-point")
                    .child(el("strong").text(item.label.clone()))
                    .child(el("p").text(item.value.clone()))
            })));
    }

    div.children(link_container(&hike.links))
}

fn feature_block(class: &str, feature: &Feature) -> Element {
    el("div")
        .class(class)
        .child(el("h3").text(feature.title.clone()))
        .child(bullet_list(&feature.list))
}

fn comparison_section(table: &ComparisonSection, tr: &Translations) -> Element {
    let head = el("thead").child(
        el("tr").children(table.headers.iter().map(|h| el("th").text(h.clone()))),
    );
    let body = el("tbody").children(table.rows.iter().map(|row| {
        el("tr").children(row.iter().enumerate().map(|(i, cell)| {
            if i == 0 {
                el("td").child(el("strong").text(cell.clone()))
            } else {
                el("td").text(cell.clone())
            }
        }))
    }));

    let mut div = el("div")
        .class("hike-info")
        .child(el("h2").text(table.title.clone()))
        .child(el("table").class("comparison-table").child(head).child(body));

    for option in &table.pros_cons {
        div = div
            .child(el("h3").text(format!("{}{}", option.title, tr.t("analysisSuffix"))))
            .child(
                el("div")
                    .class("pros-cons")
                    .child(
                        el("div")
                            .class("pros")
                            .child(el("h4").text(tr.t("pros")))
                            .child(bullet_list(&option.pros)),
                    )
                    .child(
                        el("div")
                            .class("cons")
                            .child(el("h4").text(tr.t("cons")))
                            .child(bullet_list(&option.cons)),
                    ),
            );
    }

    if let Some(rec) = &table.recommendation {
        div = div.child(
            el("div")
                .class("recommendation-highlight")
                .child(el("strong").text(rec.title.clone()))
                .children(rec.items.iter().map(|item| feature_block("recommendation-item", item)))
                .children(
                    rec.warning
                        .as_ref()
                        .map(|warning| el("p").class("recommendation-warning").text(warning.clone())),
                ),
        );
    }

    div
}

fn footer(footer: &DayFooter) -> Element {
    el("footer")
        .class("day-footer")
        .children(
            footer
                .title
                .as_ref()
                .map(|title| el("p").child(el("strong").text(title.clone()))),
        )
        .children(footer.notes.iter().map(|note| match note.strip_prefix(FOOTER_NOTE_PREFIX) {
            Some(rest) => el("p").class("footer-note").text(rest.trim()),
            None => el("p").text(note.clone()),
        }))
}

fn navigation(nav: &DayNavigation) -> Element {
    let prev = match &nav.prev {
        Some(link) => el("a")
            .class("nav-btn prev-btn")
            .attr("href", link.href())
            .text(format!("← {}", link.date)),
        None => el("div"),
    };
    let next = match &nav.next {
        Some(link) => el("a")
            .class("nav-btn next-btn")
            .attr("href", link.href())
            .text(format!("{} →", link.date)),
        None => el("div"),
    };
    el("nav")
        .class("mobile-nav-footer")
        .child(el("div").class("nav-buttons").child(prev).child(next))
}
