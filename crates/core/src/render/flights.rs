use serde::Deserialize;
use serde_json::Value;

use crate::dates::{self, DateStyle};
use crate::i18n::{Locale, Translations};
use crate::markup::{el, lines, Element, Node};
use crate::model::{decode_records, Airport, Flight, FlightLegs};

use super::{PageKind, Rendered};

const COLUMNS: [&str; 7] = [
    "flightNumber",
    "departure",
    "destination",
    "date",
    "departureTime",
    "arrivalTime",
    "flightDuration",
];

/// Outbound and inbound tables from the first entry of `data_flights.json`.
pub fn render_flights(doc: &[Value], tr: &Translations) -> Rendered {
    let Some(first) = doc.first() else {
        return Rendered::failed(tr, PageKind::Flight, "no flight entries");
    };
    let legs = match FlightLegs::deserialize(first) {
        Ok(legs) => legs,
        Err(err) => return Rendered::failed(tr, PageKind::Flight, err),
    };

    let outbound = decode_records::<Flight>("outbound flight", &legs.outbound);
    let inbound = decode_records::<Flight>("inbound flight", &legs.inbound);

    let body = el("div")
        .class("flights")
        .child(el("h2").text(tr.t("outboundFlights")))
        .child(flight_table("outbound-table", &outbound.items, tr))
        .child(el("h2").text(tr.t("inboundFlights")))
        .child(flight_table("inbound-table", &inbound.items, tr));

    Rendered::new(body)
        .with_warnings(outbound.warnings)
        .with_warnings(inbound.warnings)
}

fn flight_table(id: &str, flights: &[Flight], tr: &Translations) -> Element {
    let header = el("tr").children(COLUMNS.iter().map(|key| el("th").text(tr.t(key))));

    let mut rows = Vec::new();
    for (index, flight) in flights.iter().enumerate() {
        rows.push(flight_row(flight, tr));
        let is_last = index + 1 == flights.len();
        if let (false, Some(layover)) = (is_last, flight.layover.as_deref()) {
            rows.push(transfer_row(flight, layover, tr));
        }
    }

    el("table")
        .id(id)
        .class("flight-table")
        .child(el("thead").child(header))
        .child(el("tbody").children(rows))
}

fn flight_row(flight: &Flight, tr: &Translations) -> Element {
    let locale = tr.locale();
    let na = locale.not_available();
    let cell = |key: &str| el("td").attr("data-label", tr.t(key));
    let value = |field: &Option<String>| {
        field
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(na)
            .to_string()
    };
    let date = flight
        .date
        .as_deref()
        .map(|d| dates::format_date(d, locale, DateStyle::Short))
        .unwrap_or_else(|| na.to_string());

    el("tr")
        .child(cell("flightNumber").text(value(&flight.flight)))
        .child(cell("departure").child(airport_lines(flight.departure.as_deref(), na)))
        .child(cell("destination").child(airport_lines(flight.destination.as_deref(), na)))
        .child(cell("date").text(date))
        .child(cell("departureTime").text(value(&flight.departure_time)))
        .child(cell("arrivalTime").text(value(&flight.arrival_time)))
        .child(
            cell("flightDuration")
                .class("flight-duration")
                .text(value(&flight.flight_duration)),
        )
}

/// Code, city and airport name on separate lines.
fn airport_lines(raw: Option<&str>, na: &str) -> Node {
    let airport = Airport::parse(raw);
    let or_na = |part: Option<String>| part.unwrap_or_else(|| na.to_string());
    lines([
        or_na(airport.code),
        or_na(airport.city),
        or_na(airport.name),
    ])
}

fn transfer_row(flight: &Flight, layover: &str, tr: &Translations) -> Element {
    let city = Airport::parse(flight.destination.as_deref())
        .city
        .unwrap_or_else(|| tr.locale().not_available().to_string());
    let separator = match tr.locale() {
        Locale::ZhTw => "：",
        Locale::En => ": ",
    };
    el("tr").class("transfer").child(
        el("td")
            .attr("colspan", COLUMNS.len().to_string())
            .text(format!("{} {}{}{}", tr.t("transferAt"), city, separator, layover)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc() -> Vec<Value> {
        vec![json!({
            "outbound": [
                {
                    "flight": "CI53",
                    "departure": "TPE/Taoyuan International/Taipei",
                    "destination": "BNE/Brisbane Airport/Brisbane",
                    "date": "2026-02-06",
                    "departure_time": "23:40",
                    "arrival_time": "10:25",
                    "flight_duration": "8h45m",
                    "layover": "3h"
                },
                {
                    "flight": "NZ136",
                    "departure": "BNE/Brisbane Airport/Brisbane",
                    "destination": "CHC/Christchurch Airport/Christchurch",
                    "date": "2026-02-07",
                    "layover": "ignored on the last leg"
                }
            ],
            "inbound": [ "not a flight" ]
        })]
    }

    #[test]
    fn renders_both_tables_with_transfer_between_legs() {
        let tr = Translations::builtin(Locale::ZhTw);
        let rendered = render_flights(&doc(), &tr);
        let transfers = rendered.body.find_by_class("transfer");
        assert_eq!(transfers.len(), 1);
        assert_eq!(
            Node::from(transfers[0].clone()).text_content(),
            "轉機於 Brisbane：3h"
        );
        assert_eq!(rendered.warnings.len(), 1);
        assert!(rendered.warnings[0].contains("inbound flight #1"));
    }

    #[test]
    fn missing_fields_render_as_not_available() {
        let tr = Translations::builtin(Locale::En);
        let rendered = render_flights(&doc(), &tr);
        let html = rendered.body.to_html();
        assert!(html.contains("<td data-label=\"Departure Time\">N/A</td>"));
        assert!(html.contains("Feb 7, 2026"));
        assert!(html.contains("TPE<br>Taipei<br>Taoyuan International"));
    }

    #[test]
    fn empty_document_is_a_load_error() {
        let tr = Translations::builtin(Locale::En);
        let rendered = render_flights(&[], &tr);
        assert!(rendered.is_error());
        assert_eq!(
            rendered.body.text_content(),
            "Unable to load flight data, please check network connection"
        );
    }
}
