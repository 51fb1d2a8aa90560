use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Relative document paths under the data root.
pub mod paths {
    pub const TRIP_INFO: &str = "trip-info.json";
    pub const LANGUAGE: &str = "language.json";
    pub const FLIGHTS: &str = "data_flights.json";
    pub const ITINERARY: &str = "data_itinerary.json";
    pub const SLEEP: &str = "data_sleep.json";
    pub const TASKS: &str = "data_task.json";
    pub const TODO: &str = "data_todo.json";

    pub fn day_detail(id: &str) -> String {
        format!("day_details/{}.json", id)
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected {expected} at the top level")]
    Shape { expected: &'static str },
}

/// Records that decoded, plus one warning per record that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Decode each value on its own so one malformed record does not take the
/// rest of the document with it.
pub fn decode_records<T: DeserializeOwned>(kind: &str, values: &[Value]) -> Decoded<T> {
    let mut decoded = Decoded::default();
    for (index, value) in values.iter().enumerate() {
        match T::deserialize(value) {
            Ok(item) => decoded.items.push(item),
            Err(err) => decoded
                .warnings
                .push(format!("skipped {} #{}: {}", kind, index + 1, err)),
        }
    }
    decoded
}

/// Parse a document whose top level must be an array.
pub fn parse_list(json: &str) -> Result<Vec<Value>, DocumentError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(values) => Ok(values),
        _ => Err(DocumentError::Shape { expected: "an array" }),
    }
}

pub fn parse_document<T: DeserializeOwned>(json: &str) -> Result<T, DocumentError> {
    Ok(serde_json::from_str(json)?)
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripInfo {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub note_authors: Vec<NoteAuthor>,
}

impl TripInfo {
    /// People who can leave notes: `noteAuthors` when present, otherwise the
    /// participant names used as both id and display name.
    pub fn roster(&self) -> Vec<NoteAuthor> {
        if !self.note_authors.is_empty() {
            return self.note_authors.clone();
        }
        self.participants
            .iter()
            .map(|name| NoteAuthor {
                id: name.clone(),
                name: name.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NoteAuthor {
    pub id: String,
    pub name: String,
}

/// One element of `data_flights.json`. Flights are kept raw so each one can
/// be decoded on its own.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FlightLegs {
    #[serde(default)]
    pub outbound: Vec<Value>,
    #[serde(default)]
    pub inbound: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Flight {
    pub flight: Option<String>,
    pub departure: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub flight_duration: Option<String>,
    pub layover: Option<String>,
}

/// `CODE/Name/City` as written in the flights document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Airport {
    pub code: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
}

impl Airport {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut parts = raw
            .unwrap_or_default()
            .split('/')
            .map(str::trim)
            .map(|part| (!part.is_empty()).then(|| part.to_string()));
        Self {
            code: parts.next().flatten(),
            name: parts.next().flatten(),
            city: parts.next().flatten(),
        }
    }
}

/// Stage number. Accepts `3` as well as `"3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StageId(pub u32);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StageId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(StageId)
            .map_err(|_| anyhow!("Invalid stage '{}': expected a positive number", s))
    }
}

impl<'de> Deserialize<'de> for StageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => u32::try_from(n)
                .map(StageId)
                .map_err(|_| de::Error::custom(format!("stage {} out of range", n))),
            Raw::Float(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => {
                Ok(StageId(f as u32))
            }
            Raw::Float(f) => Err(de::Error::custom(format!("invalid stage {}", f))),
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Stage {
    pub stage_id: StageId,
    pub location: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ItineraryDay {
    pub date: String,
    #[serde(default)]
    pub activities: Vec<String>,
    pub webpage: Option<String>,
    pub comments: Option<String>,
}

/// `data_sleep.json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StayDocument {
    #[serde(default)]
    pub confirmed: Vec<Value>,
    #[serde(default)]
    pub canceled: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Stay {
    pub accommodation: String,
    pub location: String,
    pub date_start: String,
    pub date_end: String,
    #[serde(default)]
    pub booking_source: String,
    #[serde(default)]
    pub details: String,
    pub address: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub links: Option<String>,
}

impl Stay {
    /// Non-empty entries of the comma separated `links` field.
    pub fn link_list(&self) -> Vec<&str> {
        self.links
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayStatus {
    Confirmed,
    Canceled,
}

impl StayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StayStatus::Confirmed => "confirmed",
            StayStatus::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MemberTasks {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TodoGroup {
    pub name: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

/// `day_details/<id>.json`. Sections stay raw until render time so an
/// unknown or broken section is skipped on its own.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DayDetail {
    pub meta: DayMeta,
    #[serde(default)]
    pub sections: Vec<Value>,
    pub footer: Option<DayFooter>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayMeta {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub driving_note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DayFooter {
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Section {
    Zone(ZoneSection),
    HikeInfo(HikeInfoSection),
    ComparisonTable(ComparisonSection),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSection {
    pub title: Option<String>,
    pub badge: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<LabeledValue>,
    #[serde(default)]
    pub links: Vec<SectionLink>,
    pub highlight: Option<Highlight>,
    #[serde(default)]
    pub time_blocks: Vec<TimeBlock>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HikeInfoSection {
    pub header_title: Option<String>,
    pub header_icon: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<LabeledValue>,
    pub water_taxi: Option<WaterTaxi>,
    pub highlight: Option<Highlight>,
    pub feature: Option<Feature>,
    pub key_point_section: Option<KeyPoints>,
    #[serde(default)]
    pub links: Vec<SectionLink>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub pros_cons: Vec<ProsCons>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LabeledValue {
    pub label: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SectionLink {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Highlight {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: String,
    pub detail: Option<String>,
}

impl Highlight {
    pub fn is_warning(&self) -> bool {
        self.kind.as_deref() == Some("warning")
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TimeBlock {
    pub header: TimeBlockHeader,
    #[serde(default)]
    pub rows: Vec<TimeBlockRow>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TimeBlockHeader {
    pub time: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TimeBlockRow {
    pub label: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WaterTaxi {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: Vec<TaxiDeparture>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TaxiDeparture {
    pub direction: String,
    pub times: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Feature {
    pub title: String,
    #[serde(default)]
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct KeyPoints {
    pub title: String,
    #[serde(default)]
    pub items: Vec<LabeledValue>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProsCons {
    pub title: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    #[serde(default)]
    pub items: Vec<Feature>,
    pub warning: Option<String>,
}

/// Row returned by the notes endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NoteRow {
    pub stage: StageId,
    pub person: String,
    #[serde(default)]
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNote {
    pub person: String,
    pub text: String,
}

/// Notes grouped by stage, each stage keeping endpoint row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesBook {
    stages: BTreeMap<StageId, Vec<StageNote>>,
}

impl NotesBook {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = NoteRow>,
    {
        let mut stages: BTreeMap<StageId, Vec<StageNote>> = BTreeMap::new();
        for row in rows {
            stages.entry(row.stage).or_default().push(StageNote {
                person: row.person.trim().to_string(),
                text: row.activity,
            });
        }
        Self { stages }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage(&self, stage: StageId) -> &[StageNote] {
        self.stages.get(&stage).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn stages(&self) -> impl Iterator<Item = (StageId, &[StageNote])> {
        self.stages.iter().map(|(id, notes)| (*id, notes.as_slice()))
    }

    /// Notes of one stage grouped per person: roster members first in
    /// roster order, then anyone else in order of first appearance.
    pub fn grouped(&self, stage: StageId, roster: &[NoteAuthor]) -> Vec<(String, Vec<&str>)> {
        let notes = self.stage(stage);
        let mut people: Vec<&str> = roster.iter().map(|author| author.id.as_str()).collect();
        for note in notes {
            if !people.contains(&note.person.as_str()) {
                people.push(&note.person);
            }
        }
        people
            .into_iter()
            .filter_map(|person| {
                let texts: Vec<&str> = notes
                    .iter()
                    .filter(|note| note.person == person)
                    .map(|note| note.text.as_str())
                    .collect();
                (!texts.is_empty()).then(|| (person.to_string(), texts))
            })
            .collect()
    }

    /// Latest note of `person` in `stage`, used to prefill the edit form.
    pub fn latest(&self, stage: StageId, person: &str) -> Option<&str> {
        self.stage(stage)
            .iter()
            .rev()
            .find(|note| note.person == person)
            .map(|note| note.text.as_str())
    }
}

/// Display name for a person id; unknown ids are shown as is.
pub fn display_name<'a>(roster: &'a [NoteAuthor], person: &'a str) -> &'a str {
    roster
        .iter()
        .find(|author| author.id == person)
        .map(|author| author.name.as_str())
        .unwrap_or(person)
}

/// Lines of a note trimmed, with blank lines dropped.
pub fn note_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// `endpoint` with a `path=` query parameter added, keeping any query the
/// endpoint already carries.
pub fn notes_url(endpoint: &str, path: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}path={}", endpoint, separator, path)
}
