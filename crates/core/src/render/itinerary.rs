use std::collections::HashMap;

use serde_json::Value;

use crate::annotate::{split_important_note, IMPORTANT_NOTE_MARKER};
use crate::i18n::Translations;
use crate::markup::{el, lines, Element, Node};
use crate::model::{
    decode_records, display_name, note_lines, notes_url, Decoded, ItineraryDay, NoteAuthor,
    NotesBook, Stage,
};

use super::navigation::{day_page_file, CommentTarget};
use super::Rendered;

/// Remote notes as seen by the itinerary page once the background load has
/// settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesState {
    /// No endpoint configured: the notes panel is left out.
    Disabled,
    Loaded(NotesBook),
    /// The wait was abandoned before the load settled.
    Failed,
}

/// Comment file content fetched ahead of rendering, keyed by the path used
/// in the itinerary document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentFragment {
    Loaded(String),
    Failed,
}

#[derive(Debug, Clone, Copy)]
pub struct ItineraryContext<'a> {
    pub notes: &'a NotesState,
    pub roster: &'a [NoteAuthor],
    pub notes_endpoint: Option<&'a str>,
    pub comments: &'a HashMap<String, CommentFragment>,
}

/// Comment fragment paths referenced by `stages`, in document order and
/// without duplicates. These are fetched before rendering.
pub fn comment_files(stages: &[Stage]) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for day in stages.iter().flat_map(|stage| stage.itinerary.iter()) {
        if let Some(CommentTarget::Fragment(path)) =
            day.comments.as_deref().map(CommentTarget::classify)
        {
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }
    files
}

pub fn decode_stages(doc: &[Value]) -> Decoded<Stage> {
    decode_records("stage", doc)
}

pub fn render_itinerary(doc: &[Value], ctx: &ItineraryContext<'_>, tr: &Translations) -> Rendered {
    let stages = decode_stages(doc);
    let mut warnings = stages.warnings;
    let mut modals = Vec::new();

    let sections: Vec<Element> = stages
        .items
        .iter()
        .map(|stage| render_stage(stage, ctx, tr, &mut modals, &mut warnings))
        .collect();

    let body = el("div")
        .class("itinerary")
        .children(sections)
        .children(modals);
    Rendered::new(body).with_warnings(warnings)
}

fn render_stage(
    stage: &Stage,
    ctx: &ItineraryContext<'_>,
    tr: &Translations,
    modals: &mut Vec<Element>,
    warnings: &mut Vec<String>,
) -> Element {
    let stage_id = stage.stage_id.to_string();
    let days = stage
        .itinerary
        .iter()
        .enumerate()
        .map(|(index, day)| render_day(stage, index, day, ctx, tr, modals, warnings));

    let mut content = el("div").class("stage-content").children(days);
    if let Some(notes) = notes_panel(stage, ctx, tr) {
        content = content.child(notes);
    }

    el("section")
        .class("itinerary-stage")
        .data("stage-id", stage_id)
        .child(
            el("details")
                .flag("open")
                .child(
                    el("summary")
                        .class("stage-header")
                        .child(el("h2").text(tr.stage_title(stage.stage_id.0, &stage.location)))
                        .child(el("div").class("stage-meta").child(
                            el("span").text(format!("{}{}", tr.t("datesLabel"), stage.dates)),
                        )),
                )
                .child(content),
        )
}

fn render_day(
    stage: &Stage,
    index: usize,
    day: &ItineraryDay,
    ctx: &ItineraryContext<'_>,
    tr: &Translations,
    modals: &mut Vec<Element>,
    warnings: &mut Vec<String>,
) -> Element {
    let mut buttons = Vec::new();
    if let Some(url) = day.webpage.as_deref().filter(|u| !u.trim().is_empty()) {
        buttons.push(
            el("a")
                .class("webpage-btn")
                .attr("href", url.trim())
                .attr("target", "_blank")
                .attr("rel", "noopener")
                .text(tr.t("relatedSite")),
        );
    }

    if let Some(comments) = day.comments.as_deref().filter(|c| !c.trim().is_empty()) {
        match CommentTarget::classify(comments) {
            CommentTarget::DayPage(id) => buttons.push(
                el("a")
                    .class("comments-btn")
                    .attr("href", day_page_file(&id))
                    .text(tr.t("viewComments")),
            ),
            CommentTarget::Fragment(path) => {
                let modal_id = format!("comment-{}-{}", stage.stage_id, index + 1);
                buttons.push(
                    el("button")
                        .class("comments-btn")
                        .attr("type", "button")
                        .attr("popovertarget", modal_id.clone())
                        .data("comment-file", path.clone())
                        .text(tr.t("viewComments")),
                );
                modals.push(comment_modal(&modal_id, ctx.comments.get(&path), tr));
            }
            CommentTarget::Invalid(raw) => {
                warnings.push(format!(
                    "stage {} day {}: unusable comments target '{}'",
                    stage.stage_id, day.date, raw
                ));
            }
        }
    }

    let mut header = el("div").class("date-header").text(day.date.clone());
    if !buttons.is_empty() {
        header = header.child(el("div").class("date-buttons").children(buttons));
    }

    el("div")
        .class("itinerary-date")
        .child(header)
        .child(
            el("ul")
                .class("activity-list")
                .children(day.activities.iter().map(String::as_str).map(activity_item)),
        )
}

fn activity_item(activity: &str) -> Element {
    match split_important_note(activity) {
        (before, Some(note)) => el("li")
            .class("activity-item")
            .child(el("div").class("normal-activity").text(before))
            .child(
                el("div")
                    .class("important-note")
                    .text(format!("{}{}", IMPORTANT_NOTE_MARKER, note)),
            ),
        (text, None) => el("li").class("activity-item").text(text),
    }
}

fn comment_modal(id: &str, fragment: Option<&CommentFragment>, tr: &Translations) -> Element {
    let content = match fragment {
        Some(CommentFragment::Loaded(markup)) => el("div")
            .class("comment-content")
            .child(Node::Trusted(markup.clone())),
        Some(CommentFragment::Failed) | None => el("div")
            .class("comment-content comment-error")
            .text(tr.t("commentLoadError")),
    };

    el("dialog")
        .class("edit-modal comment-modal")
        .id(id)
        .flag("popover")
        .child(
            el("div")
                .class("modal-content")
                .child(modal_header(tr.t("commentTitle"), id, tr))
                .child(el("div").class("modal-body").child(content)),
        )
}

fn modal_header(title: &str, id: &str, tr: &Translations) -> Element {
    el("div")
        .class("modal-header")
        .child(el("h2").text(title))
        .child(
            el("button")
                .class("close-modal")
                .attr("type", "button")
                .attr("popovertarget", id)
                .attr("popovertargetaction", "hide")
                .attr("aria-label", tr.t("close"))
                .text("×"),
        )
}

fn notes_panel(stage: &Stage, ctx: &ItineraryContext<'_>, tr: &Translations) -> Option<Element> {
    let book = match ctx.notes {
        NotesState::Disabled => return None,
        NotesState::Loaded(book) => Some(book),
        NotesState::Failed => None,
    };

    let notes_id = format!("notes-{}", stage.stage_id);
    let content = match book {
        None => el("p").class("notes-error").text(tr.t("loadNotesError")),
        Some(book) => {
            let grouped = book.grouped(stage.stage_id, ctx.roster);
            if grouped.is_empty() {
                el("p").class("no-notes").text(tr.t("noNotes"))
            } else {
                el("div").children(grouped.into_iter().map(|(person, texts)| {
                    el("div")
                        .class("person-notes")
                        .child(el("strong").text(display_name(ctx.roster, &person)))
                        .child(
                            el("ul").children(
                                texts
                                    .into_iter()
                                    .map(|text| el("li").child(lines(note_lines(text)))),
                            ),
                        )
                }))
            }
        }
    };

    let mut actions = el("div").class("notes-actions");
    let mut editor = None;
    if let Some(endpoint) = ctx.notes_endpoint {
        let edit_id = format!("edit-{}", stage.stage_id);
        actions = actions.child(
            el("button")
                .class("edit-notes-btn")
                .attr("type", "button")
                .attr("popovertarget", edit_id.clone())
                .flag_if("disabled", book.is_none())
                .text(tr.t("editNotes")),
        );
        if let Some(book) = book {
            editor = Some(edit_modal(&edit_id, stage, book, endpoint, ctx.roster, tr));
        }
    }

    Some(
        el("div")
            .class("stage-notes")
            .child(
                el("details")
                    .class("notes-toggle")
                    .child(
                        el("summary")
                            .class("notes-header")
                            .child(el("h3").text(tr.t("notesHeading")))
                            .child(el("span").class("toggle-notes-btn").text(tr.t("showNotes"))),
                    )
                    .child(el("div").class("notes-content").id(notes_id).child(content)),
            )
            .child(actions)
            .children(editor),
    )
}

/// Form posting `{stage, person, activity}` to the notes endpoint, prefilled
/// with the first person's latest note.
fn edit_modal(
    id: &str,
    stage: &Stage,
    book: &NotesBook,
    endpoint: &str,
    roster: &[NoteAuthor],
    tr: &Translations,
) -> Element {
    let title = format!(
        "{} - {}",
        tr.t("editNotes"),
        tr.stage_title(stage.stage_id.0, &stage.location)
    );

    let person_field = if roster.is_empty() {
        el("input")
            .attr("type", "text")
            .attr("name", "person")
            .flag("required")
    } else {
        el("div")
            .class("person-options")
            .children(roster.iter().enumerate().map(|(index, author)| {
                el("label")
                    .class("person-option")
                    .child(
                        el("input")
                            .class("person-radio")
                            .attr("type", "radio")
                            .attr("name", "person")
                            .attr("value", author.id.clone())
                            .flag_if("checked", index == 0),
                    )
                    .child(el("span").class("person-name").text(author.name.clone()))
            }))
    };

    let prefill = roster
        .first()
        .and_then(|author| book.latest(stage.stage_id, &author.id))
        .unwrap_or_default();

    let form = el("form")
        .class("notes-form")
        .attr("method", "post")
        .attr("action", notes_url(endpoint, "update"))
        .child(
            el("input")
                .attr("type", "hidden")
                .attr("name", "stage")
                .attr("value", stage.stage_id.to_string()),
        )
        .child(
            el("div")
                .class("modal-body")
                .child(
                    el("fieldset")
                        .class("form-section")
                        .child(el("legend").text(tr.t("choosePerson")))
                        .child(person_field),
                )
                .child(
                    el("label")
                        .class("form-section")
                        .child(el("h3").text(tr.t("noteContent")))
                        .child(
                            el("textarea")
                                .class("note-content")
                                .attr("name", "activity")
                                .attr("rows", "6")
                                .attr("placeholder", tr.t("notePlaceholder"))
                                .text(prefill),
                        ),
                ),
        )
        .child(
            el("div")
                .class("modal-footer")
                .child(
                    el("button")
                        .class("cancel-btn")
                        .attr("type", "button")
                        .attr("popovertarget", id)
                        .attr("popovertargetaction", "hide")
                        .text(tr.t("cancel")),
                )
                .child(
                    el("button")
                        .class("save-btn")
                        .attr("type", "submit")
                        .text(tr.t("save")),
                ),
        );

    el("dialog")
        .class("edit-modal")
        .id(id)
        .flag("popover")
        .child(
            el("div")
                .class("modal-content")
                .child(modal_header(&title, id, tr))
                .child(form),
        )
}
