use serde_json::Value;

use crate::annotate::activity_icon;
use crate::i18n::Translations;
use crate::markup::{el, Element};
use crate::model::{decode_records, TodoGroup};

use super::Rendered;

/// Group name shared by everyone; shown with a group icon.
const EVERYONE: &str = "所有人";

pub fn render_todo(doc: &[Value], tr: &Translations) -> Rendered {
    let groups = decode_records::<TodoGroup>("todo group", doc);
    let mut body = el("div")
        .class("todo-container")
        .children(groups.items.iter().map(todo_category));
    if groups.items.is_empty() {
        body = body.child(el("p").class("todo-empty").text(tr.t("noTodo")));
    }
    Rendered::new(body).with_warnings(groups.warnings)
}

fn todo_category(group: &TodoGroup) -> Element {
    let icon = if group.name == EVERYONE { "👥" } else { "👤" };
    el("div")
        .class("todo-category")
        .child(
            el("div")
                .class("category-title")
                .child(el("span").class("category-icon").text(icon))
                .text(format!(" {}", group.name)),
        )
        .child(
            el("div")
                .class("todo-list")
                .children(group.activities.iter().map(|activity| {
                    el("div").class("todo-item").child(
                        el("div")
                            .class("task-text")
                            .child(el("span").class("activity-icon").text(activity_icon(activity)))
                            .text(format!(" {}", activity)),
                    )
                })),
        )
}
