use serde_json::Value;

use crate::annotate::annotate;
use crate::i18n::Translations;
use crate::markup::{el, Element};
use crate::model::{decode_records, MemberTasks};

use super::Rendered;

/// One collapsible card per member, each task tagged with its category and
/// any date or price found in the text.
pub fn render_tasks(doc: &[Value], tr: &Translations) -> Rendered {
    let members = decode_records::<MemberTasks>("member", doc);
    let cards = members.items.iter().map(|member| member_card(member, tr));
    Rendered::new(el("div").class("task-container").children(cards)).with_warnings(members.warnings)
}

fn member_card(member: &MemberTasks, tr: &Translations) -> Element {
    let initial: String = member.name.chars().take(1).collect();
    el("details")
        .class("member-card")
        .flag("open")
        .child(
            el("summary").class("member-header").child(
                el("h2")
                    .child(el("span").class("member-icon").text(initial))
                    .text(format!(" {} ", member.name))
                    .child(
                        el("span")
                            .class("task-count")
                            .text(tr.task_count(member.tasks.len())),
                    ),
            ),
        )
        .child(
            el("ul")
                .class("task-list")
                .children(member.tasks.iter().map(|task| task_item(task, tr))),
        )
}

fn task_item(task: &str, tr: &Translations) -> Element {
    let annotation = annotate(task);
    let category = annotation.category;
    let locale = tr.locale();

    let date = annotation
        .date
        .map(|badge| el("span").class("task-date").text(badge.label(locale)));
    let price = annotation
        .price
        .map(|badge| el("span").class("task-price").text(badge.label()));

    el("li")
        .class("task-item")
        .data("category", category.as_str())
        .child(
            el("div")
                .class(format!("task-icon {}", category.as_str()))
                .text(category.icon()),
        )
        .child(
            el("div")
                .class("task-content")
                .text(task)
                .child(
                    el("span")
                        .class(format!("category-tag {}", category.as_str()))
                        .text(category.label(tr)),
                )
                .children(date)
                .children(price),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use crate::markup::Node;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc() -> Vec<Value> {
        vec![
            json!({
                "name": "靜雯",
                "tasks": ["02/20 購買 120 紐幣 門票", "辦理國際駕照", "換錢"]
            }),
            json!({ "name": 42 }),
            json!({ "name": "Jane", "tasks": [] }),
        ]
    }

    #[test]
    fn member_cards_show_initial_and_count() {
        let tr = Translations::builtin(Locale::ZhTw);
        let rendered = render_tasks(&doc(), &tr);
        let cards = rendered.body.find_by_class("member-card");
        assert_eq!(cards.len(), 2);
        let header = Node::from(cards[0].clone());
        assert_eq!(header.find_by_class("member-icon").len(), 1);
        assert!(header.text_content().starts_with("靜 靜雯 3 個任務"));
        assert_eq!(rendered.warnings.len(), 1);
    }

    #[test]
    fn tasks_carry_category_date_and_price_badges() {
        let tr = Translations::builtin(Locale::ZhTw);
        let rendered = render_tasks(&doc(), &tr);
        let items = rendered.body.find_by_class("task-item");
        let categories: Vec<&str> = items
            .iter()
            .filter_map(|item| item.get_attr("data-category"))
            .collect();
        assert_eq!(categories, vec!["shopping", "transportation", "other"]);

        let first = Node::from(items[0].clone());
        assert_eq!(
            first.find_by_class("task-date").len() + first.find_by_class("task-price").len(),
            2
        );
        assert!(first.text_content().contains("2月20日"));
        assert!(first.text_content().contains("120 NZD"));

        let last = Node::from(items[2].clone());
        assert!(last.find_by_class("task-date").is_empty());
        assert!(last.find_by_class("task-price").is_empty());
    }

    #[test]
    fn english_count_is_pluralized() {
        let tr = Translations::builtin(Locale::En);
        let rendered = render_tasks(&doc(), &tr);
        let counts: Vec<String> = rendered
            .body
            .find_by_class("task-count")
            .into_iter()
            .map(|e| Node::from(e.clone()).text_content())
            .collect();
        assert_eq!(counts, vec!["3 tasks", "0 tasks"]);
    }
}
