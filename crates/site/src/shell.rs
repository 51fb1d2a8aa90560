use trip_core::markup::{el, Node};
use trip_core::Translations;

pub const STYLESHEET: &str = "style.css";

/// Wrap a rendered page in a complete HTML document.
pub fn document(tr: &Translations, page_title: &str, header: Node, body: Node) -> String {
    let title = format!("{} | {}", page_title, tr.t("title"));
    let html = el("html")
        .attr("lang", tr.locale().as_str())
        .child(
            el("head")
                .child(el("meta").attr("charset", "utf-8"))
                .child(
                    el("meta")
                        .attr("name", "viewport")
                        .attr("content", "width=device-width, initial-scale=1"),
                )
                .child(el("title").text(title))
                .child(el("link").attr("rel", "stylesheet").attr("href", STYLESHEET)),
        )
        .child(
            el("body")
                .child(el("div").class("site-header").child(header))
                .child(el("main").class("page-content").child(body)),
        );
    format!("<!DOCTYPE html>\n{}\n", Node::from(html).to_html())
}
