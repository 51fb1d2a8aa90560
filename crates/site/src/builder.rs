use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use trip_core::model::{paths, DayDetail, StayDocument, TripInfo};
use trip_core::render::itinerary::{comment_files, decode_stages};
use trip_core::render::navigation::{day_page_file, is_valid_day_id};
use trip_core::render::{
    day_links, error_block, render_accommodation, render_day_detail, render_flights,
    render_header, render_itinerary, render_tasks, render_todo, CommentFragment, DayLink,
    DayNavigation, ItineraryContext, NotesState,
};
use trip_core::{AppConfig, PageKind, Rendered, Translations, TripWindow};
use trip_notes::{NotesClient, NotesLoader};

use crate::shell;
use crate::source::{load_document, load_list, source_for, DocumentSource, FetchError};

/// One finished HTML document.
#[derive(Debug, Clone)]
pub struct Page {
    pub kind: PageKind,
    pub file: String,
    pub html: String,
    pub warnings: Vec<String>,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub file: String,
    pub warnings: usize,
    pub failed: bool,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub out_dir: PathBuf,
    pub pages: Vec<PageSummary>,
}

impl BuildReport {
    pub fn failed(&self) -> impl Iterator<Item = &PageSummary> {
        self.pages.iter().filter(|page| page.failed)
    }

    pub fn warnings(&self) -> usize {
        self.pages.iter().map(|page| page.warnings).sum()
    }
}

/// Loaded once per build and shared by every page.
struct PageContext {
    tr: Translations,
    info: Option<TripInfo>,
}

pub struct SiteBuilder {
    config: AppConfig,
    source: Arc<dyn DocumentSource>,
    notes: Option<NotesClient>,
}

impl SiteBuilder {
    pub fn new(config: AppConfig) -> Self {
        let source = source_for(config.data());
        Self::with_source(config, source)
    }

    pub fn with_source(config: AppConfig, source: Arc<dyn DocumentSource>) -> Self {
        let notes = config.notes_endpoint().map(NotesClient::new);
        Self {
            config,
            source,
            notes,
        }
    }

    pub fn with_notes_client(mut self, client: NotesClient) -> Self {
        self.notes = Some(client);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Translations for the configured locale: `language.json` over the
    /// built-in strings.
    pub async fn translations(&self) -> Translations {
        let locale = self.config.locale();
        match self.source.fetch_text(paths::LANGUAGE).await {
            Ok(json) => Translations::from_language_json(locale, &json).unwrap_or_else(|err| {
                warn!(error = %err, "ignoring malformed {}", paths::LANGUAGE);
                Translations::builtin(locale)
            }),
            Err(FetchError::NotFound { .. }) => {
                debug!("no {}, using built-in strings", paths::LANGUAGE);
                Translations::builtin(locale)
            }
            Err(err) => {
                warn!(error = %err, "failed to load {}", paths::LANGUAGE);
                Translations::builtin(locale)
            }
        }
    }

    pub async fn trip_info(&self) -> Option<TripInfo> {
        match load_document::<TripInfo>(self.source.as_ref(), paths::TRIP_INFO).await {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(error = %err, "trip info unavailable");
                None
            }
        }
    }

    async fn context(&self) -> PageContext {
        PageContext {
            tr: self.translations().await,
            info: self.trip_info().await,
        }
    }

    fn spawn_notes(&self) -> Option<NotesLoader> {
        self.notes.clone().map(NotesLoader::spawn)
    }

    /// Render every page into the output directory. Pages whose documents
    /// fail to load are still written with an error block in place of their
    /// body.
    pub async fn build(&self) -> Result<BuildReport> {
        let out_dir = self.config.out_dir().to_path_buf();
        tokio::fs::create_dir_all(&out_dir)
            .await
            .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

        let notes = self.spawn_notes();
        let ctx = self.context().await;
        info!(
            data = %self.config.data(),
            out = %out_dir.display(),
            locale = ctx.tr.locale().as_str(),
            "building site"
        );

        let mut pages = Vec::new();
        for kind in [PageKind::Flight, PageKind::Accommodation, PageKind::Task, PageKind::Todo] {
            let rendered = self.render_listing(&ctx, kind).await;
            pages.push(self.finish(&ctx, kind, None, rendered));
        }

        let (rendered, links) = self.render_itinerary_page(&ctx, notes).await;
        pages.push(self.finish(&ctx, PageKind::Itinerary, None, rendered));

        let mut seen = HashSet::new();
        for link in &links {
            if !seen.insert(link.id.as_str()) {
                continue;
            }
            let (rendered, title) = self.render_day_page(&ctx, Some(&link.id), &links).await;
            let mut page = self.finish(&ctx, PageKind::Day, title.as_deref(), rendered);
            page.file = day_page_file(&link.id);
            pages.push(page);
        }

        let mut summaries = Vec::with_capacity(pages.len());
        for page in pages {
            let path = out_dir.join(&page.file);
            tokio::fs::write(&path, &page.html)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!(file = %page.file, bytes = page.html.len(), "wrote page");
            summaries.push(PageSummary {
                file: page.file,
                warnings: page.warnings.len(),
                failed: page.failed,
            });
        }

        Ok(BuildReport {
            out_dir,
            pages: summaries,
        })
    }

    /// Render a single page without writing it. `day` names the day detail
    /// for [`PageKind::Day`] and is ignored otherwise.
    pub async fn render_page(&self, kind: PageKind, day: Option<&str>) -> Page {
        let ctx = self.context().await;
        match kind {
            PageKind::Itinerary => {
                let notes = self.spawn_notes();
                let (rendered, _) = self.render_itinerary_page(&ctx, notes).await;
                self.finish(&ctx, kind, None, rendered)
            }
            PageKind::Day => {
                let links = match load_list(self.source.as_ref(), paths::ITINERARY).await {
                    Ok(doc) => day_links(&decode_stages(&doc).items),
                    Err(err) => {
                        debug!(error = %err, "day navigation unavailable");
                        Vec::new()
                    }
                };
                let (rendered, title) = self.render_day_page(&ctx, day, &links).await;
                let mut page = self.finish(&ctx, kind, title.as_deref(), rendered);
                if let Some(id) = day.filter(|id| is_valid_day_id(id)) {
                    page.file = day_page_file(id);
                }
                page
            }
            _ => {
                let rendered = self.render_listing(&ctx, kind).await;
                self.finish(&ctx, kind, None, rendered)
            }
        }
    }

    /// Pages that depend on nothing but their own document.
    async fn render_listing(&self, ctx: &PageContext, kind: PageKind) -> Rendered {
        let source = self.source.as_ref();
        let tr = &ctx.tr;
        let result = match kind {
            PageKind::Flight => load_list(source, paths::FLIGHTS)
                .await
                .map(|doc| render_flights(&doc, tr)),
            PageKind::Accommodation => load_document::<StayDocument>(source, paths::SLEEP)
                .await
                .map(|doc| render_accommodation(&doc, self.trip_window(ctx), tr)),
            PageKind::Task => load_list(source, paths::TASKS)
                .await
                .map(|doc| render_tasks(&doc, tr)),
            PageKind::Todo => load_list(source, paths::TODO)
                .await
                .map(|doc| render_todo(&doc, tr)),
            PageKind::Itinerary | PageKind::Day => {
                return Rendered::failed(tr, kind, "not a standalone document");
            }
        };
        result.unwrap_or_else(|err| Rendered::failed(tr, kind, err))
    }

    fn trip_window(&self, ctx: &PageContext) -> Option<TripWindow> {
        let info = ctx.info.as_ref()?;
        match TripWindow::parse(&info.start_date, &info.end_date) {
            Ok(window) => Some(window),
            Err(err) => {
                warn!(error = %err, "trip dates unusable for the stay timeline");
                None
            }
        }
    }

    /// The itinerary page plus the day pages it links to. Comment fragments
    /// are fetched first; the notes wait happens last so it overlaps with
    /// every other fetch.
    async fn render_itinerary_page(
        &self,
        ctx: &PageContext,
        notes: Option<NotesLoader>,
    ) -> (Rendered, Vec<DayLink>) {
        let doc = match load_list(self.source.as_ref(), paths::ITINERARY).await {
            Ok(doc) => doc,
            Err(err) => {
                if let Some(loader) = notes {
                    loader.cancel_token().cancel();
                    loader.wait().await;
                }
                return (Rendered::failed(&ctx.tr, PageKind::Itinerary, err), Vec::new());
            }
        };

        let stages = decode_stages(&doc).items;
        let links = day_links(&stages);

        let mut comments = HashMap::new();
        for path in comment_files(&stages) {
            let fragment = match self.source.fetch_text(&path).await {
                Ok(html) => CommentFragment::Loaded(html),
                Err(err) => {
                    warn!(%path, error = %err, "comment file unavailable");
                    CommentFragment::Failed
                }
            };
            comments.insert(path, fragment);
        }

        let state = match notes {
            Some(loader) => loader.wait().await.into_state(),
            None => NotesState::Disabled,
        };
        let roster = ctx.info.as_ref().map(TripInfo::roster).unwrap_or_default();
        let itinerary_ctx = ItineraryContext {
            notes: &state,
            roster: &roster,
            notes_endpoint: self.notes.as_ref().map(NotesClient::endpoint),
            comments: &comments,
        };
        (render_itinerary(&doc, &itinerary_ctx, &ctx.tr), links)
    }

    /// Returns the page and the detail's own title when it loaded.
    async fn render_day_page(
        &self,
        ctx: &PageContext,
        day: Option<&str>,
        links: &[DayLink],
    ) -> (Rendered, Option<String>) {
        let tr = &ctx.tr;
        let id = match day.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                let body = error_block(tr.t("missingDayId"));
                return (
                    Rendered::new(body).with_warnings(["day page: no day id".to_string()]),
                    None,
                );
            }
        };
        if !is_valid_day_id(id) {
            return (
                Rendered::failed(tr, PageKind::Day, format!("invalid day id '{}'", id)),
                None,
            );
        }

        match load_document::<DayDetail>(self.source.as_ref(), &paths::day_detail(id)).await {
            Ok(detail) => {
                let nav = DayNavigation::locate(links, id);
                let title = detail.meta.title.clone();
                (render_day_detail(&detail, nav.as_ref(), tr), Some(title))
            }
            Err(err) => (Rendered::failed(tr, PageKind::Day, err), None),
        }
    }

    fn finish(
        &self,
        ctx: &PageContext,
        kind: PageKind,
        title: Option<&str>,
        rendered: Rendered,
    ) -> Page {
        let file = kind.file_name().unwrap_or("day.html").to_string();
        for warning in &rendered.warnings {
            warn!(page = %file, "{}", warning);
        }
        let failed = rendered.is_error();
        let header = render_header(ctx.info.as_ref(), &ctx.tr, kind);
        let title = title.unwrap_or_else(|| ctx.tr.t(kind.title_key()));
        Page {
            kind,
            html: shell::document(&ctx.tr, title, header, rendered.body),
            file,
            warnings: rendered.warnings,
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;
    use trip_core::Locale;
    use trip_notes::{NotesError, NotesTransport};

    const TRIP_INFO: &str = r#"{
        "startDate": "2025-03-01",
        "endDate": "2025-03-10",
        "participants": ["zhi", "jane"],
        "noteAuthors": [{"id": "zhi", "name": "Zhi"}, {"id": "jane", "name": "Jane"}]
    }"#;

    const ITINERARY: &str = r#"[
        {
            "stage_id": 1,
            "location": "Abel Tasman",
            "dates": "3/1 - 3/3",
            "itinerary": [
                {"date": "3/1", "activities": ["Drive north 注意:fuel up"], "comments": "day_template.html?day=day1"},
                {"date": "3/2", "activities": ["Kayak"], "comments": "comments/kayak.html"},
                {"date": "3/3", "activities": ["Walk"], "comments": "day_template.html?day=day3"}
            ]
        }
    ]"#;

    const DAY1: &str = r#"{
        "meta": {"title": "Day 1", "subtitle": "Nelson"},
        "sections": [],
        "footer": null
    }"#;

    fn write(root: &Path, path: &str, body: &str) {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(full, body).expect("write fixture");
    }

    fn seeded_dir() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path();
        write(root, paths::TRIP_INFO, TRIP_INFO);
        write(root, paths::ITINERARY, ITINERARY);
        write(root, paths::FLIGHTS, r#"[{"outbound": [], "inbound": []}]"#);
        write(root, paths::TASKS, r#"[{"name": "Zhi", "tasks": ["Book ferry 3/15 $120"]}]"#);
        write(root, paths::TODO, r#"[{"name": "所有人", "activities": ["買票"]}]"#);
        write(root, &paths::day_detail("day1"), DAY1);
        write(root, "comments/kayak.html", "<p>Bring <b>sunscreen</b></p>");
        dir
    }

    fn config(data: &TempDir, out: &TempDir) -> AppConfig {
        AppConfig::from_data_dir(data.path().to_path_buf())
            .expect("config")
            .with_out_dir(out.path().join("site"))
            .with_locale(Locale::En)
    }

    fn read(out: &TempDir, file: &str) -> String {
        std::fs::read_to_string(out.path().join("site").join(file)).expect("read page")
    }

    struct StaticNotes(&'static str);

    #[async_trait]
    impl NotesTransport for StaticNotes {
        async fn get(&self, _url: &str) -> Result<String, NotesError> {
            Ok(self.0.to_string())
        }

        async fn post_form(&self, _url: &str, _form: &[(&str, String)]) -> Result<String, NotesError> {
            Ok(r#"{"success": true}"#.to_string())
        }
    }

    #[tokio::test]
    async fn build_writes_every_page_and_reports_missing_documents() {
        let data = seeded_dir();
        let out = TempDir::new().expect("out dir");
        let report = SiteBuilder::new(config(&data, &out))
            .build()
            .await
            .expect("build");

        let files: Vec<&str> = report.pages.iter().map(|p| p.file.as_str()).collect();
        assert_eq!(
            files,
            vec![
                "flight.html",
                "accommodation.html",
                "task.html",
                "todo.html",
                "itinerary.html",
                "day-day1.html",
                "day-day3.html",
            ]
        );

        // data_sleep.json and day3 are missing from the fixture.
        let failed: Vec<&str> = report.failed().map(|p| p.file.as_str()).collect();
        assert_eq!(failed, vec!["accommodation.html", "day-day3.html"]);

        let accommodation = read(&out, "accommodation.html");
        assert!(accommodation.contains("class=\"error-message\""));
        assert!(accommodation.contains("Failed to load accommodation data"));
        assert!(accommodation.contains("<html lang=\"en\">"));
    }

    #[tokio::test]
    async fn itinerary_embeds_comments_and_links_day_pages() {
        let data = seeded_dir();
        let out = TempDir::new().expect("out dir");
        SiteBuilder::new(config(&data, &out))
            .build()
            .await
            .expect("build");

        let itinerary = read(&out, "itinerary.html");
        assert!(itinerary.contains("href=\"day-day1.html\""));
        assert!(itinerary.contains("<p>Bring <b>sunscreen</b></p>"));
        assert!(!itinerary.contains("stage-notes"));

        let day = read(&out, "day-day1.html");
        assert!(day.contains("<title>Day 1 | Trip Planner</title>"));
        assert!(day.contains("href=\"day-day3.html\""));
    }

    #[tokio::test]
    async fn notes_from_the_endpoint_reach_the_itinerary() {
        let data = seeded_dir();
        let out = TempDir::new().expect("out dir");
        let client = NotesClient::with_transport(
            "https://script.example/exec",
            Arc::new(StaticNotes(r#"[{"stage": 1, "person": "jane", "activity": "Sounds good"}]"#)),
        );
        let page = SiteBuilder::new(config(&data, &out))
            .with_notes_client(client)
            .render_page(PageKind::Itinerary, None)
            .await;

        assert!(!page.failed);
        assert!(page.html.contains("Sounds good"));
        assert!(page.html.contains("action=\"https://script.example/exec?path=update\""));
    }

    #[tokio::test]
    async fn comment_paths_outside_the_data_root_are_never_read() {
        let data = seeded_dir();
        let elsewhere = TempDir::new().expect("other dir");
        let secret = elsewhere.path().join("secret.txt");
        std::fs::write(&secret, "TOP-SECRET-CONTENT").expect("write secret");
        let itinerary = serde_json::json!([{
            "stage_id": 1,
            "location": "Abel Tasman",
            "dates": "3/1",
            "itinerary": [
                {"date": "3/1", "activities": [], "comments": secret.display().to_string()},
                {"date": "3/2", "activities": [], "comments": "../secret.txt"}
            ]
        }]);
        write(data.path(), paths::ITINERARY, &itinerary.to_string());

        let out = TempDir::new().expect("out dir");
        let page = SiteBuilder::new(config(&data, &out))
            .render_page(PageKind::Itinerary, None)
            .await;

        assert!(!page.failed);
        assert!(!page.html.contains("TOP-SECRET-CONTENT"));
        assert_eq!(page.warnings.len(), 2);
    }

    #[tokio::test]
    async fn single_day_page_without_id_shows_message() {
        let data = seeded_dir();
        let out = TempDir::new().expect("out dir");
        let builder = SiteBuilder::new(config(&data, &out));

        let page = builder.render_page(PageKind::Day, None).await;
        assert!(page.failed);
        assert!(page.html.contains("No day id given"));

        let page = builder.render_page(PageKind::Day, Some("../secret")).await;
        assert!(page.failed);
        assert_eq!(page.file, "day.html");

        let page = builder.render_page(PageKind::Day, Some("day1")).await;
        assert!(!page.failed);
        assert_eq!(page.file, "day-day1.html");
    }

    #[tokio::test]
    async fn language_file_overrides_builtin_strings() {
        let data = seeded_dir();
        write(
            data.path(),
            paths::LANGUAGE,
            r#"{"en": {"title": "Kiwi Trip"}, "zh-TW": {"title": "紐西蘭"}}"#,
        );
        let out = TempDir::new().expect("out dir");
        let page = SiteBuilder::new(config(&data, &out))
            .render_page(PageKind::Todo, None)
            .await;
        assert!(page.html.contains("| Kiwi Trip</title>"));
    }
}
