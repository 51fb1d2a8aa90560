use std::fmt;
use std::io::Write;

use anyhow::{anyhow, Context, Result};
use trip_core::model::{display_name, NoteAuthor, NotesBook, StageId, TripInfo};
use trip_notes::{NoteUpdate, NotesClient};

use crate::builder::{BuildReport, SiteBuilder};
use crate::cli::{Cli, CliCommand, NotesCommand, PageArgs, SaveArgs};
use crate::config::{self, AppConfig};
use crate::logging::init_tracing;

/// Entry point for the binary once arguments are parsed: tracing, config,
/// runtime, then [`execute`] against stdout.
pub fn run_blocking(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref())?;
    let config = config::from_cli(&cli)?;
    let command = cli.command.unwrap_or_default();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let stdout = std::io::stdout();
    let handle = stdout.lock();
    runtime.block_on(execute(&config, command, handle))
}

pub async fn execute<W: Write>(
    config: &AppConfig,
    command: CliCommand,
    mut writer: W,
) -> Result<()> {
    let builder = SiteBuilder::new(config.clone());
    match command {
        CliCommand::Build(_) => handle_build(&builder, &mut writer).await,
        CliCommand::Page(args) => handle_page(&builder, &args, &mut writer).await,
        CliCommand::Notes(NotesCommand::List) => handle_notes_list(&builder, &mut writer).await,
        CliCommand::Notes(NotesCommand::Save(args)) => {
            handle_notes_save(&builder, &args, &mut writer).await
        }
    }
}

async fn handle_build<W: Write>(builder: &SiteBuilder, mut writer: W) -> Result<()> {
    let report = builder.build().await?;
    BuildSummary::from_report(&report).write_to(&mut writer)
}

async fn handle_page<W: Write>(
    builder: &SiteBuilder,
    args: &PageArgs,
    mut writer: W,
) -> Result<()> {
    let page = builder.render_page(args.kind, args.day.as_deref()).await;
    writer.write_all(page.html.as_bytes())?;
    Ok(())
}

fn notes_client(builder: &SiteBuilder) -> Result<NotesClient> {
    builder
        .config()
        .notes_endpoint()
        .map(NotesClient::new)
        .ok_or_else(|| {
            anyhow!("no notes endpoint configured (pass --notes-url or set TRIP_NOTES_URL)")
        })
}

async fn roster(builder: &SiteBuilder) -> Vec<NoteAuthor> {
    builder
        .trip_info()
        .await
        .as_ref()
        .map(TripInfo::roster)
        .unwrap_or_default()
}

async fn handle_notes_list<W: Write>(builder: &SiteBuilder, mut writer: W) -> Result<()> {
    let client = notes_client(builder)?;
    let book = client.fetch_book().await.context("failed to load notes")?;
    let roster = roster(builder).await;
    if book.is_empty() {
        let tr = builder.translations().await;
        writeln!(writer, "{}", tr.t("noNotes"))?;
        return Ok(());
    }
    for (stage, _) in book.stages() {
        write_stage(&mut writer, &book, stage, &roster)?;
    }
    Ok(())
}

async fn handle_notes_save<W: Write>(
    builder: &SiteBuilder,
    args: &SaveArgs,
    mut writer: W,
) -> Result<()> {
    let client = notes_client(builder)?;
    let tr = builder.translations().await;
    let update = NoteUpdate {
        stage: StageId(args.stage),
        person: args.person.clone(),
        activity: args.text.clone(),
    };
    let book = match client.save_and_refresh(&update).await {
        Ok(book) => book,
        Err(err) => {
            writeln!(writer, "{}", tr.t("saveNotesError"))?;
            return Err(anyhow::Error::new(err)
                .context(format!("failed to save note for stage {}", args.stage)));
        }
    };
    writeln!(writer, "{}", tr.t("saveNotesOk"))?;
    let roster = roster(builder).await;
    write_stage(&mut writer, &book, update.stage, &roster)
}

fn write_stage<W: Write>(
    mut writer: W,
    book: &NotesBook,
    stage: StageId,
    roster: &[NoteAuthor],
) -> Result<()> {
    writeln!(writer, "#{}", stage)?;
    for (person, notes) in book.grouped(stage, roster) {
        let name = display_name(roster, &person);
        for note in notes {
            writeln!(writer, "  {}: {}", name, note.replace('\n', " / "))?;
        }
    }
    Ok(())
}

struct BuildSummary<'a> {
    report: &'a BuildReport,
}

impl<'a> BuildSummary<'a> {
    fn from_report(report: &'a BuildReport) -> Self {
        Self { report }
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", self)?;
        let failed: Vec<&str> = self.report.failed().map(|page| page.file.as_str()).collect();
        if !failed.is_empty() {
            writeln!(writer, "Rendered with errors: {}", failed.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for BuildSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.report.pages.len();
        write!(
            f,
            "Wrote {} page{} to {}",
            count,
            if count == 1 { "" } else { "s" },
            self.report.out_dir.display()
        )?;
        match self.report.warnings() {
            0 => Ok(()),
            1 => write!(f, " (1 warning)"),
            n => write!(f, " ({} warnings)", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PageSummary;
    use crate::cli::BuildArgs;
    use crate::config::DataLocation;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use trip_core::Locale;

    fn temp_config() -> (AppConfig, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).expect("create data dir");
        let config = AppConfig::from_data_dir(data_dir)
            .expect("config")
            .with_out_dir(dir.path().join("site"))
            .with_locale(Locale::En);
        (config, dir)
    }

    #[test]
    fn summary_counts_pages_and_warnings() {
        let report = BuildReport {
            out_dir: PathBuf::from("site"),
            pages: vec![
                PageSummary {
                    file: "flight.html".into(),
                    warnings: 0,
                    failed: false,
                },
                PageSummary {
                    file: "task.html".into(),
                    warnings: 2,
                    failed: true,
                },
            ],
        };
        let mut output = Vec::new();
        BuildSummary::from_report(&report)
            .write_to(&mut output)
            .expect("write");
        let output = String::from_utf8(output).expect("utf8");
        assert_eq!(
            output,
            "Wrote 2 pages to site (2 warnings)\nRendered with errors: task.html\n"
        );
    }

    #[tokio::test]
    async fn build_over_empty_data_dir_still_writes_pages() {
        let (config, dir) = temp_config();
        let mut output = Vec::new();
        execute(&config, CliCommand::Build(BuildArgs::default()), &mut output)
            .await
            .expect("execute build");
        let output = String::from_utf8(output).expect("utf8");

        assert!(output.starts_with("Wrote 5 pages to"));
        assert!(output.contains("Rendered with errors: flight.html, accommodation.html"));
        assert!(dir.path().join("site/itinerary.html").exists());
    }

    #[tokio::test]
    async fn page_command_prints_document() {
        let (config, _dir) = temp_config();
        let data = match config.data() {
            DataLocation::Dir(path) => path.clone(),
            other => panic!("unexpected data location {}", other),
        };
        std::fs::write(
            data.join("data_todo.json"),
            r#"[{"name": "所有人", "activities": ["Buy tickets"]}]"#,
        )
        .expect("write todo");

        let args = PageArgs {
            kind: trip_core::PageKind::Todo,
            day: None,
        };
        let mut output = Vec::new();
        execute(&config, CliCommand::Page(args), &mut output)
            .await
            .expect("execute page");
        let output = String::from_utf8(output).expect("utf8");

        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("Buy tickets"));
    }

    #[tokio::test]
    async fn notes_commands_need_an_endpoint() {
        let (config, _dir) = temp_config();
        let mut output = Vec::new();
        let err = execute(&config, CliCommand::Notes(NotesCommand::List), &mut output)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no notes endpoint configured"));
    }

    #[test]
    fn stage_listing_uses_display_names() {
        let book = NotesBook::from_rows(vec![
            trip_core::model::NoteRow {
                stage: StageId(1),
                person: "zhi".into(),
                activity: "line one\nline two".into(),
            },
            trip_core::model::NoteRow {
                stage: StageId(1),
                person: "guest".into(),
                activity: "hi".into(),
            },
        ]);
        let roster = vec![NoteAuthor {
            id: "zhi".into(),
            name: "Zhi".into(),
        }];
        let mut output = Vec::new();
        write_stage(&mut output, &book, StageId(1), &roster).expect("write");
        assert_eq!(
            String::from_utf8(output).expect("utf8"),
            "#1\n  Zhi: line one / line two\n  guest: hi\n"
        );
    }
}
