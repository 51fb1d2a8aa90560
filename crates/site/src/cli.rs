use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};
use trip_core::{Locale, PageKind};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "trip",
    version,
    about = "Render a shared trip plan into a static website.",
    after_help = "Examples:\n  trip                 Build the site into ./site (same as `trip build`)\n  trip build --out public --lang en\n  trip page accommodation --data-url https://example.com/trip/data\n  trip notes save --stage 2 --person zhi --text \"leave early\""
)]
pub struct Cli {
    /// Read documents from this directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Read documents from this base URL instead of a directory
    #[arg(long, value_name = "URL", global = true, conflicts_with = "data_dir")]
    pub data_url: Option<String>,

    /// Interface language (defaults to LC_ALL / LANG)
    #[arg(long = "lang", value_name = "LOCALE", value_enum, global = true)]
    pub locale: Option<Locale>,

    /// Notes endpoint (overrides TRIP_NOTES_URL)
    #[arg(long = "notes-url", value_name = "URL", global = true)]
    pub notes_url: Option<String>,

    /// Override the tracing filter (e.g. "info", "debug", or full directives)
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Render every page into the output directory (default command)
    Build(BuildArgs),
    /// Render one page to stdout
    Page(PageArgs),
    /// Read or write stage notes on the notes endpoint
    #[command(subcommand)]
    Notes(NotesCommand),
}

impl Default for CliCommand {
    fn default() -> Self {
        CliCommand::Build(BuildArgs::default())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Output directory (defaults to ./site)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    #[arg(value_name = "PAGE", value_enum)]
    pub kind: PageKind,

    /// Day detail id, required for the `day` page
    #[arg(long, value_name = "ID")]
    pub day: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NotesCommand {
    /// Print every note grouped by stage and person
    List,
    /// Replace one person's note for a stage, then print the stage
    Save(SaveArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Itinerary stage id
    #[arg(long, value_parser = value_parser!(u32))]
    pub stage: u32,

    /// Person id as listed in trip-info.json
    #[arg(long)]
    pub person: String,

    /// Note text
    #[arg(long)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("flight", PageKind::Flight)]
    #[case("itinerary", PageKind::Itinerary)]
    #[case("accommodation", PageKind::Accommodation)]
    #[case("task", PageKind::Task)]
    #[case("todo", PageKind::Todo)]
    #[case("day", PageKind::Day)]
    fn page_names_parse(#[case] name: &str, #[case] expected: PageKind) {
        let cli = Cli::try_parse_from(["trip", "page", name]).expect("parse");
        match cli.command {
            Some(CliCommand::Page(args)) => assert_eq!(args.kind, expected),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn unknown_page_is_rejected() {
        assert!(Cli::try_parse_from(["trip", "page", "hotels"]).is_err());
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from([
            "trip", "page", "accommodation", "--lang", "en", "--data-dir", "/tmp/data",
        ])
        .expect("parse");
        assert_eq!(cli.locale, Some(Locale::En));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/data")));
        match cli.command {
            Some(CliCommand::Page(args)) => assert_eq!(args.kind, PageKind::Accommodation),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn data_dir_and_url_conflict() {
        let result = Cli::try_parse_from([
            "trip",
            "--data-dir",
            "data",
            "--data-url",
            "https://example.com",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn notes_save_requires_stage_and_person() {
        assert!(Cli::try_parse_from(["trip", "notes", "save", "--text", "x"]).is_err());
        let cli = Cli::try_parse_from([
            "trip", "notes", "save", "--stage", "2", "--person", "zhi", "--text", "hi",
        ])
        .expect("parse");
        match cli.command {
            Some(CliCommand::Notes(NotesCommand::Save(args))) => {
                assert_eq!(args.stage, 2);
                assert_eq!(args.person, "zhi");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
