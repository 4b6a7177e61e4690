use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Project and task board backed by a local JSON store.
/// Storage defaults to ~/.taskboard/taskboard.json or a path passed via --db.
#[derive(Parser, Debug)]
#[command(name = "tb", version, about = "Project and task board CLI")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::cmd::{BulkKind, ProjectAction};
    use crate::fields::{Priority, SortKey, StatusCategory};

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bulk_with_filters() {
        let cli = Cli::try_parse_from([
            "tb", "--db", "/tmp/x.json", "bulk", "priority", "3", "4", "--priority", "high", "--category", "active",
            "--sort", "due-date", "--asc",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.json")));
        match cli.command {
            Commands::Bulk { action, ids, priority, view, yes, .. } => {
                assert_eq!(action, BulkKind::Priority);
                assert_eq!(ids, vec![3, 4]);
                assert_eq!(priority, Some(Priority::High));
                assert_eq!(view.category, Some(StatusCategory::Active));
                assert_eq!(view.sort, Some(SortKey::DueDate));
                assert!(view.asc && !yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_asc_and_desc_conflict() {
        assert!(Cli::try_parse_from(["tb", "list", "--asc", "--desc"]).is_err());
    }

    #[test]
    fn test_add_requires_project() {
        assert!(Cli::try_parse_from(["tb", "add", "Write docs"]).is_err());
        assert!(Cli::try_parse_from(["tb", "add", "Write docs", "--project", "1"]).is_ok());
    }

    #[test]
    fn test_parse_projects_subcommand() {
        let cli = Cli::try_parse_from(["tb", "projects", "add", "Website", "--status", "on-hold"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Projects { action: ProjectAction::Add { .. } }
        ));
    }
}
