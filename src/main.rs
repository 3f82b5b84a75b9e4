#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # gradebook
//!
//! Evaluates JSON marks trees against JSON grading rulebooks.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use gradebook::{
    GradeAggregator, MarksTree,
    grade::{Grade, audit_table},
};
use serde::de::DeserializeOwned;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Evaluate a marks tree against a rulebook
    Evaluate {
        /// Path to the marks tree
        marks:    PathBuf,
        /// Path to the rulebook
        rulebook: PathBuf,
        /// Print the evaluated grade as JSON instead of a table
        json:     bool,
    },
    /// Check that a marks tree fits a rulebook
    Check {
        /// Path to the marks tree
        marks:    PathBuf,
        /// Path to the rulebook
        rulebook: PathBuf,
    },
    /// List the paths leading to every mark
    Paths(PathBuf),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the marks tree path
    fn m() -> impl Parser<PathBuf> {
        positional("MARKS").help("Path to a JSON marks tree")
    }

    /// parses the rulebook path
    fn r() -> impl Parser<PathBuf> {
        positional("RULEBOOK").help("Path to a JSON rulebook")
    }

    let evaluate = {
        let json = long("json")
            .help("Print the evaluated grade as JSON")
            .switch();
        let marks = m();
        let rulebook = r();
        construct!(Cmd::Evaluate {
            json,
            marks,
            rulebook
        })
        .to_options()
        .command("evaluate")
        .help("Evaluate a marks tree against a rulebook")
    };

    let check = {
        let marks = m();
        let rulebook = r();
        construct!(Cmd::Check { marks, rulebook })
            .to_options()
            .command("check")
            .help("Check that a marks tree fits a rulebook")
    };

    let paths = construct!(Cmd::Paths(m()))
        .to_options()
        .command("paths")
        .help("List the paths leading to every mark");

    let cmd = construct!([evaluate, check, paths]);

    cmd.to_options()
        .descr("Rule-driven grade aggregation")
        .run()
}

/// Reads and parses a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Could not parse {}", path.display()))
}

/// Returns the log level requested through `GRADEBOOK_LOG`, INFO by default.
fn log_level() -> Level {
    std::env::var("GRADEBOOK_LOG")
        .ok()
        .and_then(|value| value.parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(log_level());
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match options() {
        Cmd::Evaluate {
            marks,
            rulebook,
            json,
        } => {
            let tree: MarksTree = read_json(&marks)?;
            let rules: GradeAggregator = read_json(&rulebook)?;
            let grade = Grade::given(&tree, &rules)
                .with_context(|| format!("Could not evaluate {}", marks.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&grade)?);
            } else {
                println!("{}", audit_table(&grade, &marks.display().to_string()));
            }
        }
        Cmd::Check { marks, rulebook } => {
            let tree: MarksTree = read_json(&marks)?;
            let rules: GradeAggregator = read_json(&rulebook)?;
            rules.check(&tree)?;
            println!("{} fits {}", marks.display(), rulebook.display());
        }
        Cmd::Paths(marks) => {
            let tree: MarksTree = read_json(&marks)?;
            for path in tree.paths_to_marks() {
                println!("{path}");
            }
        }
    };

    Ok(())
}
