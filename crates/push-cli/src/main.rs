//! push - build, archive and deploy a project from its git checkout
//!
//! Usage:
//!   push build                 # copy the tree into .push/release
//!   push archive               # build, test and pack the release
//!   push clone                 # deploy to the clone host
//!   push live web              # deploy to every host tagged "web"
//!   push cleanup HOST PATH     # remove a deployed path

mod prompt;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use push_core::prelude::*;
use push_core::ui;

use crate::prompt::PromptConfirmer;

#[derive(Parser)]
#[command(name = "push")]
#[command(about = "Build, archive and deploy a project", long_about = None)]
struct Cli {
    /// Tasks to run, in order (e.g. `clean archive live web`)
    #[arg(value_name = "TASK", required_unless_present = "list")]
    tasks: Vec<String>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long)]
    yes: bool,

    /// Deploy without checking that the revision is tagged
    #[arg(long)]
    no_tag: bool,

    /// Do not run the test task
    #[arg(long)]
    skip_tests: bool,

    /// Remove remote paths without asking
    #[arg(long)]
    force_clean_remote: bool,

    /// List available tasks and exit
    #[arg(short, long)]
    list: bool,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "push=debug,push_core=debug,info"
    } else {
        "push=info,push_core=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.list {
        print_tasks();
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::fatal(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // parse before touching the repository so typos fail fast
    let tasks = Task::parse_sequence(&cli.tasks)?;

    let current_dir = std::env::current_dir()?;
    let store = ConfigStore::new(current_dir.clone());
    let mut context = Context::discover(current_dir, &store)?;

    apply_flags(&cli, context.settings_mut());

    tracing::debug!(
        project = %context.repo().project_name,
        component = %context.repo().component,
        commit = %context.repo().commit,
        "discovered project"
    );

    let hooks = Hooks::from_config(context.config());
    let confirmer: Box<dyn Confirmer> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(PromptConfirmer::new())
    };

    let system = SystemRunner;
    let mut runner = TaskRunner::new(&context, &system, confirmer.as_ref()).with_hooks(hooks);
    runner.run_all(&tasks)
}

/// Flags given on the command line win over the config file and environment.
fn apply_flags(cli: &Cli, settings: &mut Settings) {
    settings.no_tag |= cli.no_tag;
    settings.skip_tests |= cli.skip_tests;
    settings.force_clean_remote |= cli.force_clean_remote;
}

fn print_tasks() {
    println!("{}", style("Available tasks:").bold());
    for kind in TaskKind::runnable() {
        println!("  {:<12} {}", style(kind.name()).cyan(), kind.description());
    }
}
