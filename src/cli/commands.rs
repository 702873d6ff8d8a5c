//! Command dispatch: every subcommand assembles its input, then renders it.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{assemble, read_events, TreeDisplay, TreeStats};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{HtmlTagKind, Tag};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "effective settings");

    match &cli.command {
        Some(Commands::Render { events, indent }) => {
            _render(&settings, events, indent.unwrap_or(settings.render.indent))
        }
        Some(Commands::Tree { events }) => _tree(&settings, events),
        Some(Commands::Leaves { events }) => _leaves(&settings, events),
        Some(Commands::Stats { events }) => _stats(&settings, events),
        Some(Commands::Config { command }) => _config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

fn load_tree(settings: &Settings, events: &Path) -> CliResult<Tag<HtmlTagKind>> {
    let events = read_events(events)?;
    Ok(assemble(events, &settings.assembler)?)
}

#[instrument(skip(settings))]
fn _render(settings: &Settings, events: &Path, indent: usize) -> CliResult<()> {
    let root = load_tree(settings, events)?;
    output::info(&root.render(indent));
    Ok(())
}

#[instrument(skip(settings))]
fn _tree(settings: &Settings, events: &Path) -> CliResult<()> {
    let root = load_tree(settings, events)?;
    output::info(&root.to_tree_string());
    Ok(())
}

#[instrument(skip(settings))]
fn _leaves(settings: &Settings, events: &Path) -> CliResult<()> {
    let root = load_tree(settings, events)?;
    for leaf in root.leaves() {
        output::tag_line(&leaf.label(), leaf.text().unwrap_or_default());
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _stats(settings: &Settings, events: &Path) -> CliResult<()> {
    let root = load_tree(settings, events)?;
    let stats = TreeStats::collect(&root);
    output::header(&format!("{} ({})", events.display(), root.label()));
    output::info(&stats);
    if stats.unknown > 0 {
        output::warning(&format!(
            "{} element(s) fell back to the default kind",
            stats.unknown
        ));
    }
    Ok(())
}

fn _config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no home directory, global config disabled"),
        },
    }
    Ok(())
}
