use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use scoop_core::loader::is_remote;
use scoop_core::{
    DEFAULT_SOURCE_URL, FileLoader, HttpLoader, Listener, LoadOutcome, LoaderConfig,
    PayloadFormat, RemoteLoader, SelectionController, render,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod config_file;
mod output;
mod presenter;

use config_file::ConfigFile;
use output::ColorMode;
use presenter::TerminalPresenter;

/// Scoop - pick an ice-cream flavor from a remote list
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// URL or file path of the flavor list
    #[arg(long, global = true)]
    source: Option<String>,

    /// Payload format of the flavor list
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the flavor list and print it
    List {
        /// Print the flavors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the flavor list and show one flavor
    Show {
        /// Zero-based position in the list
        index: usize,
    },

    /// Interactive picker reading commands from stdin
    Pick,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Auto,
    Json,
    Plist,
}

impl From<FormatArg> for PayloadFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Auto => PayloadFormat::Auto,
            FormatArg::Json => PayloadFormat::Json,
            FormatArg::Plist => PayloadFormat::Plist,
        }
    }
}

/// Effective settings after flags > env > config file > defaults.
#[derive(Debug, Clone)]
struct Settings {
    source: String,
    loader: LoaderConfig,
}

fn resolve_settings(cli: &Cli, file: &ConfigFile, env_source: Option<String>) -> Settings {
    let defaults = LoaderConfig::default();
    let source = cli
        .source
        .clone()
        .or(env_source)
        .or_else(|| file.source_url().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());

    let loader = LoaderConfig {
        timeout: cli
            .timeout
            .or(file.timeout_secs())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
        user_agent: file
            .user_agent()
            .map(str::to_string)
            .unwrap_or(defaults.user_agent),
        format: cli
            .format
            .map(PayloadFormat::from)
            .or(file.format())
            .unwrap_or(defaults.format),
    };

    Settings { source, loader }
}

fn build_loader(settings: &Settings) -> Arc<dyn RemoteLoader> {
    if is_remote(&settings.source) {
        Arc::new(HttpLoader::new(settings.loader.clone()))
    } else {
        Arc::new(FileLoader::new(&settings.loader))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let file = config_file::load_config();
    let settings = resolve_settings(&cli, &file, std::env::var("SCOOP_SOURCE").ok());
    let color = ColorMode(!cli.no_color);
    tracing::debug!(?settings, "resolved settings");

    match cli.command {
        Command::List { json } => list(&settings, color, json).await,
        Command::Show { index } => show(&settings, color, index).await,
        Command::Pick => pick(&settings, color).await,
    }
}

/// Run the first load, turning a failure into an error exit.
async fn start_or_bail<L: Listener>(
    controller: &mut SelectionController<L>,
    loader: &dyn RemoteLoader,
    source: &str,
) -> anyhow::Result<()> {
    match controller.start(loader, source).await {
        Some(LoadOutcome::Failed(e)) => {
            Err(e).with_context(|| format!("failed to load flavors from {source}"))
        }
        Some(LoadOutcome::Applied { dropped, .. }) if dropped > 0 => {
            tracing::info!(dropped, "some flavor records were invalid and skipped");
            Ok(())
        }
        _ => Ok(()),
    }
}

async fn list(settings: &Settings, color: ColorMode, json: bool) -> anyhow::Result<()> {
    let loader = build_loader(settings);
    let mut controller = SelectionController::new(TerminalPresenter::new(color, false));
    start_or_bail(&mut controller, loader.as_ref(), &settings.source).await?;

    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, controller.items())?;
        writeln!(out)?;
    } else {
        output::print_list(&mut out, controller.items(), controller.selection(), color)?;
    }
    Ok(())
}

async fn show(settings: &Settings, color: ColorMode, index: usize) -> anyhow::Result<()> {
    let loader = build_loader(settings);
    let mut controller = SelectionController::new(TerminalPresenter::new(color, false));
    start_or_bail(&mut controller, loader.as_ref(), &settings.source).await?;

    let view = render(controller.select(index)?);
    output::print_detail(&mut std::io::stdout().lock(), index, &view, color)?;
    Ok(())
}

/// A line of input to the interactive picker.
#[derive(Debug, PartialEq, Eq)]
enum PickCommand {
    Select(usize),
    List,
    Reload,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_pick_command(line: &str) -> PickCommand {
    let line = line.trim();
    if line.is_empty() {
        return PickCommand::Empty;
    }
    if let Ok(index) = line.parse::<usize>() {
        return PickCommand::Select(index);
    }
    match line.to_ascii_lowercase().as_str() {
        "l" | "list" => PickCommand::List,
        "r" | "reload" => PickCommand::Reload,
        "h" | "help" | "?" => PickCommand::Help,
        "q" | "quit" | "exit" => PickCommand::Quit,
        _ => PickCommand::Unknown(line.to_string()),
    }
}

async fn pick(settings: &Settings, color: ColorMode) -> anyhow::Result<()> {
    let loader = build_loader(settings);
    let mut controller = SelectionController::new(TerminalPresenter::new(color, true));
    let (tx, mut rx) = mpsc::unbounded_channel();

    output::print_pick_help(&mut std::io::stdout().lock())?;
    controller.spawn_load(loader.clone(), settings.source.clone(), tx.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(completion) = rx.recv() => {
                controller.finish_load(completion.ticket, completion.result);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_pick_command(&line) {
                    PickCommand::Select(index) => {
                        if let Err(e) = controller.select(index) {
                            eprintln!("{e}");
                        }
                    }
                    PickCommand::List => output::print_list(
                        &mut std::io::stdout().lock(),
                        controller.items(),
                        controller.selection(),
                        color,
                    )?,
                    PickCommand::Reload => {
                        controller.spawn_load(loader.clone(), settings.source.clone(), tx.clone());
                    }
                    PickCommand::Help => output::print_pick_help(&mut std::io::stdout().lock())?,
                    PickCommand::Quit => break,
                    PickCommand::Empty => {}
                    PickCommand::Unknown(cmd) => eprintln!("Unknown command: {cmd}"),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::{HttpConfig, SourceConfig};

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("scoop").chain(args.iter().copied())).unwrap()
    }

    fn file_config() -> ConfigFile {
        ConfigFile {
            source: Some(SourceConfig {
                url: Some("./from-file.plist".into()),
                format: Some(PayloadFormat::Plist),
            }),
            http: Some(HttpConfig {
                timeout_secs: Some(3),
                user_agent: Some("picker/2".into()),
            }),
        }
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = resolve_settings(&cli(&["list"]), &ConfigFile::default(), None);
        assert_eq!(s.source, DEFAULT_SOURCE_URL);
        assert_eq!(s.loader.timeout, Duration::from_secs(10));
        assert_eq!(s.loader.format, PayloadFormat::Auto);
    }

    #[test]
    fn config_file_applies_below_env() {
        let s = resolve_settings(&cli(&["list"]), &file_config(), None);
        assert_eq!(s.source, "./from-file.plist");
        assert_eq!(s.loader.timeout, Duration::from_secs(3));
        assert_eq!(s.loader.user_agent, "picker/2");

        let s = resolve_settings(&cli(&["list"]), &file_config(), Some("./env.json".into()));
        assert_eq!(s.source, "./env.json");
    }

    #[test]
    fn flags_win_over_everything() {
        let s = resolve_settings(
            &cli(&["show", "1", "--source", "./flag.json", "--timeout", "7", "--format", "json"]),
            &file_config(),
            Some("./env.json".into()),
        );
        assert_eq!(s.source, "./flag.json");
        assert_eq!(s.loader.timeout, Duration::from_secs(7));
        assert_eq!(s.loader.format, PayloadFormat::Json);
    }

    #[test]
    fn parses_pick_commands() {
        assert_eq!(parse_pick_command(" 3 "), PickCommand::Select(3));
        assert_eq!(parse_pick_command("r"), PickCommand::Reload);
        assert_eq!(parse_pick_command("LIST"), PickCommand::List);
        assert_eq!(parse_pick_command("q"), PickCommand::Quit);
        assert_eq!(parse_pick_command(""), PickCommand::Empty);
        assert_eq!(
            parse_pick_command("-1"),
            PickCommand::Unknown("-1".into())
        );
    }
}
