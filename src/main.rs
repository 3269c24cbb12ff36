// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use storyparts::app_config::{self, Config, RemainderPolicy, WhisperModel};
use storyparts::app_controller::Controller;

/// CLI Wrapper for WhisperModel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliWhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl From<CliWhisperModel> for WhisperModel {
    fn from(cli_model: CliWhisperModel) -> Self {
        match cli_model {
            CliWhisperModel::Tiny => WhisperModel::Tiny,
            CliWhisperModel::Base => WhisperModel::Base,
            CliWhisperModel::Small => WhisperModel::Small,
            CliWhisperModel::Medium => WhisperModel::Medium,
            CliWhisperModel::Large => WhisperModel::Large,
        }
    }
}

/// CLI Wrapper for RemainderPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliRemainderPolicy {
    Flush,
    Discard,
}

impl From<CliRemainderPolicy> for RemainderPolicy {
    fn from(cli_policy: CliRemainderPolicy) -> Self {
        match cli_policy {
            CliRemainderPolicy::Flush => RemainderPolicy::Flush,
            CliRemainderPolicy::Discard => RemainderPolicy::Discard,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Produce videos from the next qualifying posts (default command)
    Run(RunArgs),

    /// Generate shell completions for storyparts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Subreddits to read, comma separated (e.g. relationships,TwoXChromosomes)
    #[arg(long = "sub-reddit", value_delimiter = ',')]
    sub_reddit: Vec<String>,

    /// Reddit application client id
    #[arg(long, env = "REDDIT_CLIENT_ID")]
    client_id: Option<String>,

    /// Reddit application client secret
    #[arg(long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Whisper model used for captions
    #[arg(short, long, value_enum)]
    model: Option<CliWhisperModel>,

    /// Background video URL
    #[arg(long)]
    url: Option<String>,

    /// Narration voice (see `edge-tts --list-voices`)
    #[arg(long)]
    voice: Option<String>,

    /// Number of posts to produce
    #[arg(long)]
    posts: Option<usize>,

    /// What to do with narration shorter than one part at the end of a post
    #[arg(long, value_enum)]
    remainder: Option<CliRemainderPolicy>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// storyparts - narrated multi-part story videos from Reddit posts
#[derive(Parser, Debug)]
#[command(name = "storyparts")]
#[command(version)]
#[command(about = "Turn long Reddit posts into narrated, captioned multi-part videos")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "storyparts picks the first unprocessed post long enough to narrate, splits the
narration into parts of one half or one third of its length, captions each part with
whisper and renders vertical videos over a background clip.

EXAMPLES:
    storyparts --sub-reddit relationships,TwoXChromosomes --client-id ID --client-secret SECRET
    storyparts --sub-reddit AskReddit --model medium --posts 2
    storyparts completions bash > storyparts.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. Command-line flags override the file.

REQUIREMENTS:
    edge-tts, whisper, yt-dlp and ffmpeg must be on PATH.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "✖"),
            Level::Warn => ("1;33", "!"),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "·"),
            Level::Trace => ("1;35", "…"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger once with info level by default
    // The level is adjusted after loading the config
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();
    let args = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "storyparts", &mut std::io::stdout());
            return ExitCode::SUCCESS;
        }
        Some(Commands::Run(args)) => args,
        None => cli.run,
    };

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("No post was produced");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether at least one post was produced
async fn run(options: RunArgs) -> Result<bool> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let controller = Controller::with_config(config)?;
    let report = controller.run().await?;
    Ok(report.succeeded())
}

fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    let config_json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;

    Ok(config)
}

fn apply_overrides(config: &mut Config, options: &RunArgs) {
    if !options.sub_reddit.is_empty() {
        config.source.subreddits = options.sub_reddit.clone();
    }
    if let Some(client_id) = &options.client_id {
        config.source.client_id = client_id.clone();
    }
    if let Some(client_secret) = &options.client_secret {
        config.source.client_secret = client_secret.clone();
    }
    if let Some(model) = &options.model {
        config.transcription.model = model.clone().into();
    }
    if let Some(url) = &options.url {
        config.background.url = url.clone();
    }
    if let Some(voice) = &options.voice {
        config.speech.voice = voice.clone();
    }
    if let Some(posts) = options.posts {
        config.assembly.posts_per_run = posts;
    }
    if let Some(remainder) = &options.remainder {
        config.assembly.remainder = remainder.clone().into();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
