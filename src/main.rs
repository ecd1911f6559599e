// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use shortreel::app_config::{self, Config};
use shortreel::app_controller::Controller;

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble a short video from a script (default command)
    Render(RenderArgs),

    /// Generate shell completions for shortreel
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct RenderArgs {
    /// Narration script, sentences separated by periods
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Final video path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Voice identifier, also picks the transcription language
    #[arg(short, long)]
    voice: Option<String>,

    /// Subtitle anchor as "horizontal,vertical", e.g. "center,bottom"
    #[arg(short, long)]
    position: Option<String>,

    /// Encoder threads passed to ffmpeg
    #[arg(short, long)]
    threads: Option<usize>,

    /// Transcription API key; leave unset for local subtitle timing
    #[arg(long, env = "ASSEMBLYAI_API_KEY", hide_env_values = true)]
    transcription_key: Option<String>,

    /// Text-to-speech API key
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    tts_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Print what would be done without calling any service
    #[arg(long)]
    dry_run: bool,
}

/// shortreel - narrated, subtitled vertical videos from a text script
///
/// Reads a script, voices each sentence, times subtitles against the speech,
/// cuts stock footage to length and renders a 1080x1920 video.
#[derive(Parser, Debug)]
#[command(name = "shortreel")]
#[command(version)]
#[command(about = "Assemble short vertical videos from a script")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "shortreel turns a text script into a narrated, subtitled 9:16 video.

EXAMPLES:
    shortreel                                   # Render using conf.json
    shortreel -s story.txt -o out/story.mp4     # Override script and output
    shortreel -p center,bottom -t 4             # Bottom subtitles, 4 encoder threads
    shortreel --dry-run                         # Show the plan, call nothing
    shortreel completions bash > shortreel.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUBTITLES:
    With a transcription API key the narration is transcribed remotely.
    Without one, cue timings come from the length of each spoken sentence.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    render: RenderArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The level is lowered or raised once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "shortreel", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Render(args)) => run_render(args).await,
        None => run_render(cli.render).await,
    }
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &RenderArgs) {
    if let Some(script) = &options.script {
        config.script_path = script.clone();
    }
    if let Some(output) = &options.output {
        config.output_path = output.clone();
    }
    if let Some(voice) = &options.voice {
        config.voice = voice.clone();
    }
    if let Some(position) = &options.position {
        config.subtitles.position = position.clone();
    }
    if let Some(threads) = options.threads {
        config.video.threads = threads;
    }
    if let Some(key) = &options.transcription_key {
        config.transcription.api_key = Some(key.clone()).filter(|k| !k.trim().is_empty());
    }
    if let Some(key) = &options.tts_key {
        config.tts.api_key = key.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_render(options: RenderArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    config.validate()
        .context("Configuration validation failed")?;

    if options.dry_run {
        let controller = Controller::with_config(config)?;
        let plan = controller.plan()?;
        println!("{}", plan);
        return Ok(());
    }

    config.require_tts_credentials()
        .context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let output = controller.run().await?;
    info!("Done: {}", output.display());

    Ok(())
}
