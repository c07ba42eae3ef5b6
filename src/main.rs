// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{LevelFilter, Log, Metadata, Record, Level, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use cuetrack::app_config::{Config, LogLevel};
use cuetrack::app_controller::{Controller, parse_time_argument};
use cuetrack::subtitle_processor::format_timestamp;
use cuetrack::subtitle_processor::TimestampStyle;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a subtitle file and print its cues
    Parse {
        /// WebVTT or SRT file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print cues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the subtitle text shown at a playback time
    At {
        /// Seconds (e.g. 12.5) or timestamp (e.g. 00:00:12.500)
        #[arg(value_name = "TIME", allow_hyphen_values = true)]
        time: String,

        /// WebVTT or SRT files; the preferred language picks one
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Report lines and timestamps the parser had to tolerate
    Check {
        /// WebVTT or SRT file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Convert a subtitle file to WebVTT
    Convert {
        /// WebVTT or SRT file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (defaults to FILE with a .vtt extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of an existing output file
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Replay the subtitle overlay against a simulated playback clock
    Play {
        /// WebVTT or SRT files; the preferred language picks one
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Start position in seconds or as a timestamp
        #[arg(long, default_value = "0")]
        from: String,

        /// Stop position (defaults to the end of the last cue)
        #[arg(long)]
        until: Option<String>,

        /// Playback speed multiplier
        #[arg(long)]
        rate: Option<f64>,
    },

    /// Generate shell completions for cuetrack
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// cuetrack - WebVTT/SRT subtitle parser and cue synchronizer
#[derive(Parser, Debug)]
#[command(name = "cuetrack")]
#[command(version)]
#[command(about = "Parse WebVTT/SRT subtitles and resolve the active cue during playback")]
#[command(long_about = "cuetrack parses WebVTT and SRT subtitle files the way the movie browser player does and resolves which cue is visible at any playback time.

EXAMPLES:
    cuetrack parse movie.en.srt                 # List cues
    cuetrack parse --json movie.en.vtt          # List cues as JSON
    cuetrack at 00:01:02.500 movie.en.srt       # Text shown at 1m02.5s
    cuetrack check --strict movie.en.srt        # Fail on tolerated input
    cuetrack convert movie.en.srt               # Write movie.en.vtt
    cuetrack play --rate 10 movie.en.srt        # Simulate playback at 10x
    cuetrack play --language fr movie.*.srt     # Play the French track
    cuetrack completions bash > cuetrack.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Reject input the permissive parser would tolerate
    #[arg(long, global = true)]
    strict: bool,

    /// Preferred subtitle language when several files are given (ISO 639 code)
    #[arg(long, global = true, value_name = "CODE")]
    language: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config is loaded; the logger itself never filters
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "cuetrack", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).into());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.strict {
        config.subtitles.strict = true;
    }
    if let Some(language) = &cli.language {
        config.subtitles.preferred_language = language.clone();
    }
    if let Commands::Play { rate: Some(rate), .. } = &cli.command {
        config.playback.playback_rate = *rate;
    }
    log::set_max_level(config.log_level.into());

    let controller = Controller::with_config(config)?;
    run(&controller, cli.command).await
}

async fn run(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Parse { file, json } => {
            let cues = controller.parse_file(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&cues)?);
            } else {
                for cue in &cues {
                    println!("{}", cue);
                }
            }
            info!("{} cue(s) in {:?}", cues.len(), file);
        }
        Commands::At { time, files } => {
            let time = parse_time_argument(&time)?;
            let file = controller.select_track_file(&files)?;
            println!("{}", controller.cue_at(&file, time)?);
        }
        Commands::Check { file } => {
            let report = controller.check_file(&file)?;
            println!("format: {}, cues: {}", report.format, report.cues.len());
            for warning in &report.warnings {
                println!("{}", warning);
            }
            if !report.is_clean() {
                warn!("{} issue(s) in {:?}", report.warnings.len(), file);
                if controller.config().subtitles.strict {
                    return Err(anyhow!("Strict check failed for {:?}", file));
                }
            }
        }
        Commands::Convert { file, output, force_overwrite } => {
            let output = controller.convert_file(&file, output, force_overwrite)?;
            println!("{}", output.display());
        }
        Commands::Play { files, from, until, .. } => {
            let file = controller.select_track_file(&files)?;
            let from = parse_time_argument(&from)?;
            let until = until.as_deref().map(parse_time_argument).transpose()?;
            let changes = controller
                .simulate_playback(&file, from, until, |time, text| {
                    println!("{} {}", format_timestamp(time, TimestampStyle::WebVtt), text);
                })
                .await?;
            info!("Overlay changed {} time(s)", changes);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
