use crate::{
    charset::Charset,
    config::Config,
    convert::ConversionEngine,
    detect::{Detection, EncodingDetector},
    report::FailureReport,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "subrecode")]
#[command(about = "Detect a subtitle/text file's encoding and re-encode it safely in place")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./subrecode.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Guess the encoding of a file.
    Detect {
        #[arg(long)]
        input: PathBuf,
        /// Leading lines to sample (default from config).
        #[arg(long)]
        sample_lines: Option<usize>,
    },
    /// Re-encode a file in place, or into --output.
    Convert {
        #[arg(long)]
        input: PathBuf,
        /// Source encoding; detected when omitted.
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: String,
        /// Write to this new file instead of rewriting the input.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the supported encodings.
    Encodings {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Detect {
            input,
            sample_lines,
        } => detect(&cfg, input, *sample_lines),
        Command::Convert {
            input,
            from,
            to,
            output,
        } => convert(&cfg, input, from.as_deref(), to, output.as_deref()),
        Command::Encodings {} => encodings(),
    }
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = PathBuf::from("subrecode.toml");
    if default.exists() {
        Config::load(&default)
    } else {
        Ok(Config::default())
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the JSON reports, so console logging goes to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn detect(cfg: &Config, input: &Path, sample_lines: Option<usize>) -> Result<()> {
    let detector = EncodingDetector::new(cfg);
    let lines = sample_lines.unwrap_or(cfg.detection.sample_lines);
    let report = detector.probe(input, lines)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn convert(
    cfg: &Config,
    input: &Path,
    from: Option<&str>,
    to: &str,
    output: Option<&Path>,
) -> Result<()> {
    let target: Charset = to.parse()?;
    let source = match from {
        Some(label) => label.parse::<Charset>()?,
        None => match EncodingDetector::new(cfg).detect(input, cfg.detection.sample_lines)? {
            Detection::Detected(label) => {
                info!(
                    "using detected source {} (confidence {:.2})",
                    label.charset, label.confidence
                );
                label.charset
            }
            Detection::Undetectable => {
                return Err(anyhow!(
                    "could not detect the encoding of {}; pass --from",
                    input.display()
                ));
            }
        },
    };
    if source == target {
        warn!("source and target are both {target}; only the BOM may change");
    }

    let engine = ConversionEngine::new(cfg);
    let result = match output {
        Some(dest) => engine.recode_into(input, dest, source, target),
        None => engine.convert(input, source, target),
    };
    match result {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(err) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&FailureReport::from(&err))?
            );
            Err(err.into())
        }
    }
}

fn encodings() -> Result<()> {
    let labels: Vec<&str> = Charset::ALL.iter().map(|c| c.label()).collect();
    println!("{}", serde_json::to_string_pretty(&labels)?);
    Ok(())
}
