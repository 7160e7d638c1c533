use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use odia_bpe::config::{IngestConfig, TrainerConfig};
use odia_bpe::corpus::load_text_corpus;
use odia_bpe::{BpeModel, Trainer};
use serde_json::json;

const DEFAULT_OUTPUT: &str = "odia_bpe_tokenizer.json";
const SAMPLE_MERGES: usize = 10;

#[derive(Parser, Debug)]
#[command(author, version, about = "Odia BPE tokenizer toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a new tokenizer from Odia text files
    Train(TrainArgs),
    /// Encode text with a trained tokenizer
    Encode(EncodeArgs),
    /// Decode token ids back into text
    Decode(DecodeArgs),
    /// Inspect tokenizer metadata
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Files or directories to ingest
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path for the tokenizer JSON
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Target vocabulary size
    #[arg(long, value_name = "SIZE")]
    vocab_size: Option<usize>,

    /// Minimum frequency for merges
    #[arg(long, value_name = "COUNT")]
    min_frequency: Option<usize>,

    /// Maximum merge iterations
    #[arg(long, value_name = "COUNT")]
    max_merge_iterations: Option<usize>,

    /// Keep only the first N characters of each file
    #[arg(long, value_name = "CHARS")]
    max_chars: Option<usize>,

    /// Treat every non-empty line as a separate text
    #[arg(long)]
    split_lines: bool,

    /// Disable the progress spinner and per-iteration logging
    ///
    /// Without this flag a spinner runs during training; with -v the spinner
    /// is replaced by one log line per merge iteration.
    #[arg(long)]
    no_progress: bool,

    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Tokenizer JSON to load
    #[arg(short = 'm', long, value_name = "PATH")]
    tokenizer: PathBuf,

    /// Text to encode; read from --input or stdin when omitted
    #[arg(value_name = "TEXT", conflicts_with = "input")]
    text: Option<String>,

    /// File whose contents should be encoded
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Emit a JSON record with ids, tokens and compression ratio
    #[arg(long)]
    json: bool,

    /// Fall back to an untrained tokenizer when the model cannot be loaded
    #[arg(long)]
    fallback_untrained: bool,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Tokenizer JSON to load
    #[arg(short = 'm', long, value_name = "PATH")]
    tokenizer: PathBuf,

    /// Path to whitespace separated token ids
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Token ids to decode when --input is omitted
    #[arg(value_name = "ID", required_unless_present = "input")]
    tokens: Vec<u32>,

    /// Output file for decoded text (defaults to stdout)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Tokenizer JSON to inspect
    #[arg(short = 'm', long, value_name = "PATH")]
    tokenizer: PathBuf,

    /// Emit machine-readable JSON summary
    #[arg(long)]
    json: bool,

    /// Number of leading merges to list
    #[arg(long, value_name = "COUNT", default_value_t = SAMPLE_MERGES)]
    merges: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(args) => run_train(args, cli.verbose),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_train(args: TrainArgs, verbose: u8) -> Result<()> {
    // The spinner and the per-iteration log lines share stderr; only one runs.
    let log_iterations = !args.no_progress && verbose > 0;
    let show_spinner = !args.no_progress && !log_iterations;

    let mut cfg = TrainerConfig::builder();
    if let Some(vocab_size) = args.vocab_size {
        cfg = cfg.target_vocab_size(vocab_size);
    }
    if let Some(min_frequency) = args.min_frequency {
        cfg = cfg.min_frequency(min_frequency);
    }
    cfg = cfg.max_merge_iterations(args.max_merge_iterations);
    cfg = cfg.show_progress(log_iterations);
    let trainer_cfg = cfg.build()?;

    let ingest_cfg = IngestConfig::builder()
        .recursive(!args.no_recursive)
        .follow_symlinks(args.follow_symlinks)
        .split_lines(args.split_lines)
        .max_chars(args.max_chars)
        .build();

    let texts =
        load_text_corpus(&args.inputs, &ingest_cfg).context("failed to load text corpus")?;
    let corpus_chars: usize = texts.iter().map(|text| text.chars().count()).sum();
    info!(
        "loaded {} texts totalling {} characters",
        texts.len(),
        corpus_chars
    );

    let spinner = if show_spinner {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} training merges... {elapsed}")
            .context("invalid progress template")?;
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    } else {
        None
    };

    let trainer = Trainer::new(trainer_cfg);
    let start = Instant::now();
    let artifacts = trainer.train(&texts)?;
    drop(texts);
    if let Some(pb) = spinner {
        pb.finish_with_message("training complete");
    }
    let elapsed = start.elapsed();

    let model = &artifacts.model;
    model
        .save(&args.output)
        .with_context(|| format!("failed to save tokenizer to {}", args.output.display()))?;

    info!(
        "training complete: merges={} vocab={} stop={:?} duration={elapsed:.2?}",
        model.merges().len(),
        model.len(),
        artifacts.metrics.stop_reason
    );
    println!(
        "wrote tokenizer with vocab {} ({} merges) to {}",
        model.len(),
        model.merges().len(),
        args.output.display()
    );
    println!(
        "   corpus {} characters | {} words | duration {:.2?}",
        corpus_chars, artifacts.metrics.words, elapsed
    );
    for rule in model.merges().iter().take(SAMPLE_MERGES) {
        println!("   {rule}");
    }

    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let model = match BpeModel::load(&args.tokenizer) {
        Ok(model) => model,
        Err(err) if args.fallback_untrained && err.is_load_failure() => {
            warn!(
                "could not load {} ({err}); using an untrained tokenizer",
                args.tokenizer.display()
            );
            BpeModel::untrained(TrainerConfig::default().target_vocab_size)
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to load tokenizer from {}", args.tokenizer.display())
            })
        }
    };

    let text = match (&args.text, &args.input) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let symbols = model.encode_symbols(&text);
    let ids = model.encode(&text);
    if args.json {
        let tokens = symbols
            .iter()
            .zip(&ids)
            .map(|(symbol, id)| json!({ "token": symbol, "id": id }))
            .collect::<Vec<_>>();
        let record = json!({
            "ids": ids,
            "tokens": tokens,
            "characters": text.chars().count(),
            "compression_ratio": model.compression_ratio(&text),
        });
        println!("{}", serde_json::to_string(&record)?);
    } else {
        let mut stdout = io::stdout().lock();
        write_token_sequence(&mut stdout, &ids)?;
    }

    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let model = BpeModel::load(&args.tokenizer)
        .with_context(|| format!("failed to load tokenizer from {}", args.tokenizer.display()))?;

    let tokens = if let Some(input_path) = &args.input {
        let contents = fs::read_to_string(input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?;
        parse_token_list(&contents)?
    } else {
        args.tokens
    };

    let text = model.decode(&tokens);

    if let Some(path) = &args.output {
        let mut file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!(
            "wrote {} characters to {}",
            text.chars().count(),
            path.display()
        );
    } else {
        io::stdout().write_all(text.as_bytes())?;
    }

    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let model = BpeModel::load(&args.tokenizer)
        .with_context(|| format!("failed to load tokenizer from {}", args.tokenizer.display()))?;

    let special_tokens = model
        .special_tokens()
        .entries()
        .iter()
        .map(|(name, id)| format!("{name}={id}"))
        .collect::<Vec<_>>();
    let sample = model
        .merges()
        .iter()
        .take(args.merges)
        .map(|rule| json!([rule.first(), rule.second(), rule.merged()]))
        .collect::<Vec<_>>();

    if args.json {
        let summary = json!({
            "path": args.tokenizer.display().to_string(),
            "vocab_size": model.len(),
            "target_vocab_size": model.vocab_size(),
            "merges": model.merges().len(),
            "special_tokens": special_tokens,
            "first_merges": sample,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Vocab size    : {}", model.len());
        println!("Target size   : {}", model.vocab_size());
        println!("Merges        : {}", model.merges().len());
        println!("Special tokens: {}", special_tokens.join(", "));
        for rule in model.merges().iter().take(args.merges) {
            println!("  {rule}");
        }
    }

    Ok(())
}

fn write_token_sequence<W: Write>(writer: &mut W, tokens: &[u32]) -> Result<()> {
    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b" ")?;
        }
        write!(writer, "{token}")?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}

fn parse_token_list(text: &str) -> Result<Vec<u32>> {
    text.split_whitespace()
        .map(|part| {
            part.parse::<u32>()
                .map_err(|err| anyhow!("invalid token id `{part}`: {err}"))
        })
        .collect()
}
