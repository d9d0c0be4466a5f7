use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cuealign::io::{
    load_config_file, manuscript_to_json, read_manuscript_file, read_replay_file, render_manuscript,
    write_signal_log, write_signal_log_file, SignalRecord,
};
use cuealign::{run, AlignmentConfig, Granularity, ReplayRecognizer, Session, SessionEvent, Signal};

#[derive(Parser)]
#[command(name = "cuealign")]
#[command(author, version, about = "Follow a speaker through a manuscript from live speech-to-text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum GranularityArg {
    Sentence,
    Section,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Sentence => Granularity::Sentence,
            GranularityArg::Section => Granularity::Section,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a manuscript and print its units
    Segment {
        /// Manuscript file (.txt / .md)
        #[arg(short, long)]
        input: PathBuf,

        /// Unit granularity
        #[arg(long, value_enum, default_value = "sentence")]
        granularity: GranularityArg,

        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Rank manuscript units against a piece of text
    Query {
        /// Manuscript file (.txt / .md)
        #[arg(short, long)]
        input: PathBuf,

        /// Text to look up
        #[arg(short, long)]
        text: String,

        /// Alignment config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Replay a recorded or synthetic transcript through a live session
    Replay {
        /// Manuscript file (.txt / .md)
        #[arg(short, long)]
        input: PathBuf,

        /// Replay script: one fragment, directive or JSON recognizer event per line
        #[arg(short, long)]
        transcript: PathBuf,

        /// Output file for signals (JSON lines); stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Alignment config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the acceptance threshold
        #[arg(long)]
        acceptance: Option<f64>,

        /// Override the minimum buffer length before matching
        #[arg(long)]
        min_buffer_len: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Segment {
            input,
            granularity,
            json,
            verbose,
        } => {
            setup_logging(verbose);
            segment_manuscript(input, granularity.into(), json)
        }
        Commands::Query {
            input,
            text,
            config,
            verbose,
        } => {
            setup_logging(verbose);
            query_manuscript(input, text, config)
        }
        Commands::Replay {
            input,
            transcript,
            output,
            config,
            acceptance,
            min_buffer_len,
            verbose,
        } => {
            setup_logging(verbose);
            replay_transcript(input, transcript, output, config, acceptance, min_buffer_len).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(path: Option<PathBuf>) -> Result<AlignmentConfig> {
    match path {
        Some(path) => load_config_file(&path),
        None => Ok(AlignmentConfig::default()),
    }
}

fn segment_manuscript(input: PathBuf, granularity: Granularity, json: bool) -> Result<()> {
    let text = read_manuscript_file(&input)?;
    let config = AlignmentConfig::for_granularity(granularity);
    let manuscript = cuealign::segment(&text, &config.segment);

    info!(
        "Segmented {:?}: {} sections, {} units",
        input,
        manuscript.sections.len(),
        manuscript.unit_count()
    );

    if json {
        println!("{}", manuscript_to_json(&manuscript)?);
    } else {
        print!("{}", render_manuscript(&manuscript));
    }
    Ok(())
}

fn query_manuscript(input: PathBuf, text: String, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let acceptance = config.acceptance_threshold;
    let mut session = Session::new(config, ReplayRecognizer::new()).context("Invalid alignment config")?;
    session.load_manuscript(&read_manuscript_file(&input)?);

    let ranked = session.preview(&text);
    println!("Query: {:?}", cuealign::normalize_text(&text));
    println!("==================");
    if ranked.is_empty() {
        println!("No candidates");
        return Ok(());
    }

    for candidate in ranked {
        let raw = session
            .manuscript()
            .get_unit(candidate.unit_index)
            .map(|u| u.raw_text.replace('\n', " "))
            .unwrap_or_default();
        let gate = if candidate.confidence >= acceptance { "accept" } else { "reject" };
        println!(
            "unit {:>4}  approx {:.3}  bigram {:.3}  confidence {:.3}  [{}]  {}",
            candidate.unit_index,
            candidate.approx_score,
            candidate.bigram_score,
            candidate.confidence,
            gate,
            raw
        );
    }
    Ok(())
}

async fn replay_transcript(
    input: PathBuf,
    transcript: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    acceptance: Option<f64>,
    min_buffer_len: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(acceptance) = acceptance {
        config.acceptance_threshold = acceptance;
    }
    if let Some(min_buffer_len) = min_buffer_len {
        config.min_buffer_len = min_buffer_len;
    }

    let manuscript_text = read_manuscript_file(&input)?;
    let script = read_replay_file(&transcript)?;
    info!("Replaying {} events from {:?}", script.len(), transcript);

    let session = Session::new(config, ReplayRecognizer::new()).context("Invalid alignment config")?;
    let session_id = session.session_id();

    let (event_tx, event_rx) = mpsc::channel(64);
    let (signal_tx, mut signal_rx) = mpsc::channel::<Signal>(64);
    let driver = tokio::spawn(run(session, event_rx, signal_tx));

    let feeder = tokio::spawn(async move {
        let mut events = vec![SessionEvent::Load(manuscript_text), SessionEvent::Start];
        events.extend(script);
        events.push(SessionEvent::Stop);
        for event in events {
            if event_tx.send(event).await.is_err() {
                break;
            }
        }
    });

    let mut signals = Vec::new();
    while let Some(signal) = signal_rx.recv().await {
        signals.push(signal);
    }
    feeder.await.context("Transcript feeder panicked")?;
    let session = driver.await.context("Session driver panicked")?;

    let records: Vec<SignalRecord> = signals
        .into_iter()
        .map(|signal| SignalRecord::new(session_id, signal, session.manuscript()))
        .collect();

    match output {
        Some(path) => {
            write_signal_log_file(&path, &records)?;
            info!("Signals written to {:?}", path);
        }
        None => {
            let stdout = std::io::stdout();
            write_signal_log(&mut stdout.lock(), &records)?;
        }
    }

    let auto_moves = records
        .iter()
        .filter(|r| matches!(&r.signal, Signal::ActiveUnit(c) if c.trigger == cuealign::Trigger::Auto))
        .count();
    info!(
        "Complete: {} signals, {} automatic moves, final unit {}",
        records.len(),
        auto_moves,
        session.active_index()
    );

    Ok(())
}
