use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use card_table::board::BoardController;
use card_table::core::TableConfig;
use card_table::protocol::ServerMessage;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Replay a recorded server transcript through the table engine and print the
/// final board.
#[derive(Parser)]
struct Args {
    /// Transcript with one server message JSON object per line
    transcript: PathBuf,

    /// Table config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Selection seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Clock step between ticks, in milliseconds
    #[arg(long, default_value_t = 50)]
    step_ms: u64,

    /// Print the board after every message, not just at the end
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);

    let mut config = match &args.config {
        Some(path) => TableConfig::from_path(path)?,
        None => TableConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let step_ms = args.step_ms.max(1);

    let file = File::open(&args.transcript)
        .with_context(|| format!("failed to open {}", args.transcript.display()))?;
    let mut board = BoardController::from_config(config);
    let mut now_ms = 0;
    let mut handled = 0;

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let message = ServerMessage::from_json(line)
            .with_context(|| format!("line {}: not a server message", line_no + 1))?;

        match board.handle(message) {
            Ok(outcome) => debug!(line = line_no + 1, ?outcome, "message handled"),
            Err(err) => warn!(line = line_no + 1, error = %err, "message rejected"),
        }
        handled += 1;

        while board.is_animating() {
            now_ms += step_ms;
            for completion in board.tick(now_ms) {
                if !completion.settled() {
                    warn!(job = completion.job.0, action = ?completion.action_index, "job failed");
                }
            }
        }

        if args.verbose {
            println!("{}\n", board.scene(now_ms).summary());
        }
    }

    info!(messages = handled, elapsed_ms = now_ms, "transcript replayed");
    println!("{}", board.scene(now_ms).summary());
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(format),
        )
        .with(filter)
        .init();
}
