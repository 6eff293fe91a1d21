use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bouquet_stream::{BouquetBuilt, Engine, ReportWriter};

#[derive(Parser, Debug)]
#[command(
    name = "bouquet-stream",
    version,
    about = "Assemble bouquets from a stream of recipes and flowers"
)]
struct Cli {
    /// Read the stream from a file instead of stdin
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Write a CSV row for every bouquet built
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. info, bouquet_stream=debug)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Read input on a separate thread through a ring buffer
    #[cfg(feature = "runtime")]
    #[arg(long)]
    pipelined: bool,

    /// Pin the engine thread to the last CPU core
    #[cfg(feature = "runtime")]
    #[arg(long, requires = "pipelined")]
    pin_core: bool,
}

/// Destination for emitted codes and the optional report.
struct Sink<W: Write> {
    out: W,
    report: Option<ReportWriter<File>>,
}

impl<W: Write> Sink<W> {
    fn emit(&mut self, built: &BouquetBuilt) -> Result<()> {
        writeln!(self.out, "{}", built.code).context("failed to write output")?;
        self.out.flush().context("failed to write output")?;
        if let Some(report) = &mut self.report {
            report.record(built).context("failed to write report row")?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        if let Some(report) = &mut self.report {
            report.flush().context("failed to flush report")?;
        }
        Ok(())
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead + Send>> {
    Ok(match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    })
}

fn open_report(path: Option<&Path>) -> Result<Option<ReportWriter<File>>> {
    path.map(|path| {
        ReportWriter::create(path)
            .with_context(|| format!("failed to create report {}", path.display()))
    })
    .transpose()
}

fn run_sync(input: Box<dyn BufRead + Send>, mut sink: Sink<impl Write>) -> Result<()> {
    let mut engine = Engine::new();

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        if let Some(built) = engine.process_line(&line)? {
            sink.emit(&built)?;
        }
    }

    let stats = engine.stats();
    info!(
        lines = stats.lines,
        flowers = stats.flowers,
        bouquets = stats.bouquets,
        unbuilt = engine.catalogue().len(),
        "stream complete"
    );
    sink.finish()
}

#[cfg(feature = "runtime")]
fn run_pipelined(
    input: Box<dyn BufRead + Send>,
    mut sink: Sink<io::Stdout>,
    pin_core: bool,
) -> Result<()> {
    use anyhow::anyhow;
    use bouquet_stream::Feed;
    use std::thread;

    const RING_CAPACITY: usize = 4096;

    let (mut line_tx, mut line_rx) = rtrb::RingBuffer::<Feed>::new(RING_CAPACITY);
    let (mut out_tx, mut out_rx) = rtrb::RingBuffer::<BouquetBuilt>::new(RING_CAPACITY);

    // Stops early once the engine has hung up
    fn push(tx: &mut rtrb::Producer<Feed>, mut feed: Feed) -> bool {
        loop {
            match tx.push(feed) {
                Ok(()) => return true,
                Err(rtrb::PushError::Full(back)) => {
                    if tx.is_abandoned() {
                        return false;
                    }
                    feed = back;
                    thread::yield_now();
                }
            }
        }
    }

    // End is always sent, even after a read error, so the engine returns
    let reader = thread::spawn(move || -> io::Result<()> {
        let mut outcome = Ok(());
        for line in input.lines() {
            match line {
                Ok(line) => {
                    if !push(&mut line_tx, Feed::Line(line)) {
                        return Ok(());
                    }
                }
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        push(&mut line_tx, Feed::End);
        outcome
    });

    let writer = thread::spawn(move || -> Result<Sink<io::Stdout>> {
        loop {
            match out_rx.pop() {
                Ok(built) => sink.emit(&built)?,
                Err(_) if out_rx.is_abandoned() => {
                    while let Ok(built) = out_rx.pop() {
                        sink.emit(&built)?;
                    }
                    return Ok(sink);
                }
                Err(_) => thread::yield_now(),
            }
        }
    });

    let mut engine = Engine::new();
    let outcome = engine.run(&mut line_rx, &mut out_tx, pin_core);
    drop(line_rx);
    drop(out_tx);

    let sink = writer
        .join()
        .map_err(|_| anyhow!("output thread panicked"))??;
    outcome?;
    reader
        .join()
        .map_err(|_| anyhow!("input thread panicked"))?
        .context("failed to read input")?;

    let stats = engine.stats();
    info!(
        lines = stats.lines,
        flowers = stats.flowers,
        bouquets = stats.bouquets,
        unbuilt = engine.catalogue().len(),
        "stream complete"
    );
    sink.finish()
}

fn run(cli: Cli) -> Result<()> {
    let input = open_input(cli.input.as_deref())?;
    let report = open_report(cli.report.as_deref())?;

    #[cfg(feature = "runtime")]
    if cli.pipelined {
        let sink = Sink {
            out: io::stdout(),
            report,
        };
        return run_pipelined(input, sink, cli.pin_core);
    }

    let sink = Sink {
        out: io::stdout().lock(),
        report,
    };
    run_sync(input, sink)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
