use anyhow::Context;
use clap::Parser;
use hourglass::{Driver, LineEmitter, RunOutcome, Scheduler, SchedulerConfig, UtilizationLog};
use std::io::BufWriter;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "hourglass")]
#[command(about = "Trace-driven autoscaler for a three-queue batch compute service")]
#[command(version)]
struct Cli {
    /// Write per-job utilization counters to this file
    log_file: Option<PathBuf>,

    /// Extra trace files, read after stdin is exhausted
    inputs: Vec<PathBuf>,

    /// TOML file overriding the scheduler tunables
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
    std::process::exit(0);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let scheduler = Scheduler::new(config)?;
    let emitter = LineEmitter::new(BufWriter::new(std::io::stdout()));
    let mut driver = Driver::new(scheduler, emitter);
    if let Some(path) = &cli.log_file {
        let log = UtilizationLog::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        driver = driver.with_util_log(log);
    }

    // One logical stream: stdin followed by any extra trace files.
    let mut input: Box<dyn tokio::io::AsyncRead + Unpin> = Box::new(tokio::io::stdin());
    for path in &cli.inputs {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("opening trace file {}", path.display()))?;
        input = Box::new(input.chain(file));
    }
    let reader = tokio::io::BufReader::new(input);

    match driver.run(reader, shutdown_signal()?).await {
        Ok(outcome) => {
            driver.emitter_mut().flush()?;
            if outcome == RunOutcome::Interrupted {
                tracing::info!("interrupted, exiting without draining the pools");
            }
            Ok(())
        }
        Err(e) => {
            // Push out whatever was echoed before the failure; the log
            // sink flushes line by line and closes on drop.
            let _ = driver.emitter_mut().flush();
            Err(e.into())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<SchedulerConfig> {
    let Some(path) = path else {
        return Ok(SchedulerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: SchedulerConfig =
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?;
    Ok(config)
}

/// Resolves on SIGINT, SIGTERM, or SIGHUP. Interruption is a clean exit:
/// the run stops where it is, without the shutdown terminations.
fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => {},
            _ = terminate.recv() => {},
            _ = hangup.recv() => {},
        }
    })
}
