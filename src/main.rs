use std::process::ExitCode;

use stepsort::{
    create_bounded_event_channel, Algorithm, EngineConfig, EngineError, RunOutcome, SortEngine,
};

const DEMO_ARRAY: [u32; 8] = [5, 3, 8, 1, 9, 2, 7, 4];

const USAGE: &str = "usage: stepsort [algorithm] [values...]";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}\n{}", USAGE)]
    Usage(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(RunOutcome::Completed { .. }) => ExitCode::SUCCESS,
        Ok(outcome) => {
            eprintln!("run did not complete: {:?}", outcome);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Algorithm and values from the command line. No values means the demo
/// array.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(Algorithm, Vec<u32>), CliError> {
    let algorithm: Algorithm = match args.next() {
        Some(id) => id
            .parse()
            .map_err(|e: EngineError| CliError::Usage(e.to_string()))?,
        None => Algorithm::Bubble,
    };
    let mut array = args
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|e| CliError::Usage(format!("bad value {:?}: {}", raw, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if array.is_empty() {
        array = DEMO_ARRAY.to_vec();
    }
    Ok((algorithm, array))
}

/// `stepsort [algorithm] [values...]`
///
/// Streams every event of the run to stdout as one JSON object per line.
/// `STEPSORT_CONFIG` may name a JSON config file, `STEPSORT_SPEED_MS` sets
/// the per-step delay.
async fn run() -> Result<RunOutcome, CliError> {
    let (algorithm, array) = parse_args(std::env::args().skip(1))?;

    let config = match std::env::var("STEPSORT_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| EngineError::InvalidConfig(format!("{}: {}", path, e)))?;
            EngineConfig::from_json_str(&json)?
        }
        Err(_) => EngineConfig::default(),
    };
    let speed_ms = match std::env::var("STEPSORT_SPEED_MS") {
        Ok(raw) => Some(raw.parse::<u64>().map_err(|e| {
            EngineError::InvalidConfig(format!("STEPSORT_SPEED_MS={:?}: {}", raw, e))
        })?),
        Err(_) => None,
    };

    let (sink, mut events) = create_bounded_event_channel(1);
    let mut engine = SortEngine::builder(sink).config(config).build()?;
    tracing::info!(
        algorithm = algorithm.display_name(),
        stable = algorithm.is_stable(),
        len = array.len(),
        "starting demo run"
    );
    let run = engine.start(array, algorithm, speed_ms)?;

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "failed to encode event"),
            }
            if event.is_completed() {
                break;
            }
        }
    });

    let outcome = run.wait().await;
    drop(engine);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "event printer failed");
    }
    Ok(outcome)
}
