//! Settlement CLI
//!
//! Reads one poker session snapshot from CSV and writes the transfers that
//! settle it.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- session.csv > settlement.csv
//! cargo run -- session.csv --shortfall overpay
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use poker_settlement::{
    write_settlement, EngineError, Result, Session, SettlementConfig, SettlementEngine,
    ShortfallPolicy,
};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

struct Args {
    input_path: String,
    config: SettlementConfig,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut input_path = None;
    let mut config = SettlementConfig::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--shortfall" => {
                let value = iter.next().ok_or_else(|| {
                    EngineError::InvalidArgument("--shortfall requires a value".to_string())
                })?;
                let policy = value
                    .parse::<ShortfallPolicy>()
                    .map_err(EngineError::InvalidArgument)?;
                config = config.with_shortfall_policy(policy);
            }
            flag if flag.starts_with("--") => {
                return Err(EngineError::InvalidArgument(format!("unknown flag {}", flag)));
            }
            path if input_path.is_none() => input_path = Some(path.to_string()),
            extra => {
                return Err(EngineError::InvalidArgument(format!(
                    "unexpected argument {}",
                    extra
                )));
            }
        }
    }

    let input_path = input_path.ok_or(EngineError::MissingArgument)?;
    Ok(Args { input_path, config })
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let file = File::open(&args.input_path)?;
    let session = Session::from_csv(BufReader::new(file))?;

    let engine = SettlementEngine::with_config(args.config);
    let result = engine.compute_session(&session)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    write_settlement(&result, handle)?;

    eprintln!("{}", result.summary());
    Ok(())
}
