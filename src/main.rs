//! Replay newline-delimited JSON pulses through the kernel.
//!
//! Usage: pulsekernel [--config kernel.json] [pulses.jsonl]
//!
//! Reads stdin when no input file is given. Prints one ingestion result per
//! accepted pulse, then the final status. Without `--config`, configuration
//! comes from `PULSE_*` environment variables.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde_json::json;

use pulsekernel::intake::PulseInput;
use pulsekernel::logging::{log, obj, v_str, Domain, Level};
use pulsekernel::{Kernel, KernelConfig, KernelService};

struct Args {
    config: Option<PathBuf>,
    input: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        input: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                let path = it.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
            _ => args.input = Some(PathBuf::from(arg)),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => KernelConfig::from_json_file(path)?,
        None => KernelConfig::from_env(),
    };
    let kernel = Kernel::new(config).context("building kernel")?;
    let (handle, task) = KernelService::spawn(kernel);

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut accepted = 0u64;
    let mut rejected = 0u64;
    for (n, line) in reader.lines().enumerate() {
        let line = line.context("reading pulses")?;
        if line.trim().is_empty() {
            continue;
        }
        let observation = PulseInput::parse(&line).and_then(PulseInput::into_observation);
        let (label, sentiment) = match observation {
            Ok(v) => v,
            Err(err) => {
                rejected += 1;
                log(
                    Level::Warn,
                    Domain::System,
                    "pulse_skipped",
                    obj(&[("line", json!(n + 1)), ("reason", v_str(&err.to_string()))]),
                );
                continue;
            }
        };
        let result = handle.ingest(label, sentiment).await?;
        accepted += 1;
        println!("{}", serde_json::to_string(&result)?);
    }

    let status = handle.status();
    println!("{}", status.to_json());
    drop(handle);
    task.await.context("kernel task panicked")?;

    log(
        Level::Info,
        Domain::System,
        "replay_summary",
        obj(&[
            ("accepted", json!(accepted)),
            ("rejected", json!(rejected)),
            ("balance", json!(status.balance)),
        ]),
    );
    Ok(())
}
