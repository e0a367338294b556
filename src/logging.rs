//! Structured JSON-line logging.
//!
//! Every record carries a timestamp, a process-wide sequence number, a level
//! and a domain, so a stream of ingestions can be replayed and filtered.
//! Lines go to stderr; stdout belongs to the binaries. Set `LOG_FILE` to
//! also append records to a file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Kernel,  // Ingestion results
    Memory,  // Eviction passes
    Pattern, // Trend detection
    Decay,   // Balance attenuation
    Config,  // Construction, validation
    Service, // Serialized writer task
    System,  // Binaries: startup, summaries
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Kernel => "kernel",
            Domain::Memory => "memory",
            Domain::Pattern => "pattern",
            Domain::Decay => "decay",
            Domain::Config => "config",
            Domain::Service => "service",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Level used for per-ingestion records emitted from inside the kernel.
pub const PIPELINE_LEVEL: Level = Level::Debug;

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static LOG_FILE: OnceLock<Option<Mutex<BufWriter<File>>>> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

fn file_sink() -> Option<&'static Mutex<BufWriter<File>>> {
    LOG_FILE
        .get_or_init(|| {
            let path = std::env::var("LOG_FILE").ok()?;
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(f) => Some(Mutex::new(BufWriter::new(f))),
                Err(err) => {
                    eprintln!("[log] failed to open {}: {}", path, err);
                    None
                }
            }
        })
        .as_ref()
}

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// =============================================================================
// Core logging functions
// =============================================================================

/// Whether a record at `level` in `domain` would be written.
pub fn enabled(level: Level, domain: Domain) -> bool {
    level >= Level::from_env() && domain.is_enabled()
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if !enabled(level, domain) {
        return;
    }
    let line = render(level, domain, event, fields);
    if let Some(sink) = file_sink() {
        if let Ok(mut w) = sink.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
    eprintln!("{}", line);
}

fn render(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) -> String {
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("domain".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("data".to_string(), Value::Object(fields));
    Value::Object(entry).to_string()
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_config(fingerprint: &str, config: &Value) {
    log(
        PIPELINE_LEVEL,
        Domain::Config,
        "kernel_created",
        obj(&[("fingerprint", v_str(fingerprint)), ("config", config.clone())]),
    );
}

#[allow(clippy::too_many_arguments)]
pub fn log_ingest(
    seq: u64,
    label: &str,
    sentiment: f64,
    balance: f64,
    rate: f64,
    volatility: f64,
    prediction_error: f64,
    memory_size: usize,
) {
    if !enabled(PIPELINE_LEVEL, Domain::Kernel) {
        return;
    }
    log(
        PIPELINE_LEVEL,
        Domain::Kernel,
        "ingest",
        obj(&[
            ("input_seq", json!(seq)),
            ("label", v_str(label)),
            ("sentiment", v_num(sentiment)),
            ("balance", v_num(balance)),
            ("rate", v_num(rate)),
            ("volatility", v_num(volatility)),
            ("prediction_error", v_num(prediction_error)),
            ("memory_size", json!(memory_size)),
        ]),
    );
}

pub fn log_rejected(reason: &str) {
    log(
        Level::Warn,
        Domain::Kernel,
        "input_rejected",
        obj(&[("reason", v_str(reason))]),
    );
}

pub fn log_eviction(before: usize, after: usize, landmarks_kept: usize) {
    log(
        PIPELINE_LEVEL,
        Domain::Memory,
        "eviction",
        obj(&[
            ("before", json!(before)),
            ("after", json!(after)),
            ("landmarks_kept", json!(landmarks_kept)),
        ]),
    );
}

pub fn log_pattern(direction: &str, strength: f64, window_size: usize, adaptation_score: f64) {
    log(
        Level::Info,
        Domain::Pattern,
        "trend_detected",
        obj(&[
            ("direction", v_str(direction)),
            ("strength", v_num(strength)),
            ("window_size", json!(window_size)),
            ("adaptation_score", v_num(adaptation_score)),
        ]),
    );
}

pub fn log_decay(interval: u64, factor: f64, idle: bool, balance: f64) {
    log(
        Level::Trace,
        Domain::Decay,
        "decay_applied",
        obj(&[
            ("interval", json!(interval)),
            ("factor", v_num(factor)),
            ("idle", json!(idle)),
            ("balance", v_num(balance)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Tests
// =============================================================================
