//! Online sentiment balance kernel.
//!
//! A [`Kernel`] ingests `(label, sentiment)` observations and maintains a
//! smoothed balance estimate together with volatility, momentum, an adaptive
//! learning rate and detected trends.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │    Intake    │────►│   Mailbox    │────►│    Kernel    │
//! │ (validation) │     │ (one writer) │     │  (pipeline)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                                                  │
//!                                                  ▼
//!                                           ┌──────────────┐
//!                                           │   Snapshot   │
//!                                           │   (watch)    │
//!                                           └──────────────┘
//! ```

pub mod balance;
pub mod clock;
pub mod config;
pub mod decay;
pub mod error;
pub mod history;
pub mod intake;
pub mod kernel;
pub mod logging;
pub mod memory;
pub mod momentum;
pub mod patterns;
pub mod rate;
pub mod service;
pub mod status;
pub mod volatility;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::KernelConfig;
pub use error::{KernelError, KernelResult};
pub use kernel::{IngestResult, Kernel};
pub use service::{KernelHandle, KernelService};
pub use status::KernelStatus;
