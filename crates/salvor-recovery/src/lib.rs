//! Recovery job execution.
//!
//! A job runs in two stages. [`RecoveryInvoker`] launches the external tool
//! against a stored upload and drives its lifecycle as an explicit
//! [`ProcessPhase`] state machine fed by [`ProcessEvent`]s. Only when that
//! machine reaches `Exited(Some(0))` does [`Harvester`] wait the configured
//! delay, move every file the tool wrote into durable storage and record it.
//! [`RecoveryJob`] ties the two together for one upload.

pub mod clock;
pub mod error;
pub mod harvest;
pub mod invoker;
pub mod job;

pub use clock::{ImmediateSleeper, Sleeper, TokioSleeper};
pub use error::RecoveryError;
pub use harvest::{HarvestReport, Harvester};
pub use invoker::{InvocationOutcome, OutputStream, ProcessEvent, ProcessPhase, RecoveryInvoker};
pub use job::RecoveryJob;

#[cfg(all(test, unix))]
pub(crate) mod test_support;
