//! Detects when a link-triggered download finishes.
//!
//! `listen` binds the elements of a target. Each click stamps every bound
//! URL with a fresh token, shows the indicator and polls the handshake cookie
//! once per interval until the server echoes the token (or, with no cookie at
//! all, until the attempts run out). Then the indicator goes away, the cookie
//! is expired and the callback runs.

mod cycle;
mod listener;
mod session;
mod timer;
mod timing;

pub use cycle::{Cycle, CycleOutcome};
pub use listener::{listen, listen_with, Click, Listener};
pub use session::{CompletionReason, Observation, PollSession};
pub use timer::PollTimer;
pub use timing::PollTiming;
