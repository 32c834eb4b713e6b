//! Mail delivery adapters.

mod recording;
mod spool;

pub use recording::RecordingMailer;
pub use spool::SpoolingMailer;
