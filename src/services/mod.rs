//! Services separating I/O and progress reporting from batch orchestration

pub mod io;
pub mod progress;

pub use io::ImageIOService;
#[cfg(feature = "cli")]
pub use progress::ProgressBarReporter;
pub use progress::{
    CallbackProgressReporter, ChannelProgressReporter, ConsoleProgressReporter,
    NoOpProgressReporter, ProgressReporter, ReportEvent,
};
