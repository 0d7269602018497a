pub mod cycle;
pub mod scheduler;

pub use cycle::{WatchSettings, Watcher};
pub use scheduler::Scheduler;
