pub mod alert;
pub mod classifier;
pub mod config;
pub mod diff;
pub mod error;
pub mod history;
pub mod monitor;
pub mod normalizer;
pub mod notify;
pub mod presets;
pub mod sources;

pub use error::WatchError;
pub use monitor::{Monitor, RunReport};
