pub mod loader;
pub mod sms_backup;

pub use loader::{load_file, BatchLoader, ImportSummary, LoadError, PROGRESS_INTERVAL};
pub use sms_backup::{parse_backup, ImportError, ParsedBackup, RecordError};
