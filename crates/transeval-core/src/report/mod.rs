pub mod aggregate;
pub mod console;
pub mod markdown;
pub mod progress;

pub use aggregate::{aggregate, StoreSource, SummaryRow};
pub use progress::{ProgressEvent, ProgressSink};
