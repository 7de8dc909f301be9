pub mod sighting;
pub mod sticker;
pub mod timestamp;
pub mod upload;

pub use sighting::*;
pub use sticker::*;
pub use timestamp::{Timestamp, TimestampParseError};
pub use upload::UploadResponse;
