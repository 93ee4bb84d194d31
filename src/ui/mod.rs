pub mod progress;

pub use progress::{human_bytes, ShredProgress};
