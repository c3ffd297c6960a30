pub mod availability;
pub mod normalize;
pub mod panic;

pub use availability::{require_available, Availability};
pub use normalize::{normalize_errors, render};
pub use panic::capture_panic;
