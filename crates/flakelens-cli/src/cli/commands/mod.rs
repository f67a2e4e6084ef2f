pub mod aggregate;
pub mod analyze;
pub mod dispatch;

pub use dispatch::dispatch;
