mod analyze;
mod serve;

pub use analyze::run_analyze;
pub use serve::run_serve;
