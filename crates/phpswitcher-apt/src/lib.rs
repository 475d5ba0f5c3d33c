mod backend;
mod classify;
mod detection;
mod provider;

pub use backend::AptBackend;
pub use detection::AptDetection;
pub use provider::AptProvider;
