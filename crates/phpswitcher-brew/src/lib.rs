mod backend;
mod detection;
mod provider;

pub use backend::BrewBackend;
pub use detection::BrewDetection;
pub use provider::BrewProvider;
