mod family;
mod paths;

pub use family::PlatformFamily;
pub use paths::{AppPaths, AppPathsError};
