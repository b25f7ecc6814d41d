//! Configuration and path management

pub mod paths;
pub mod settings;

pub use paths::WorkshopPaths;
pub use settings::Settings;
