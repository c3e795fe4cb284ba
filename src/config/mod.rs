//! Configuration for kadmin

pub mod settings;

pub use settings::Settings;
