pub mod config;

pub use config::{Hl7Version, ModelConfig};
