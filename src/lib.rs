// Library exports for testing and external integration

pub mod application;
pub mod config;
pub mod crypto;
pub mod domain;

// Re-export commonly used items
pub use application::{FieldFilter, KeyCreation, KeyParser, OutputAssembler, ParsedKey};
pub use config::Settings;
pub use domain::{DomainError, DomainResult, Key, KeyOutput, NetworkParams, SubkeyPath};
