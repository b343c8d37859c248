pub mod format_registry;
pub mod key_creation;
pub mod network_format;
pub mod output_assembly;
pub mod parse_chain;

// Re-export commonly used items
pub use format_registry::{FormatDescriptor, FormatKind, FormatPrefix, FormatRegistry, Recognition};
pub use key_creation::KeyCreation;
pub use network_format::NetworkFormatter;
pub use output_assembly::{FieldFilter, OutputAssembler};
pub use parse_chain::{KeyParser, ParsedKey, CREATE_TOKEN};
