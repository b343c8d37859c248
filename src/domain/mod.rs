pub mod derivation;
pub mod error;
pub mod key;
pub mod network;
pub mod output;

// Re-export commonly used types
pub use derivation::{IndexRange, PathSegment, Subkey, SubkeyPath, Subkeys};
pub use error::{DomainError, DomainResult};
pub use key::Key;
pub use network::{all_networks, network_codes, network_for_code, NetworkParams};
pub use output::{KeyOutput, OutputField};
