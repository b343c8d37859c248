pub mod bip32;
pub mod curve;
pub mod encoding;
pub mod entropy;

// Re-export commonly used items
pub use bip32::{HierarchicalKey, HARDENED_OFFSET};
pub use curve::{parse_number, Generator};
pub use entropy::{gather_entropy, DeviceEntropy, EntropySource, GpgEntropy, MIN_ENTROPY_BYTES};
pub use primitive_types::U256;
