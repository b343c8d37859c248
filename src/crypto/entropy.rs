use crate::domain::{DomainError, DomainResult};
use secrecy::SecretVec;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Minimum number of bytes a gathering round must yield
pub const MIN_ENTROPY_BYTES: usize = 64;

/// A source of random bytes
pub trait EntropySource {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Produce a batch of random bytes
    fn gather(&self) -> DomainResult<Vec<u8>>;
}

/// Random bytes from `gpg --gen-random`
pub struct GpgEntropy {
    byte_count: usize,
}

impl GpgEntropy {
    pub fn new(byte_count: usize) -> Self {
        Self { byte_count }
    }
}

impl Default for GpgEntropy {
    fn default() -> Self {
        Self::new(MIN_ENTROPY_BYTES)
    }
}

impl EntropySource for GpgEntropy {
    fn name(&self) -> &str {
        "gpg"
    }

    fn gather(&self) -> DomainResult<Vec<u8>> {
        // quality level 2: suitable for key material
        let output = Command::new("gpg")
            .args(["--gen-random", "2"])
            .arg(self.byte_count.to_string())
            .output()
            .map_err(|e| DomainError::CryptoError(format!("Failed to execute gpg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::CryptoError(format!(
                "gpg --gen-random failed: {}",
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Random bytes read from a character device such as `/dev/random`
pub struct DeviceEntropy {
    path: PathBuf,
    byte_count: usize,
}

impl DeviceEntropy {
    pub fn new(path: impl AsRef<Path>, byte_count: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            byte_count,
        }
    }
}

impl Default for DeviceEntropy {
    fn default() -> Self {
        Self::new("/dev/random", MIN_ENTROPY_BYTES)
    }
}

impl EntropySource for DeviceEntropy {
    fn name(&self) -> &str {
        "random device"
    }

    fn gather(&self) -> DomainResult<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.byte_count);
        File::open(&self.path)?
            .take(self.byte_count as u64)
            .read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

/// The system sources: the gpg helper followed by `/dev/random`
pub fn system_sources() -> Vec<Box<dyn EntropySource>> {
    vec![
        Box::new(GpgEntropy::default()),
        Box::new(DeviceEntropy::default()),
    ]
}

/// Concatenate the output of every source
///
/// A failing source is skipped with a warning; the combined yield must still reach
/// [`MIN_ENTROPY_BYTES`].
pub fn gather_entropy(sources: &[Box<dyn EntropySource>]) -> DomainResult<SecretVec<u8>> {
    let mut entropy = Vec::new();
    for source in sources {
        match source.gather() {
            Ok(bytes) => {
                tracing::debug!(source = source.name(), bytes = bytes.len(), "gathered entropy");
                entropy.extend_from_slice(&bytes);
            }
            Err(e) => {
                tracing::warn!("can't use {} as entropy source: {}", source.name(), e);
            }
        }
    }

    if entropy.len() < MIN_ENTROPY_BYTES {
        return Err(DomainError::EntropySourceExhausted {
            collected: entropy.len(),
            required: MIN_ENTROPY_BYTES,
        });
    }

    Ok(SecretVec::new(entropy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct FixedEntropy(Vec<u8>);

    impl EntropySource for FixedEntropy {
        fn name(&self) -> &str {
            "fixed"
        }

        fn gather(&self) -> DomainResult<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn name(&self) -> &str {
            "broken"
        }

        fn gather(&self) -> DomainResult<Vec<u8>> {
            Err(DomainError::CryptoError("unavailable".to_string()))
        }
    }

    #[test]
    fn test_sources_are_concatenated_in_order() {
        let sources: Vec<Box<dyn EntropySource>> = vec![
            Box::new(FixedEntropy(vec![1u8; 40])),
            Box::new(FixedEntropy(vec![2u8; 40])),
        ];
        let entropy = gather_entropy(&sources).unwrap();
        let bytes = entropy.expose_secret();
        assert_eq!(bytes.len(), 80);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[79], 2);
    }

    #[test]
    fn test_failing_source_is_tolerated() {
        let sources: Vec<Box<dyn EntropySource>> = vec![
            Box::new(BrokenEntropy),
            Box::new(FixedEntropy(vec![7u8; 64])),
        ];
        let entropy = gather_entropy(&sources).unwrap();
        assert_eq!(entropy.expose_secret().len(), 64);
    }

    #[test]
    fn test_insufficient_entropy_is_an_error() {
        let sources: Vec<Box<dyn EntropySource>> = vec![
            Box::new(BrokenEntropy),
            Box::new(FixedEntropy(vec![7u8; 63])),
        ];
        let Err(err) = gather_entropy(&sources) else {
            panic!("63 bytes should not satisfy the minimum");
        };
        assert!(matches!(
            err,
            DomainError::EntropySourceExhausted {
                collected: 63,
                required: 64
            }
        ));
    }

    #[test]
    fn test_device_source_reads_requested_bytes() {
        let mut device = NamedTempFile::new().unwrap();
        device.write_all(&[9u8; 100]).unwrap();

        let source = DeviceEntropy::new(device.path(), 64);
        assert_eq!(source.gather().unwrap(), vec![9u8; 64]);
    }

    #[test]
    fn test_missing_device_is_an_io_error() {
        let source = DeviceEntropy::new("/nonexistent/random-device", 64);
        assert!(matches!(source.gather().unwrap_err(), DomainError::Io(_)));
    }
}
