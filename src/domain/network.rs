use super::error::{DomainError, DomainResult};
use crate::crypto::Generator;
use std::fmt;

/// Parameters of one supported chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    /// Network code, e.g. `BTC`
    pub symbol: &'static str,
    pub network_name: &'static str,
    pub subnet_name: &'static str,
    pub wif_prefix: u8,
    pub address_prefix: u8,
    pub pay_to_script_prefix: u8,
    pub bip32_private_prefix: [u8; 4],
    pub bip32_public_prefix: [u8; 4],
    /// Human-readable part of segwit addresses, if the chain has segwit
    pub bech32_hrp: Option<&'static str>,
    pub generator: Generator,
}

impl NetworkParams {
    /// e.g. "Bitcoin mainnet"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.network_name, self.subnet_name)
    }
}

impl fmt::Display for NetworkParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

static NETWORKS: [NetworkParams; 4] = [
    NetworkParams {
        symbol: "BTC",
        network_name: "Bitcoin",
        subnet_name: "mainnet",
        wif_prefix: 0x80,
        address_prefix: 0x00,
        pay_to_script_prefix: 0x05,
        bip32_private_prefix: [0x04, 0x88, 0xad, 0xe4],
        bip32_public_prefix: [0x04, 0x88, 0xb2, 0x1e],
        bech32_hrp: Some("bc"),
        generator: Generator,
    },
    NetworkParams {
        symbol: "XTN",
        network_name: "Bitcoin",
        subnet_name: "testnet3",
        wif_prefix: 0xef,
        address_prefix: 0x6f,
        pay_to_script_prefix: 0xc4,
        bip32_private_prefix: [0x04, 0x35, 0x83, 0x94],
        bip32_public_prefix: [0x04, 0x35, 0x87, 0xcf],
        bech32_hrp: Some("tb"),
        generator: Generator,
    },
    NetworkParams {
        symbol: "LTC",
        network_name: "Litecoin",
        subnet_name: "mainnet",
        wif_prefix: 0xb0,
        address_prefix: 0x30,
        pay_to_script_prefix: 0x32,
        bip32_private_prefix: [0x01, 0x9d, 0x9c, 0xfe],
        bip32_public_prefix: [0x01, 0x9d, 0xa4, 0x62],
        bech32_hrp: Some("ltc"),
        generator: Generator,
    },
    NetworkParams {
        symbol: "DOGE",
        network_name: "Dogecoin",
        subnet_name: "mainnet",
        wif_prefix: 0x9e,
        address_prefix: 0x1e,
        pay_to_script_prefix: 0x16,
        bip32_private_prefix: [0x02, 0xfa, 0xc3, 0x98],
        bip32_public_prefix: [0x02, 0xfa, 0xca, 0xfd],
        bech32_hrp: None,
        generator: Generator,
    },
];

/// Every supported network, in registry order
pub fn all_networks() -> &'static [NetworkParams] {
    &NETWORKS
}

/// Codes of every supported network
pub fn network_codes() -> Vec<&'static str> {
    NETWORKS.iter().map(|n| n.symbol).collect()
}

/// Look up a network by code (case-insensitive)
pub fn network_for_code(code: &str) -> DomainResult<&'static NetworkParams> {
    NETWORKS
        .iter()
        .find(|n| n.symbol.eq_ignore_ascii_case(code.trim()))
        .ok_or_else(|| DomainError::UnknownNetwork(code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(network_for_code("btc").unwrap().symbol, "BTC");
        assert_eq!(network_for_code("Xtn").unwrap().symbol, "XTN");
        assert!(matches!(
            network_for_code("nope"),
            Err(DomainError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(network_for_code("XTN").unwrap().full_name(), "Bitcoin testnet3");
        assert_eq!(network_for_code("DOGE").unwrap().full_name(), "Dogecoin mainnet");
    }

    #[test]
    fn test_codes_are_unique() {
        let codes = network_codes();
        for (i, code) in codes.iter().enumerate() {
            assert!(!codes[i + 1..].contains(code), "duplicate code {}", code);
        }
    }
}
