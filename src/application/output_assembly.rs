use super::network_format::NetworkFormatter;
use crate::domain::{Key, KeyOutput, NetworkParams, OutputField};
use std::collections::BTreeSet;

/// Set of field names to emit; empty means every field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    fields: BTreeSet<String>,
}

impl FieldFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::default();
        for field in fields {
            filter.insert(field);
        }
        filter
    }

    pub fn insert(&mut self, field: impl Into<String>) {
        self.fields.insert(field.into().to_lowercase());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn allows(&self, key: &str) -> bool {
        self.fields.is_empty() || self.fields.contains(key)
    }
}

/// Output assembly use case
pub struct OutputAssembler;

impl OutputAssembler {
    /// Every representation of `key` on `network`, in emission order
    pub fn assemble(
        item: &str,
        key: &Key,
        subkey_path: Option<&str>,
        network: &'static NetworkParams,
        filter: &FieldFilter,
    ) -> KeyOutput {
        let formatter = NetworkFormatter::new(network);
        let mut output = KeyOutput::new();
        let mut add = |field: OutputField| {
            if filter.allows(&field.key) {
                output.push(field);
            }
        };

        add(OutputField::new("input", Some(item.to_string()), None));
        add(OutputField::new("network", Some(network.full_name()), None));
        add(OutputField::new("symbol", Some(network.symbol.to_string()), None));

        if let Some(node) = key.hierarchical() {
            if let Some(path) = subkey_path {
                add(OutputField::new("subkey_path", Some(path.to_string()), None));
            }
            formatter.hierarchical_fields(node).into_iter().for_each(&mut add);
        }

        if let Some(secret) = key.secret_key() {
            formatter
                .secret_exponent_fields(&secret)
                .into_iter()
                .for_each(&mut add);
        }

        match (key.public_key(), key.hash160(true)) {
            (Some(point), _) => formatter
                .public_pair_fields(&point)
                .into_iter()
                .for_each(&mut add),
            (None, Some(h160)) => formatter.hash160_fields(&h160).into_iter().for_each(&mut add),
            (None, None) => {}
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{HierarchicalKey, U256};
    use crate::domain::network_for_code;

    fn btc() -> &'static NetworkParams {
        network_for_code("BTC").unwrap()
    }

    #[test]
    fn test_emission_order_for_private_hierarchical_key() {
        let key = Key::Hierarchical(HierarchicalKey::from_master_secret(b"foo").unwrap());
        let output = OutputAssembler::assemble("P:foo", &key, Some("0"), btc(), &FieldFilter::all());
        let keys: Vec<&str> = output.fields().iter().map(|f| f.key.as_str()).collect();

        assert_eq!(&keys[..5], &["input", "network", "symbol", "subkey_path", "wallet_key"]);
        let position = |name: &str| keys.iter().position(|k| *k == name).unwrap();
        assert!(position("private_key") < position("secret_exponent"));
        assert!(position("wif_uncompressed") < position("public_pair_x"));
        assert_eq!(*keys.last().unwrap(), "p2sh_segwit");
        assert_eq!(output.get("network"), Some("Bitcoin mainnet"));
        assert_eq!(
            output.get("wallet_key"),
            Some("xprv9s21ZrQH143K31AgNK5pyVvW23gHnkBq2wh5aEk6g1s496M8ZMjxncCKZKgb5jZoY5eSJMJ2Vbyvi2hbmQnCuHBujZ2WXGTux1X2k9Krdtq")
        );
    }

    #[test]
    fn test_subkey_path_only_for_hierarchical_keys() {
        let key = Key::from_secret_exponent(&U256::one()).unwrap();
        let output = OutputAssembler::assemble("1", &key, Some("0"), btc(), &FieldFilter::all());
        assert!(output.get("subkey_path").is_none());
        assert!(output.get("wallet_key").is_none());
        assert_eq!(output.get("secret_exponent"), Some("1"));
    }

    #[test]
    fn test_hash160_only_key() {
        let digest: [u8; 20] = hex::decode("89abcdef89abcdef89abcdef89abcdef89abcdef")
            .unwrap()
            .try_into()
            .unwrap();
        let output = OutputAssembler::assemble(
            "89abcdef89abcdef89abcdef89abcdef89abcdef",
            &Key::AddressOnly(digest),
            None,
            btc(),
            &FieldFilter::all(),
        );
        assert_eq!(
            output.get("address"),
            Some("1DYwPTp6PAnXhbaUeHgTXwYV4UNuN85ZJw")
        );
        assert!(output.get("public_pair_x").is_none());
        assert!(output.get("address_segwit").is_some());
    }

    #[test]
    fn test_filter_restricts_fields() {
        let key = Key::from_secret_exponent(&U256::one()).unwrap();
        let filter = FieldFilter::only(["wif", "Address"]);
        let output = OutputAssembler::assemble("1", &key, None, btc(), &filter);
        let keys: Vec<&str> = output.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["wif", "address"]);
    }

    #[test]
    fn test_target_network_changes_encodings() {
        let key = Key::from_secret_exponent(&U256::one()).unwrap();
        let xtn = network_for_code("XTN").unwrap();
        let output = OutputAssembler::assemble("1", &key, None, xtn, &FieldFilter::all());
        assert_eq!(output.get("symbol"), Some("XTN"));
        assert_eq!(
            output.get("address"),
            Some("mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r")
        );
    }
}
