use crate::crypto::encoding::{address, b58check_encode, hash160, p2wpkh_script, sec, segwit_address, wif};
use crate::crypto::curve::from_be_bytes;
use crate::crypto::{Generator, HierarchicalKey, HARDENED_OFFSET};
use crate::domain::{NetworkParams, OutputField};
use secp256k1::{PublicKey, SecretKey};

/// Renders key material with one network's prefixes
#[derive(Debug, Clone, Copy)]
pub struct NetworkFormatter {
    network: &'static NetworkParams,
}

impl NetworkFormatter {
    pub fn new(network: &'static NetworkParams) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &'static NetworkParams {
        self.network
    }

    /// base58check extended key; `None` when a private form is requested from a public node
    pub fn wallet_key(&self, node: &HierarchicalKey, as_private: bool) -> Option<String> {
        let version = if as_private {
            self.network.bip32_private_prefix
        } else {
            self.network.bip32_public_prefix
        };
        node.serialize(version, as_private)
            .map(|data| b58check_encode(&data))
    }

    pub fn hierarchical_fields(&self, node: &HierarchicalKey) -> Vec<OutputField> {
        let is_private = node.is_private();
        let mut fields = vec![OutputField::new(
            "wallet_key",
            self.wallet_key(node, is_private),
            None,
        )];
        if is_private {
            fields.push(OutputField::new(
                "public_version",
                self.wallet_key(node, false),
                None,
            ));
        }

        let child_number = node.child_number();
        let child_index = if child_number >= HARDENED_OFFSET {
            format!("{}H ({})", child_number - HARDENED_OFFSET, child_number)
        } else {
            child_number.to_string()
        };

        fields.extend([
            OutputField::new("tree_depth", Some(node.depth().to_string()), None),
            OutputField::new("fingerprint", Some(hex::encode(node.fingerprint())), None),
            OutputField::new(
                "parent_fingerprint",
                Some(hex::encode(node.parent_fingerprint())),
                Some("parent f'print"),
            ),
            OutputField::new("child_index", Some(child_index), None),
            OutputField::new("chain_code", Some(hex::encode(node.chain_code())), None),
            OutputField::new(
                "private_key",
                Some(if is_private { "yes" } else { "no" }.to_string()),
                None,
            ),
        ]);
        fields
    }

    pub fn secret_exponent_fields(&self, secret: &SecretKey) -> Vec<OutputField> {
        let exponent = from_be_bytes(&secret.secret_bytes());
        vec![
            OutputField::new("secret_exponent", Some(exponent.to_string()), None),
            OutputField::new(
                "secret_exponent_hex",
                Some(format!("{:x}", exponent)),
                Some(" hex"),
            ),
            OutputField::new("wif", Some(wif(self.network.wif_prefix, secret, true)), None),
            OutputField::new(
                "wif_uncompressed",
                Some(wif(self.network.wif_prefix, secret, false)),
                Some(" uncompressed"),
            ),
        ]
    }

    pub fn public_pair_fields(&self, point: &PublicKey) -> Vec<OutputField> {
        let (x, y) = Generator::public_pair(point);
        let h160 = hash160(&sec(point, true));
        let h160_uncompressed = hash160(&sec(point, false));
        let address_label = format!("{} address", self.network.network_name);

        let mut fields = vec![
            OutputField::new("public_pair_x", Some(x.to_string()), None),
            OutputField::new("public_pair_y", Some(y.to_string()), None),
            OutputField::new("public_pair_x_hex", Some(format!("{:x}", x)), Some(" x as hex")),
            OutputField::new("public_pair_y_hex", Some(format!("{:x}", y)), Some(" y as hex")),
            OutputField::new(
                "y_parity",
                Some(if y.bit(0) { "odd" } else { "even" }.to_string()),
                None,
            ),
            OutputField::new("key_pair_as_sec", Some(hex::encode(sec(point, true))), None),
            OutputField::new(
                "key_pair_as_sec_uncompressed",
                Some(hex::encode(sec(point, false))),
                Some(" uncompressed"),
            ),
            OutputField::new("hash160", Some(hex::encode(h160)), None),
            OutputField::new(
                "hash160_uncompressed",
                Some(hex::encode(h160_uncompressed)),
                Some(" uncompressed"),
            ),
            OutputField::new(
                "address",
                Some(address(self.network.address_prefix, &h160)),
                Some(address_label.as_str()),
            ),
            OutputField::new(
                "address_uncompressed",
                Some(address(self.network.address_prefix, &h160_uncompressed)),
                Some(" uncompressed"),
            ),
        ];

        if let Some(hrp) = self.network.bech32_hrp {
            fields.push(OutputField::new(
                "address_segwit",
                segwit_address(hrp, &h160),
                Some(" segwit address"),
            ));
            let script_hash = hash160(&p2wpkh_script(&h160));
            fields.push(OutputField::new(
                "p2sh_segwit",
                Some(address(self.network.pay_to_script_prefix, &script_hash)),
                Some(" legacy p2sh segwit"),
            ));
        }
        fields
    }

    /// Fields for a key known only by its hash160
    pub fn hash160_fields(&self, h160: &[u8; 20]) -> Vec<OutputField> {
        let address_label = format!("{} address", self.network.network_name);
        let mut fields = vec![
            OutputField::new("hash160", Some(hex::encode(h160)), None),
            OutputField::new(
                "address",
                Some(address(self.network.address_prefix, h160)),
                Some(address_label.as_str()),
            ),
        ];
        if let Some(hrp) = self.network.bech32_hrp {
            fields.push(OutputField::new(
                "address_segwit",
                segwit_address(hrp, h160),
                Some(" segwit address"),
            ));
        }
        fields
    }
}
