pub mod output;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser};
use ku_cli::application::{FieldFilter, KeyCreation, KeyParser, OutputAssembler};
use ku_cli::config::Settings;
use ku_cli::domain::{all_networks, network_for_code, SubkeyPath};
use output::{render, OutputFormat};
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "ku")]
#[command(
    about = "Key utility: show every representation of a Bitcoin-style key, address or seed",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Show just the wallet key
    #[arg(short = 'w', long)]
    pub wallet: bool,

    /// Show just the WIF
    #[arg(short = 'W', long)]
    pub wif: bool,

    /// Show just the address
    #[arg(short = 'a', long)]
    pub address: bool,

    /// Use the uncompressed form for --wif and --address
    #[arg(short = 'u', long)]
    pub uncompressed: bool,

    /// Only show public versions of keys
    #[arg(short = 'P', long)]
    pub public: bool,

    /// Output as JSON
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Brief output: only the named fields
    #[arg(short = 'b', long, num_args = 0..)]
    pub brief: Option<Vec<String>>,

    /// Subkey path (example: 0H/2/15-20)
    #[arg(short = 's', long, default_value = "")]
    pub subkey: String,

    /// Network to parse and display with
    #[arg(short = 'n', long)]
    pub network: Option<String>,

    /// Display with this network regardless of the detected one
    #[arg(long)]
    pub override_network: Option<String>,

    /// Tokens: a wallet key, WIF, address, SEC, secret exponent, `x,y` pair,
    /// hash160, `H:<hex seed>`, `P:<passphrase>` or the literal `create`.
    /// Read from stdin when absent.
    pub item: Vec<String>,
}

impl Cli {
    /// Parse process arguments; the help epilog lists the known networks
    pub fn parse_with_networks() -> Self {
        let epilog = format!(
            "Known networks codes:\n  {}",
            all_networks()
                .iter()
                .map(|n| format!("{} ({})", n.symbol, n.full_name()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let matches = Self::command().after_help(epilog).get_matches();
        match Self::from_arg_matches(&matches) {
            Ok(cli) => cli,
            Err(e) => e.exit(),
        }
    }

    /// Fields selected by -b, -w, -W and -a
    pub fn field_filter(&self) -> FieldFilter {
        let mut filter = FieldFilter::only(self.brief.iter().flatten().cloned());
        if self.wallet {
            filter.insert("wallet_key");
        } else if self.wif {
            filter.insert(if self.uncompressed { "wif_uncompressed" } else { "wif" });
        } else if self.address {
            filter.insert(if self.uncompressed {
                "address_uncompressed"
            } else {
                "address"
            });
        }
        filter
    }
}

/// Run against the process stdin/stdout/stderr
pub fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let items = if cli.item.is_empty() {
        read_stdin_items()?
    } else {
        cli.item.clone()
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    execute(
        cli,
        settings,
        KeyCreation::system(),
        &items,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

fn read_stdin_items() -> Result<Vec<String>> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.split_whitespace().map(str::to_string).collect())
}

/// Resolve, derive and render every item
///
/// Unparseable items are reported on `err` and skipped; any other error ends the run.
pub fn execute<O: Write, E: Write>(
    cli: &Cli,
    settings: &Settings,
    creation: KeyCreation,
    items: &[String],
    out: &mut O,
    err: &mut E,
) -> Result<()> {
    let requested = cli.network.as_deref().map(network_for_code).transpose()?;
    let override_network = cli
        .override_network
        .as_deref()
        .map(network_for_code)
        .transpose()?;
    let fallback = requested.unwrap_or(settings.default_network);

    let parser = KeyParser::new(fallback, creation)?;
    let path = SubkeyPath::parse(&cli.subkey)?;
    let filter = cli.field_filter();
    let format = OutputFormat::from_json_flag(cli.json);

    for item in items {
        let parsed = match parser.parse(item, requested) {
            Ok(parsed) => parsed,
            Err(e) if e.is_recoverable() => {
                writeln!(err, "{}", e)?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let network = override_network.or(parsed.network).unwrap_or(fallback);
        for subkey in parsed.key.subkeys(&path) {
            let subkey = subkey?;
            let key = if cli.public {
                subkey.key.public_copy()
            } else {
                subkey.key
            };
            let output =
                OutputAssembler::assemble(item, &key, subkey.path.as_deref(), network, &filter);
            writeln!(out, "{}", render(&output, format)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ku_cli::crypto::{EntropySource, U256};
    use ku_cli::domain::{DomainError, DomainResult, Key};
    use std::collections::BTreeMap;

    struct FixedEntropy;

    impl EntropySource for FixedEntropy {
        fn name(&self) -> &str {
            "fixed"
        }

        fn gather(&self) -> DomainResult<Vec<u8>> {
            Ok(vec![0x11; 64])
        }
    }

    fn settings() -> Settings {
        Settings::from_lookup(|_| None).unwrap()
    }

    fn run_with(args: &[&str]) -> (Result<()>, String, String) {
        let cli = Cli::try_parse_from(std::iter::once("ku").chain(args.iter().copied())).unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = execute(
            &cli,
            &settings(),
            KeyCreation::with_sources(vec![Box::new(FixedEntropy)]),
            &cli.item,
            &mut out,
            &mut err,
        );
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_address_flag_prints_bare_value() {
        let (result, out, err) = run_with(&["-a", "1"]);
        assert!(result.is_ok());
        assert_eq!(out, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH\n");
        assert!(err.is_empty());

        let (_, out, _) = run_with(&["-a", "-u", "1"]);
        assert_eq!(out, "1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm\n");
    }

    #[test]
    fn test_wallet_flag_wins_over_wif() {
        let cli = Cli::try_parse_from(["ku", "-w", "-W", "P:foo"]).unwrap();
        assert_eq!(cli.field_filter(), FieldFilter::only(["wallet_key"]));
    }

    #[test]
    fn test_unparseable_item_continues() {
        let (result, out, err) = run_with(&["-W", "nonsense", "1"]);
        assert!(result.is_ok());
        assert_eq!(err, "can't parse nonsense\n");
        assert_eq!(out, "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn\n");
    }

    #[test]
    fn test_invalid_pair_is_fatal() {
        let (result, out, _) = run_with(&["0,even", "1"]);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::InvalidPublicPair { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_subkey_range_renders_each_child() {
        let (result, out, _) = run_with(&["-w", "-P", "-s", "0H/0-2", "H:000102030405060708090a0b0c0d0e0f"]);
        assert!(result.is_ok());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "xpub6ASuArnXKPbfEVRpCesNx4P939HDXENHkksgxsVG1yNp9958A33qYoPiTN9QrJmWFa2jNLdK84bWmyqTSPGtApP8P7nHUYwxHPhqmzUyeFG",
                "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ",
                "xpub6ASuArnXKPbfJ2Kv67WdkNvmpS53K9vwrfPBJ58kCvEe8pbmKrMYFaeuwR3CDdoJzVzHpFzFNeVw4DSN8ESTQcJTsoWVdnR2xFFAQjftEkd",
            ]
        );
    }

    #[test]
    fn test_derivation_error_is_fatal() {
        let (result, _, _) = run_with(&["-s", "0", "1"]);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotHierarchical { .. })
        ));
    }

    #[test]
    fn test_override_network_changes_rendering() {
        let (_, out, _) = run_with(&["--override-network", "XTN", "-a", "1"]);
        assert_eq!(out, "mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r\n");
    }

    #[test]
    fn test_json_output_for_hash160() {
        let (result, out, _) = run_with(&["-j", "89abcdef89abcdef89abcdef89abcdef89abcdef"]);
        assert!(result.is_ok());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["address"], "1DYwPTp6PAnXhbaUeHgTXwYV4UNuN85ZJw");
        assert_eq!(value["network"], "Bitcoin mainnet");
        assert!(value.get("public_pair_x").is_none());
    }

    #[test]
    fn test_brief_human_and_json_agree() {
        let (result, human, _) = run_with(&["1", "-b", "symbol", "address", "wif"]);
        assert!(result.is_ok());
        let (result, json, _) = run_with(&["-j", "1", "-b", "symbol", "address", "wif"]);
        assert!(result.is_ok());

        // human rows carry labels; map them back to field keys
        let key = Key::from_secret_exponent(&U256::one()).unwrap();
        let assembled = OutputAssembler::assemble(
            "1",
            &key,
            None,
            network_for_code("BTC").unwrap(),
            &FieldFilter::only(["symbol", "address", "wif"]),
        );
        let key_for_label: BTreeMap<&str, &str> = assembled
            .fields()
            .iter()
            .map(|f| (f.label.as_str(), f.key.as_str()))
            .collect();

        let from_human: BTreeMap<String, String> = human
            .lines()
            .filter_map(|line| line.split_once(": "))
            .map(|(label, value)| {
                let key = key_for_label[label.trim_end()];
                (key.to_string(), value.to_string())
            })
            .collect();
        let from_json: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();

        assert_eq!(from_human.len(), 3);
        assert_eq!(from_human, from_json);
        assert_eq!(from_json["address"], "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
        assert_eq!(from_json["symbol"], "BTC");
    }

    #[test]
    fn test_create_yields_wallet_and_exponent() {
        let (result, out, _) = run_with(&["-j", "create"]);
        assert!(result.is_ok());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["wallet_key"].as_str().unwrap().starts_with("xprv"));
        assert!(!value["secret_exponent"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_network_is_fatal() {
        let (result, _, _) = run_with(&["-n", "ZZZ", "1"]);
        assert!(result.is_err());
    }
}
