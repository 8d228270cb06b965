use std::path::PathBuf;

use bubble_primitives::{
    bubble::BubTxType,
    types::{Address, BubbleId, NodeId, SizeCode, TxHash},
};
use clap::{Parser, Subcommand, ValueEnum};
use primitive_types::U256;

#[derive(Parser)]
#[command(
    name = "bubble-cli",
    about = "Developer tooling for the bubble contract",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    Key(KeyArgs),

    Encode(EncodeArgs),

    Decode(DecodeArgs),

    Simulate(SimulateArgs),
}

/// The records of the bubble store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Row {
    Basics,
    Status,
    AccList,
    AccAsset,
    L1Hash,
    TxList,
    Contract,
    ByteCode,
    SizeIndex,
    NodeBubble,
    Counter,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Print the storage key of a bubble record", version)]
pub(crate) struct KeyArgs {
    #[arg(value_enum, help = "the record to derive the key of")]
    pub(crate) row: Row,

    #[arg(long, value_parser = parse_bubble_id, help = "the bubble id, in decimal")]
    pub(crate) bubble_id: Option<BubbleId>,

    #[arg(long, value_parser = parse_address, help = "the account or contract address")]
    pub(crate) address: Option<Address>,

    #[arg(long, value_parser = parse_hash, help = "the sub-ledger settlement hash")]
    pub(crate) hash: Option<TxHash>,

    #[arg(long, value_parser = parse_tx_type, help = "the history type (0: stake, 1: withdraw, 2: settle)")]
    pub(crate) tx_type: Option<BubTxType>,

    #[arg(long, help = "the size class")]
    pub(crate) size: Option<SizeCode>,

    #[arg(long, value_parser = parse_node_id, help = "the node id")]
    pub(crate) node_id: Option<NodeId>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Encode a JSON call into contract input", version)]
pub(crate) struct EncodeArgs {
    #[arg(
        long,
        conflicts_with = "file",
        required_unless_present = "file",
        help = "the call as JSON, e.g. '{\"method\":\"allotBubble\",\"sizeCode\":1}'"
    )]
    pub(crate) call: Option<String>,

    #[arg(long, help = "a file containing the call as JSON")]
    pub(crate) file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Decode contract input into a JSON call", version)]
pub(crate) struct DecodeArgs {
    #[arg(help = "the hex-encoded input")]
    pub(crate) input: String,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Run a scenario of calls against an emulated ledger", version)]
pub(crate) struct SimulateArgs {
    #[arg(
        long,
        short = 'p',
        help = "the file containing the bubble params",
        default_value = "params.toml"
    )]
    pub(crate) params: PathBuf,

    #[arg(
        long,
        short = 'c',
        help = "the file containing the node configuration",
        default_value = "config.toml"
    )]
    pub(crate) config: PathBuf,

    #[arg(help = "the scenario file")]
    pub(crate) scenario: PathBuf,
}

fn decode_hex(raw: &str, len: usize) -> Result<Vec<u8>, String> {
    let bytes = hex::decode(raw.trim_start_matches("0x")).map_err(|e| e.to_string())?;
    if bytes.len() != len {
        return Err(format!("expected {len} bytes, got {}", bytes.len()));
    }

    Ok(bytes)
}

fn parse_bubble_id(raw: &str) -> Result<BubbleId, String> {
    U256::from_dec_str(raw).map_err(|e| format!("{e:?}"))
}

fn parse_address(raw: &str) -> Result<Address, String> {
    decode_hex(raw, 20).map(|bytes| Address::from_slice(&bytes))
}

fn parse_hash(raw: &str) -> Result<TxHash, String> {
    decode_hex(raw, 32).map(|bytes| TxHash::from_slice(&bytes))
}

fn parse_node_id(raw: &str) -> Result<NodeId, String> {
    decode_hex(raw, 64).map(|bytes| NodeId::from_slice(&bytes))
}

fn parse_tx_type(raw: &str) -> Result<BubTxType, String> {
    let tag: u8 = raw.parse().map_err(|e| format!("{e}"))?;
    BubTxType::try_from(tag).map_err(|tag| format!("unknown history type {tag}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_arguments() {
        assert_eq!(
            parse_address("0x00000000000000000000000000000000000000ff"),
            Ok(Address::from_low_u64_be(0xff))
        );
        assert!(parse_address("0xff").is_err());
        assert!(parse_hash("zz").is_err());
        assert_eq!(parse_bubble_id("42"), Ok(U256::from(42u64)));
        assert_eq!(parse_tx_type("2"), Ok(BubTxType::SettleBubble));
        assert!(parse_tx_type("9").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "bubble-cli",
            "key",
            "acc-asset",
            "--bubble-id",
            "1",
            "--address",
            "0x00000000000000000000000000000000000000aa",
        ])
        .unwrap();

        let Commands::Key(args) = cli.command else {
            panic!("expected the key subcommand");
        };
        assert_eq!(args.row, Row::AccAsset);
        assert_eq!(args.bubble_id, Some(U256::one()));
    }
}
