use std::fs;

use anyhow::{anyhow, Context, Result};
use bubble_contract::BubbleCall;
use tracing::debug;

use crate::cli::{DecodeArgs, EncodeArgs};

pub(crate) fn handle_encode(args: EncodeArgs) -> Result<()> {
    let raw = match (args.call, args.file) {
        (Some(call), _) => call,
        (None, Some(path)) => {
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, None) => return Err(anyhow!("either --call or --file is required")),
    };

    let call: BubbleCall = serde_json::from_str(&raw).context("parsing the call")?;
    debug!(selector = %call.selector(), "encoding call");

    println!("0x{}", hex::encode(call.encode()));

    Ok(())
}

pub(crate) fn handle_decode(args: DecodeArgs) -> Result<()> {
    let input = hex::decode(args.input.trim().trim_start_matches("0x")).context("decoding hex")?;
    let call = BubbleCall::decode(&input)?;

    println!("{}", serde_json::to_string_pretty(&call)?);

    Ok(())
}
