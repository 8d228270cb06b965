use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use bubble_params::BubbleParams;
use bubble_primitives::types::NodeId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::trace;

/// The local configuration of a simulated node.
///
/// Unlike the params, these values are not consensus-critical: they only decide which tasks this
/// node posts and where its records live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The node this instance runs as.
    pub(crate) local_node_id: NodeId,

    /// Gas available to every call.
    pub(crate) gas_limit: u64,

    /// The directory of the persistent store. Records are kept in memory when unset.
    pub(crate) datadir: Option<PathBuf>,
}

/// Reads and parses a TOML file into `T`.
pub(crate) fn parse_toml<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let parsed = toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    trace!(?parsed, "parsed toml");

    Ok(parsed)
}

/// Reads and validates the bubble params.
pub(crate) fn load_params(path: impl AsRef<Path>) -> Result<BubbleParams> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    BubbleParams::from_toml_str(&raw).with_context(|| format!("loading {}", path.display()))
}
