use anyhow::{anyhow, Result};
use bubble_primitives::keys;

use crate::cli::{KeyArgs, Row};

pub(crate) fn handle_key(args: KeyArgs) -> Result<()> {
    let key = derive_key(&args)?;
    println!("0x{}", hex::encode(key));

    Ok(())
}

fn derive_key(args: &KeyArgs) -> Result<Vec<u8>> {
    let missing = |flag: &str| anyhow!("--{flag} is required for the {:?} record", args.row);
    let bubble_id = || args.bubble_id.ok_or_else(|| missing("bubble-id"));
    let address = || args.address.ok_or_else(|| missing("address"));

    let key = match args.row {
        Row::Basics => keys::bubble_basics(&bubble_id()?),
        Row::Status => keys::bubble_status(&bubble_id()?),
        Row::AccList => keys::acc_list(&bubble_id()?),
        Row::AccAsset => keys::acc_asset(&bubble_id()?, &address()?),
        Row::L1Hash => {
            let hash = args.hash.ok_or_else(|| missing("hash"))?;
            keys::l1_hash_by_l2_hash(&bubble_id()?, &hash)
        }
        Row::TxList => {
            let tx_type = args.tx_type.ok_or_else(|| missing("tx-type"))?;
            keys::tx_hash_list(&bubble_id()?, tx_type)
        }
        Row::Contract => keys::bub_contract(&bubble_id()?, &address()?),
        Row::ByteCode => keys::byte_code(&bubble_id()?, &address()?),
        Row::SizeIndex => keys::bubbles_by_size(args.size.ok_or_else(|| missing("size"))?),
        Row::NodeBubble => keys::node_bubble(&args.node_id.ok_or_else(|| missing("node-id"))?),
        Row::Counter => keys::BUBBLE_COUNTER_KEY.to_vec(),
    };

    Ok(key)
}

#[cfg(test)]
mod tests {
    use primitive_types::U256;

    use super::*;

    fn args(row: Row) -> KeyArgs {
        KeyArgs {
            row,
            bubble_id: None,
            address: None,
            hash: None,
            tx_type: None,
            size: None,
            node_id: None,
        }
    }

    #[test]
    fn keys_need_their_selectors() {
        assert!(derive_key(&args(Row::Basics)).is_err());
        assert_eq!(
            derive_key(&args(Row::Counter)).unwrap(),
            keys::BUBBLE_COUNTER_KEY.to_vec()
        );

        let status = KeyArgs {
            bubble_id: Some(U256::from(7u64)),
            ..args(Row::Status)
        };
        assert_eq!(
            derive_key(&status).unwrap(),
            keys::bubble_status(&U256::from(7u64))
        );

        let asset_without_account = KeyArgs {
            bubble_id: Some(U256::one()),
            ..args(Row::AccAsset)
        };
        assert!(derive_key(&asset_without_account).is_err());
    }
}
