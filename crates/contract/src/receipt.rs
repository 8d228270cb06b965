//! The results handed back to the host.
//!
//! A transaction returns the decimal business code as its output and emits one log from the
//! contract address. The log's only topic is the selector and its data is the RLP list
//! `[code, fields...]`. A query returns `{"Code": .., "Ret": ..}` as JSON.

use bubble_primitives::{host::Log, types::Address};
use primitive_types::H256;
use rlp::{Encodable, RlpStream};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    dispatch::Selector,
    errors::{BubbleError, FatalError, SUCCESS_CODE},
};

/// The outcome of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    selector: Selector,
    code: u32,
    fields: Vec<Vec<u8>>,
}

impl TxReceipt {
    /// A successful outcome with no fields yet.
    pub const fn success(selector: Selector) -> Self {
        Self {
            selector,
            code: SUCCESS_CODE,
            fields: Vec::new(),
        }
    }

    /// A failed outcome carrying the error message.
    pub fn failure(selector: Selector, err: &BubbleError) -> Self {
        Self {
            selector,
            code: err.code(),
            fields: vec![rlp::encode(&err.to_string()).to_vec()],
        }
    }

    /// Appends a field to the log data.
    pub fn with<T: Encodable>(mut self, field: &T) -> Self {
        self.fields.push(rlp::encode(field).to_vec());
        self
    }

    /// The business code.
    pub const fn code(&self) -> u32 {
        self.code
    }

    /// The log emitted from `contract`.
    pub fn log(&self, contract: Address) -> Log {
        let mut data = RlpStream::new_list(self.fields.len() + 1);
        data.append(&self.code);
        for field in &self.fields {
            data.append_raw(field, 1);
        }

        Log {
            address: contract,
            topics: vec![H256::from_low_u64_be(self.selector as u64)],
            data: data.out().to_vec(),
        }
    }

    /// The output of the transaction: the code as a decimal string.
    pub fn output(&self) -> Vec<u8> {
        self.code.to_string().into_bytes()
    }
}

/// The outcome of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResult {
    /// The business code.
    pub code: u32,
    /// The requested value, or the error message on failure.
    pub ret: Value,
}

impl QueryResult {
    /// A successful query returning `ret`.
    pub fn success<T: Serialize>(ret: &T) -> Result<Self, FatalError> {
        Ok(Self {
            code: SUCCESS_CODE,
            ret: serde_json::to_value(ret).map_err(|e| FatalError::Encode(e.to_string()))?,
        })
    }

    /// A failed query.
    pub fn failure(err: &BubbleError) -> Self {
        Self {
            code: err.code(),
            ret: Value::String(err.to_string()),
        }
    }

    /// The JSON encoding returned to the host.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FatalError> {
        serde_json::to_vec(self).map_err(|e| FatalError::Encode(e.to_string()))
    }
}
