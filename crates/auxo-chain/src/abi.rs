//! Minimal ABI encoding for static-argument view calls

use crate::error::{ChainError, Result};
use auxo_core::Address;
use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// `isRewardsDelegate(address _user, address _delegate) returns (bool)`
pub const IS_REWARDS_DELEGATE: &str = "isRewardsDelegate(address,address)";

/// `isClaimed(uint256 _windowIndex, uint256 _accountIndex) returns (bool)`
pub const IS_CLAIMED: &str = "isClaimed(uint256,uint256)";

/// Static ABI argument
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
}

impl AbiValue {
    fn to_word(self) -> [u8; 32] {
        match self {
            Self::Address(addr) => addr.to_word(),
            Self::Uint(n) => {
                let mut word = [0u8; 32];
                n.to_big_endian(&mut word);
                word
            }
        }
    }
}

impl From<Address> for AbiValue {
    fn from(addr: Address) -> Self {
        Self::Address(addr)
    }
}

impl From<u64> for AbiValue {
    fn from(n: u64) -> Self {
        Self::Uint(U256::from(n))
    }
}

/// First four bytes of keccak256 of the canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Selector followed by one 32 byte word per argument
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&arg.to_word());
    }
    data
}

/// Decode a `bool` return value. Anything other than a single word holding
/// 0 or 1 is malformed, never `false`.
pub fn decode_bool(data: &[u8]) -> Result<bool> {
    if data.len() != 32 {
        return Err(ChainError::MalformedResponse(format!(
            "expected 32 byte bool word, got {} bytes",
            data.len()
        )));
    }
    if data[..31].iter().any(|b| *b != 0) {
        return Err(ChainError::MalformedResponse(format!(
            "bool word has high bits set: 0x{}",
            hex::encode(data)
        )));
    }
    match data[31] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ChainError::MalformedResponse(format!(
            "bool word has value {}",
            other
        ))),
    }
}

/// Parse `0x`-prefixed hex returned by `eth_call`
pub fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let stripped = value
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::MalformedResponse(format!("missing 0x prefix: {}", value)))?;
    hex::decode(stripped).map_err(|e| ChainError::MalformedResponse(e.to_string()))
}
