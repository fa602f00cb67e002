//! Token descriptors
//!
//! The compounding flow only ever deals with three tokens: WETH, the reward
//! that stakers earned and delegated for compounding, and the two Auxo
//! derivatives it is compounded into. Reward math is written once against a
//! [`TokenAmount`] tagged with its [`Token`], never per token.

use crate::amount::{Amount, DECIMALS};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Any token that appears in compounding artifacts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Token {
    WETH,
    ARV,
    PRV,
}

impl Token {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::WETH => "WETH",
            Self::ARV => "ARV",
            Self::PRV => "PRV",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Reward-bearing Auxo derivative that rewards are compounded into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RewardToken {
    /// Active Reward Vault: locked governance token, topped up in one batched call
    ARV,
    /// Passive Reward Vault: liquid token, staked per recipient via the roll staker
    PRV,
}

impl RewardToken {
    pub const ALL: [RewardToken; 2] = [RewardToken::ARV, RewardToken::PRV];

    pub fn symbol(&self) -> &'static str {
        Token::from(*self).symbol()
    }

    /// Tag an amount with this token
    pub fn amount(&self, amount: Amount) -> TokenAmount {
        TokenAmount::new(Token::from(*self), amount)
    }
}

impl From<RewardToken> for Token {
    fn from(token: RewardToken) -> Self {
        match token {
            RewardToken::ARV => Token::ARV,
            RewardToken::PRV => Token::PRV,
        }
    }
}

impl fmt::Display for RewardToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for RewardToken {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ARV" => Ok(Self::ARV),
            "PRV" => Ok(Self::PRV),
            _ => Err(CoreError::UnknownToken(s.to_string())),
        }
    }
}

/// An amount tagged with the token it is denominated in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub symbol: Token,
    pub amount: Amount,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    DECIMALS
}

impl TokenAmount {
    pub fn new(symbol: Token, amount: Amount) -> Self {
        Self {
            symbol,
            amount,
            decimals: DECIMALS,
        }
    }

    pub fn weth(amount: Amount) -> Self {
        Self::new(Token::WETH, amount)
    }
}
