//! Allocation accounts and manual redistribution weights

use crate::address::Address;
use crate::amount::Amount;
use crate::token::{RewardToken, TokenAmount};
use serde::{Deserialize, Serialize};

/// Whether an account earned its allocation or only received a transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountState {
    Active,
    Inactive,
}

/// A recipient in an allocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,

    /// What the account contributed (WETH compounded)
    pub contribution: TokenAmount,

    /// What the account receives
    pub reward: TokenAmount,

    pub state: AccountState,

    /// Human readable log of adjustments
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Account {
    /// An account that earned a share from its contribution
    pub fn active(address: Address, contribution: Amount, token: RewardToken) -> Self {
        Self {
            address,
            contribution: TokenAmount::weth(contribution),
            reward: token.amount(Amount::zero()),
            state: AccountState::Active,
            notes: Vec::new(),
        }
    }

    /// An account that exists only because of a manual transfer
    pub fn inactive(address: Address, reward: Amount, token: RewardToken) -> Self {
        Self {
            address,
            contribution: TokenAmount::weth(Amount::zero()),
            reward: token.amount(reward),
            state: AccountState::Inactive,
            notes: Vec::new(),
        }
    }
}

/// Redistribution policy. Only transfers exist today; burning or re-pooling
/// would be added here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RedistributionOption {
    Transfer,
}

/// Manual override supplied by configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedistributionWeight {
    pub address: Address,
    pub amount: Amount,
    #[serde(default = "default_option")]
    pub option: RedistributionOption,
}

fn default_option() -> RedistributionOption {
    RedistributionOption::Transfer
}

impl RedistributionWeight {
    pub fn transfer(address: Address, amount: Amount) -> Self {
        Self {
            address,
            amount,
            option: RedistributionOption::Transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_json() {
        let account = Account::active(
            Address::from_bytes([7; 20]),
            Amount::from(42u64),
            RewardToken::ARV,
        );
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["state"], "ACTIVE");
        assert_eq!(json["contribution"]["symbol"], "WETH");
        assert_eq!(json["contribution"]["amount"], "42");
        assert_eq!(json["reward"]["symbol"], "ARV");
        assert_eq!(json["reward"]["amount"], "0");
    }

    #[test]
    fn test_weight_defaults_to_transfer() {
        let w: RedistributionWeight = serde_json::from_str(
            r#"{"address": "0x3bCF3Db69897125Aa61496Fc8a8B55A5e3f245d5", "amount": "100"}"#,
        )
        .unwrap();
        assert_eq!(w.option, RedistributionOption::Transfer);
        assert_eq!(w.amount, Amount::from(100u64));
    }
}
