//! Manual redistribution overlay
//!
//! Transfers are top-ups on top of the pro-rata result. They never take from
//! other accounts, so the pro-rata shares stay independent of overrides.

use crate::error::{RewardError, Result};
use auxo_core::{Account, Address, Amount, RedistributionOption, RedistributionWeight, RewardToken};
use serde::{Deserialize, Serialize};

/// One applied override, in application order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub address: Address,
    pub amount: Amount,
    pub reason: RedistributionOption,
    /// The target had no allocation and an INACTIVE account was created
    pub created_account: bool,
}

/// Apply `weights` to a copy of `accounts`.
///
/// Returns the adjusted accounts and the ordered adjustment log. The input
/// slice is left untouched so the pre-redistribution allocation can be
/// audited.
pub fn apply_redistributions(
    accounts: &[Account],
    weights: &[RedistributionWeight],
    token: RewardToken,
) -> Result<(Vec<Account>, Vec<Adjustment>)> {
    let mut adjusted = accounts.to_vec();
    let mut log = Vec::with_capacity(weights.len());

    for weight in weights {
        if weight.amount.is_zero() {
            return Err(RewardError::ZeroTransfer(weight.address));
        }

        match weight.option {
            RedistributionOption::Transfer => {
                let created = transfer(&mut adjusted, weight.address, weight.amount, token)?;
                tracing::debug!(
                    "Transfer of {} {} to {}{}",
                    weight.amount,
                    token,
                    weight.address,
                    if created { " (new account)" } else { "" }
                );
                log.push(Adjustment {
                    address: weight.address,
                    amount: weight.amount,
                    reason: weight.option,
                    created_account: created,
                });
            }
        }
    }

    Ok((adjusted, log))
}

/// Returns true if a new account had to be created
fn transfer(
    accounts: &mut Vec<Account>,
    address: Address,
    amount: Amount,
    token: RewardToken,
) -> Result<bool> {
    if let Some(existing) = accounts.iter_mut().find(|a| a.address == address) {
        existing.reward.amount = existing.reward.amount.checked_add(amount)?;
        existing
            .notes
            .push(format!("Transfer of {} {} added to allocation", amount, token));
        return Ok(false);
    }

    let mut account = Account::inactive(address, amount, token);
    account
        .notes
        .push(format!("Manual transfer of {} {}", amount, token));
    accounts.push(account);
    Ok(true)
}
