// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator permission scope over accounts.

use std::collections::BTreeSet;

use tracing::debug;

use parley_config::model::ScopeConfig;
use parley_core::Account;

/// Which accounts an operator may act as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorScope {
    All,
    /// Only accounts hosted on these instance addresses.
    Instances(BTreeSet<String>),
}

impl OperatorScope {
    pub fn from_config(config: &ScopeConfig) -> Self {
        if config.restrict_to_owned {
            OperatorScope::Instances(config.owned_instances.iter().cloned().collect())
        } else {
            OperatorScope::All
        }
    }

    pub fn permits(&self, account: &Account) -> bool {
        match self {
            OperatorScope::All => true,
            OperatorScope::Instances(owned) => owned.contains(&account.origin_ip),
        }
    }
}

/// Keep the accounts `scope` permits, in their original order.
pub fn filter_accounts(accounts: Vec<Account>, scope: &OperatorScope) -> Vec<Account> {
    let total = accounts.len();
    let kept: Vec<Account> = accounts
        .into_iter()
        .filter(|account| scope.permits(account))
        .collect();
    debug!(total, kept = kept.len(), "accounts filtered by operator scope");
    kept
}
