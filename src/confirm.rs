//! Waiting for transactions to reach a confirmation depth

use crate::client::{ChainClient, ClientResult, Receipt, TxHash};
use log::debug;
use std::time::{Duration, Instant};

/// How long and how deep to wait for a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Blocks that must include or follow the transaction's block
    pub confirmations: u64,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: 1,
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(300),
        }
    }
}

impl ConfirmationPolicy {
    #[must_use]
    pub const fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Poll without sleeping and give up after `timeout` (for tests and automining nodes)
    #[must_use]
    pub const fn immediate(timeout: Duration) -> Self {
        Self {
            confirmations: 1,
            poll_interval: Duration::ZERO,
            timeout,
        }
    }
}

/// Why a transaction did not reach the required depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationFailure {
    /// Mined with a failed status
    Reverted(Receipt),
    /// Still pending or too shallow when the policy timed out
    TimedOut { waited: Duration },
}

/// Terminal result of waiting on a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed(Receipt),
    Failed(ConfirmationFailure),
}

/// Lifecycle of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxState {
    Submitted,
    /// Known to the caller; `included_in` is set once a receipt appears
    Pending { included_in: Option<u64> },
    Confirmed(Receipt),
    Failed(ConfirmationFailure),
}

impl TxState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed(_) | Self::Failed(_))
    }
}

/// A submitted transaction being driven to a terminal state
#[derive(Debug)]
pub struct PendingTransaction {
    hash: TxHash,
    confirmations: u64,
    state: TxState,
}

impl PendingTransaction {
    #[must_use]
    pub const fn new(hash: TxHash, confirmations: u64) -> Self {
        Self {
            hash,
            confirmations,
            state: TxState::Submitted,
        }
    }

    #[must_use]
    pub const fn hash(&self) -> &TxHash {
        &self.hash
    }

    #[must_use]
    pub const fn state(&self) -> &TxState {
        &self.state
    }

    /// Query the node once and advance the state
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be queried; the state is unchanged.
    pub fn poll<C: ChainClient + ?Sized>(&mut self, client: &C) -> ClientResult<&TxState> {
        if self.state.is_terminal() {
            return Ok(&self.state);
        }
        let next = match client.transaction_receipt(&self.hash)? {
            None => TxState::Pending { included_in: None },
            Some(receipt) if !receipt.status => {
                TxState::Failed(ConfirmationFailure::Reverted(receipt))
            }
            Some(receipt) => {
                let latest = client.block_number()?;
                let depth = latest.saturating_sub(receipt.block_number) + 1;
                debug!(
                    "{} included in block {} ({depth}/{} confirmations)",
                    self.hash, receipt.block_number, self.confirmations
                );
                if depth >= self.confirmations {
                    TxState::Confirmed(receipt)
                } else {
                    TxState::Pending {
                        included_in: Some(receipt.block_number),
                    }
                }
            }
        };
        self.state = next;
        Ok(&self.state)
    }

    /// Poll until confirmed, reverted or timed out
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be queried.
    pub fn wait<C: ChainClient + ?Sized>(
        mut self,
        client: &C,
        policy: &ConfirmationPolicy,
    ) -> ClientResult<Confirmation> {
        let started = Instant::now();
        loop {
            match self.poll(client)? {
                TxState::Confirmed(receipt) => return Ok(Confirmation::Confirmed(receipt.clone())),
                TxState::Failed(failure) => return Ok(Confirmation::Failed(failure.clone())),
                TxState::Submitted | TxState::Pending { .. } => {}
            }
            let waited = started.elapsed();
            if waited >= policy.timeout {
                debug!("{} not confirmed after {waited:?}", self.hash);
                self.state = TxState::Failed(ConfirmationFailure::TimedOut { waited });
                return Ok(Confirmation::Failed(ConfirmationFailure::TimedOut { waited }));
            }
            std::thread::sleep(policy.poll_interval);
        }
    }
}

/// Wait for `hash` to reach `policy.confirmations`
///
/// # Errors
///
/// Returns an error if the node cannot be queried.
pub fn wait_for_confirmations<C: ChainClient + ?Sized>(
    client: &C,
    hash: TxHash,
    policy: &ConfirmationPolicy,
) -> ClientResult<Confirmation> {
    PendingTransaction::new(hash, policy.confirmations).wait(client, policy)
}
