//! Single transfer cycle driven from task context

use crate::completion::{Cancel, Completion, Outcome, SyncError};
use crate::config::CycleConfig;
use crate::traits::{Rejected, Transfer, TransferEngine};

use super::pattern::{count_mismatches, fill_send};
use super::report::{CycleError, CycleReport};

/// Owns the buffers and the handoff for one worker
///
/// While a transfer is in flight the buffers live inside the engine and
/// `transfer()` returns `None`.
pub struct TransferCycle {
    completion: &'static Completion,
    transfer: Option<Transfer>,
    config: CycleConfig,
}

impl TransferCycle {
    /// Create a cycle over the given handoff and buffers
    pub fn new(
        completion: &'static Completion,
        tx: &'static mut [u8],
        rx: &'static mut [u8],
        config: CycleConfig,
    ) -> Result<Self, CycleError> {
        let transfer = Transfer::new(tx, rx, config.transfer_size, config.flags)?;
        Ok(Self {
            completion,
            transfer: Some(transfer),
            config,
        })
    }

    /// Cycle configuration
    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// The handoff this cycle waits on
    pub fn completion(&self) -> &'static Completion {
        self.completion
    }

    /// The buffers, unless they are lent to the engine
    pub fn transfer(&self) -> Option<&Transfer> {
        self.transfer.as_ref()
    }

    /// Fill the send buffer with this side's pattern and clear the
    /// receive buffer
    pub fn prepare(&mut self) -> Result<(), CycleError> {
        let role = self.config.role;
        let transfer = self.transfer.as_mut().ok_or(CycleError::BuffersInFlight)?;
        let (_, rx) = transfer.split_mut();
        rx.fill(0);
        fill_send(transfer.tx_mut(), role);
        Ok(())
    }

    /// Arm, start the transfer and wait for its outcome
    ///
    /// On success the buffers are back in the cycle. On `Timeout` they
    /// stay with the engine; see [`TransferCycle::recover`].
    pub async fn run_one_transfer_cycle<E: TransferEngine>(
        &mut self,
        engine: &mut E,
    ) -> Result<Outcome, CycleError> {
        let transfer = self.transfer.take().ok_or(CycleError::BuffersInFlight)?;

        if let Err(e) = self.completion.arm() {
            self.transfer = Some(transfer);
            return Err(e.into());
        }

        if let Err(Rejected { reason, transfer }) = engine.start(transfer, self.completion) {
            self.transfer = Some(transfer);
            self.completion.cancel();
            #[cfg(feature = "defmt")]
            defmt::warn!("transfer rejected: {}", reason);
            return Err(CycleError::Rejected(reason));
        }

        let outcome = self.completion.wait_for(self.config.timeout()).await?;

        // Engines hand the buffers back before they notify
        self.transfer = engine.reclaim();
        if self.transfer.is_none() {
            return Err(CycleError::BuffersInFlight);
        }

        Ok(outcome)
    }

    /// Compare the received bytes against the expected pattern
    pub fn verify(&self, outcome: Outcome) -> Result<CycleReport, CycleError> {
        let transfer = self.transfer.as_ref().ok_or(CycleError::BuffersInFlight)?;
        if let Outcome::Error(code) = outcome {
            return Err(CycleError::TransferError(code));
        }

        Ok(CycleReport {
            outcome,
            bytes: transfer.len(),
            mismatches: count_mismatches(transfer.rx(), self.config.role),
        })
    }

    /// Full pass: prepare, transfer, verify
    ///
    /// A transfer error is reported without comparing data; a mismatch
    /// after a successful transfer becomes [`CycleError::DataIntegrity`].
    pub async fn run<E: TransferEngine>(&mut self, engine: &mut E) -> Result<CycleReport, CycleError> {
        self.prepare()?;
        let outcome = self.run_one_transfer_cycle(engine).await?;
        let report = self.verify(outcome)?;

        if report.mismatches > 0 {
            return Err(CycleError::DataIntegrity {
                mismatches: report.mismatches,
            });
        }
        Ok(report)
    }

    /// Try to get the buffers back after a timeout
    ///
    /// Cancels the armed handoff. If the engine finished in the meantime
    /// its outcome is consumed and returned. Fails with `BuffersInFlight`
    /// while the engine still holds the buffers.
    pub async fn recover<E: TransferEngine>(
        &mut self,
        engine: &mut E,
    ) -> Result<Option<Outcome>, CycleError> {
        if self.transfer.is_some() {
            return Ok(None);
        }

        let late = match self.completion.cancel() {
            Cancel::TooLate(_) => Some(self.completion.wait().await?),
            // Consumes the cancellation so the handoff is idle again
            Cancel::Cancelled => match self.completion.wait().await {
                Err(SyncError::Cancelled) => None,
                result => Some(result?),
            },
            Cancel::Idle => None,
        };

        self.transfer = engine.reclaim();
        if self.transfer.is_none() {
            return Err(CycleError::BuffersInFlight);
        }
        Ok(late)
    }
}
