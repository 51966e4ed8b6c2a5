//! Financier funding dashboard service.
//!
//! Funding pays the chosen applicant on-chain and only then marks the
//! scholarship completed. One funding slot is shared by the whole process:
//! while a payment is outstanding every other `fund` call is refused.
//!
//! Every broadcast payment is written to an outstanding ledger before the
//! service waits for it. A payment that was submitted but not confirmed in
//! time is re-polled by the next `fund`; one that confirmed but whose status
//! update failed is committed by the next `fund`. Neither path pays again.
//! Only a reverted transaction leaves the ledger without being committed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::board::{ScholarshipBoard, map_application_error};
use super::ports::{
    ApplicationQuery, ApplicationRepository, FinancierFunding, FinancierOverview, FundingReceipt,
    ScholarshipRepository, WalletError, WalletProvider,
};
use super::{
    Application, ApplicationId, ApplicationStatus, Error, ErrorCode, Notification,
    ScholarshipId, ScholarshipStatus, TransferRequest, TxHash, apply_gas_buffer, select_payee,
};

/// Title attached to every funding failure.
pub const FUNDING_ERROR_TITLE: &str = "Error processing funding";

/// Message returned when no wallet provider is configured.
pub const WALLET_MISSING_MESSAGE: &str =
    "Wallet not found: please install a browser wallet to process payments";

/// Message returned when no application exists for the scholarship.
pub const NO_APPLICATION_MESSAGE: &str = "No application found for this scholarship";

/// Message returned while another payment holds the funding slot.
pub const FUNDING_BUSY_MESSAGE: &str = "Funding already in progress";

fn map_wallet_error(error: WalletError) -> Error {
    match error {
        WalletError::Unavailable { message } => {
            Error::service_unavailable(format!("wallet unavailable: {message}"))
        }
        WalletError::Timeout { tx_hash } => Error::service_unavailable(format!(
            "transaction {tx_hash} was not confirmed in time"
        )),
        WalletError::Rejected { message } => {
            Error::conflict(format!("wallet rejected the payment: {message}"))
        }
        WalletError::Reverted { tx_hash } => {
            Error::conflict(format!("transaction {tx_hash} reverted"))
        }
        WalletError::Transport { message } => {
            Error::internal(format!("wallet returned an invalid response: {message}"))
        }
    }
}

fn funding_error(err: Error) -> Error {
    let code = err.code();
    Notification::destructive(FUNDING_ERROR_TITLE, err.message()).into_error(code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentStage {
    /// Broadcast, receipt not seen yet.
    Submitted,
    /// Mined successfully, scholarship not yet marked completed.
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OutstandingPayment {
    application_id: ApplicationId,
    tx_hash: TxHash,
    stage: PaymentStage,
}

/// Holds the shared funding slot until dropped.
struct FundingPermit<'a> {
    slot: &'a Mutex<Option<ScholarshipId>>,
}

impl<'a> FundingPermit<'a> {
    fn acquire(
        slot: &'a Mutex<Option<ScholarshipId>>,
        scholarship_id: ScholarshipId,
    ) -> Result<Self, Error> {
        let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(busy) = *current {
            warn!(
                scholarship_id = %scholarship_id,
                in_progress = %busy,
                "funding refused while another payment is outstanding"
            );
            return Err(Error::conflict(FUNDING_BUSY_MESSAGE));
        }
        *current = Some(scholarship_id);
        Ok(Self { slot })
    }
}

impl Drop for FundingPermit<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Financier dashboard backed by the shared board and a wallet provider.
pub struct FinancierDashboardService<S, A> {
    board: Arc<ScholarshipBoard<S, A>>,
    application_repo: Arc<A>,
    wallet: Option<Arc<dyn WalletProvider>>,
    in_progress: Mutex<Option<ScholarshipId>>,
    outstanding: Mutex<HashMap<ScholarshipId, OutstandingPayment>>,
}

impl<S, A> FinancierDashboardService<S, A> {
    /// Create the service. `wallet` is `None` when no provider is configured.
    pub fn new(
        board: Arc<ScholarshipBoard<S, A>>,
        application_repo: Arc<A>,
        wallet: Option<Arc<dyn WalletProvider>>,
    ) -> Self {
        Self {
            board,
            application_repo,
            wallet,
            in_progress: Mutex::new(None),
            outstanding: Mutex::new(HashMap::new()),
        }
    }

    fn funding_in_progress(&self) -> Option<ScholarshipId> {
        *self.in_progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn outstanding_for(&self, scholarship_id: &ScholarshipId) -> Option<OutstandingPayment> {
        self.outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scholarship_id)
            .cloned()
    }

    fn record(&self, scholarship_id: ScholarshipId, payment: OutstandingPayment) {
        self.outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scholarship_id, payment);
    }

    fn settle(&self, scholarship_id: &ScholarshipId) {
        self.outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(scholarship_id);
    }
}

impl<S, A> FinancierDashboardService<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    async fn choose_payee(&self, scholarship_id: ScholarshipId) -> Result<Application, Error> {
        let query = ApplicationQuery::for_scholarship(scholarship_id);
        let approved = self
            .application_repo
            .find(&query.with_status(ApplicationStatus::Approved))
            .await
            .map_err(map_application_error)?;
        let fallback = if approved.is_empty() {
            self.application_repo
                .find(&query.with_limit(1))
                .await
                .map_err(map_application_error)?
        } else {
            Vec::new()
        };
        if approved.is_empty() && !fallback.is_empty() {
            warn!(
                scholarship_id = %scholarship_id,
                "no approved application; paying the earliest applicant"
            );
        }
        select_payee(&approved, &fallback)
            .cloned()
            .ok_or_else(|| Error::not_found(NO_APPLICATION_MESSAGE))
    }

    fn wallet(&self) -> Result<&dyn WalletProvider, Error> {
        self.wallet
            .as_deref()
            .ok_or_else(|| Error::precondition_failed(WALLET_MISSING_MESSAGE))
    }

    /// Wait for a recorded payment's receipt.
    ///
    /// A confirmed payment is re-recorded as [`PaymentStage::Confirmed`]. A
    /// reverted one is dropped from the ledger. Any other failure keeps the
    /// payment as submitted so a later `fund` polls the same hash.
    async fn confirm(
        &self,
        wallet: &dyn WalletProvider,
        scholarship_id: ScholarshipId,
        payment: OutstandingPayment,
    ) -> Result<OutstandingPayment, Error> {
        let receipt = match wallet.wait_for_confirmation(&payment.tx_hash).await {
            Ok(receipt) => receipt,
            Err(err @ WalletError::Reverted { .. }) => {
                self.settle(&scholarship_id);
                return Err(map_wallet_error(err));
            }
            Err(err) => {
                warn!(
                    scholarship_id = %scholarship_id,
                    tx_hash = %payment.tx_hash,
                    error = %err,
                    "payment submitted but not confirmed; kept for the next attempt"
                );
                let mapped = map_wallet_error(err);
                return Err(Error::new(
                    mapped.code(),
                    format!(
                        "{}; retry to check it again without paying twice",
                        mapped.message()
                    ),
                ));
            }
        };
        if !receipt.success {
            self.settle(&scholarship_id);
            return Err(map_wallet_error(WalletError::reverted(
                receipt.tx_hash.to_string(),
            )));
        }

        let confirmed = OutstandingPayment {
            tx_hash: receipt.tx_hash,
            stage: PaymentStage::Confirmed,
            ..payment
        };
        self.record(scholarship_id, confirmed.clone());
        Ok(confirmed)
    }

    async fn commit(
        &self,
        scholarship_id: ScholarshipId,
        payment: OutstandingPayment,
    ) -> Result<TxHash, Error> {
        match self
            .board
            .fund_scholarship(scholarship_id, payment.application_id)
            .await
        {
            Ok(()) => {
                self.settle(&scholarship_id);
                Ok(payment.tx_hash)
            }
            Err(err) => {
                error!(
                    scholarship_id = %scholarship_id,
                    tx_hash = %payment.tx_hash,
                    error = %err,
                    "payment confirmed but status update failed"
                );
                Err(Error::new(
                    err.code(),
                    format!(
                        "payment {} confirmed but the scholarship could not be marked funded ({}); retry to record it",
                        payment.tx_hash,
                        err.message()
                    ),
                ))
            }
        }
    }

    async fn resume(
        &self,
        scholarship_id: ScholarshipId,
        payment: OutstandingPayment,
    ) -> Result<TxHash, Error> {
        info!(
            scholarship_id = %scholarship_id,
            tx_hash = %payment.tx_hash,
            stage = ?payment.stage,
            "resuming outstanding payment"
        );
        let payment = match payment.stage {
            PaymentStage::Confirmed => payment,
            PaymentStage::Submitted => {
                let wallet = self.wallet()?;
                self.confirm(wallet, scholarship_id, payment).await?
            }
        };
        self.commit(scholarship_id, payment).await
    }

    async fn pay(&self, scholarship_id: ScholarshipId) -> Result<FundingReceipt, Error> {
        if let Some(payment) = self.outstanding_for(&scholarship_id) {
            let tx_hash = self.resume(scholarship_id, payment).await?;
            return Ok(FundingReceipt {
                scholarship_id,
                notification: Notification::success(
                    "Payment recorded",
                    format!("Confirmed payment {tx_hash} was recorded"),
                ),
                tx_hash,
            });
        }

        let payee = self.choose_payee(scholarship_id).await?;
        let wallet = self.wallet()?;
        let scholarship = self
            .board
            .find(&scholarship_id)
            .await
            .ok_or_else(|| Error::not_found("Scholarship not found"))?;
        if scholarship.status != ScholarshipStatus::Approved {
            return Err(Error::conflict(format!(
                "scholarship is {} and cannot be funded",
                scholarship.status
            )));
        }

        let request = TransferRequest {
            to: payee.applicant_address.clone(),
            value: scholarship.amount,
        };
        let estimate = wallet
            .estimate_gas(&request)
            .await
            .map_err(map_wallet_error)?;
        let gas_limit = apply_gas_buffer(estimate);
        let tx_hash = wallet
            .send_transaction(&request, gas_limit)
            .await
            .map_err(map_wallet_error)?;
        info!(
            scholarship_id = %scholarship_id,
            applicant = %payee.applicant_address,
            tx_hash = %tx_hash,
            gas_limit,
            "payment submitted"
        );
        let submitted = OutstandingPayment {
            application_id: payee.id,
            tx_hash,
            stage: PaymentStage::Submitted,
        };
        self.record(scholarship_id, submitted.clone());

        let confirmed = self.confirm(wallet, scholarship_id, submitted).await?;
        let tx_hash = self.commit(scholarship_id, confirmed).await?;
        Ok(FundingReceipt {
            scholarship_id,
            tx_hash,
            notification: Notification::success(
                "Payment successful",
                format!(
                    "{} EDU sent to student successfully",
                    scholarship.amount.to_fixed(3)
                ),
            ),
        })
    }
}

#[async_trait]
impl<S, A> FinancierFunding for FinancierDashboardService<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    async fn overview(&self) -> Result<FinancierOverview, Error> {
        let scholarships = self.board.scholarships().await;
        let (awaiting, history): (Vec<_>, Vec<_>) = scholarships
            .into_iter()
            .filter(|s| {
                matches!(
                    s.status,
                    ScholarshipStatus::Approved | ScholarshipStatus::Completed
                )
            })
            .partition(|s| s.status == ScholarshipStatus::Approved);
        Ok(FinancierOverview {
            funded_count: history.len(),
            total_funded: history.iter().map(|s| s.amount).sum(),
            awaiting,
            history,
            funding_in_progress: self.funding_in_progress(),
            loading: self.board.loading(),
        })
    }

    async fn fund(&self, scholarship_id: ScholarshipId) -> Result<FundingReceipt, Error> {
        if self.board.loading() {
            return Err(funding_error(Error::new(
                ErrorCode::Conflict,
                "Scholarships are still loading; try again shortly",
            )));
        }
        let _permit = FundingPermit::acquire(&self.in_progress, scholarship_id)
            .map_err(funding_error)?;
        self.pay(scholarship_id).await.map_err(|err| {
            warn!(scholarship_id = %scholarship_id, error = %err, "funding failed");
            funding_error(err)
        })
    }
}

#[cfg(test)]
#[path = "financier_dashboard_tests.rs"]
mod tests;
