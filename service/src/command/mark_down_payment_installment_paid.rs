//! [`Command`] for marking a [`down_payment::Installment`] as paid.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::sale::commission;
use crate::{
    domain::{
        sale::{self, down_payment, PaymentError},
        Sale,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`down_payment::Installment`] as paid.
///
/// Schedules the linked [`commission::Installment`] in the same transaction.
/// Marking an already paid [`down_payment::Installment`] changes nothing.
#[derive(Clone, Copy, Debug)]
pub struct MarkDownPaymentInstallmentPaid {
    /// ID of the [`down_payment::Installment`] to be marked as paid.
    pub installment_id: down_payment::Id,

    /// [`down_payment::PaymentDate`] of the [`down_payment::Installment`].
    ///
    /// [`Service::today()`] if [`None`].
    pub paid_on: Option<down_payment::PaymentDate>,
}

impl<Db> Command<MarkDownPaymentInstallmentPaid> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<sale::Id>, down_payment::Id>>,
            Ok = Option<sale::Id>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<Sale, sale::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Sale>, sale::Id>>,
            Ok = Option<Sale>,
            Err = Traced<database::Error>,
        > + Database<Update<Sale>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Sale;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkDownPaymentInstallmentPaid,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkDownPaymentInstallmentPaid {
            installment_id,
            paid_on,
        } = cmd;
        let paid_on = paid_on.unwrap_or_else(|| self.today().coerce());

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let sale_id = tx
            .execute(Select(By::<Option<sale::Id>, _>::new(installment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InstallmentNotExists(installment_id))
            .map_err(tracerr::wrap!())?;

        // Down payment and commission installments change together.
        tx.execute(Lock(By::new(sale_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut sale = tx
            .execute(Select(By::<Option<Sale>, _>::new(sale_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InstallmentNotExists(installment_id))
            .map_err(tracerr::wrap!())?;

        let changed = sale
            .mark_down_payment_installment_paid(installment_id, paid_on)
            .map_err(|e| match e {
                PaymentError::DueDateOutOfRange => E::DueDateOutOfRange,
                PaymentError::CommissionNotDue(_)
                | PaymentError::CommissionInstallmentNotExists(_)
                | PaymentError::DownPaymentInstallmentNotExists(_) => {
                    E::InstallmentNotExists(installment_id)
                }
            })
            .map_err(tracerr::wrap!())?;
        if !changed {
            log::debug!(
                "`down_payment::Installment(id: {installment_id})` is paid \
                 already",
            );
            return Ok(sale);
        }

        tx.execute(Update(sale.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`down_payment::Installment(id: {installment_id})` of \
             `Sale(id: {sale_id})` paid on {paid_on}",
        );
        if let Some(due_on) = sale
            .linked_commission_installment(installment_id)
            .filter(|i| !i.is_paid())
            .and_then(|i| i.due_on)
        {
            log::info!(
                "commission of `Sale(id: {sale_id})` scheduled on {due_on}",
            );
        }

        Ok(sale)
    }
}

/// Error of [`MarkDownPaymentInstallmentPaid`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Commission due date overflows the calendar.
    #[display("commission due date is out of range")]
    DueDateOutOfRange,

    /// [`down_payment::Installment`] with the provided ID does not exist.
    #[display("`down_payment::Installment(id: {_0})` does not exist")]
    InstallmentNotExists(#[error(not(source))] down_payment::Id),
}
