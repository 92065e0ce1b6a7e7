//! [`Command`] for marking a [`commission::Installment`] as paid.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        sale::{self, commission, PaymentError},
        Sale,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`commission::Installment`] as paid.
///
/// Marking an already paid [`commission::Installment`] changes nothing.
#[derive(Clone, Copy, Debug)]
pub struct MarkCommissionInstallmentPaid {
    /// ID of the [`commission::Installment`] to be marked as paid.
    pub installment_id: commission::Id,

    /// [`commission::PaymentDate`] of the [`commission::Installment`].
    ///
    /// [`Service::today()`] if [`None`].
    pub paid_on: Option<commission::PaymentDate>,
}

impl<Db> Command<MarkCommissionInstallmentPaid> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<sale::Id>, commission::Id>>,
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
        cmd: MarkCommissionInstallmentPaid,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkCommissionInstallmentPaid {
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
            .mark_commission_installment_paid(installment_id, paid_on)
            .map_err(|e| match e {
                PaymentError::CommissionNotDue(id) => E::NotDue(id),
                PaymentError::CommissionInstallmentNotExists(_)
                | PaymentError::DownPaymentInstallmentNotExists(_)
                | PaymentError::DueDateOutOfRange => {
                    E::InstallmentNotExists(installment_id)
                }
            })
            .map_err(tracerr::wrap!())?;
        if !changed {
            log::debug!(
                "`commission::Installment(id: {installment_id})` is paid \
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
            "`commission::Installment(id: {installment_id})` of \
             `Sale(id: {sale_id})` paid on {paid_on}",
        );

        Ok(sale)
    }
}

/// Error of [`MarkCommissionInstallmentPaid`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`commission::Installment`] with the provided ID does not exist.
    #[display("`commission::Installment(id: {_0})` does not exist")]
    InstallmentNotExists(#[error(not(source))] commission::Id),

    /// [`commission::Installment`] has no due date yet, as its down payment
    /// installment is not paid.
    #[display("`commission::Installment(id: {_0})` is not due yet")]
    NotDue(#[error(not(source))] commission::Id),
}
