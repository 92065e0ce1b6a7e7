//! [`Command`] definition.

pub mod create_broker;
pub mod create_development;
pub mod create_sale;
pub mod delete_broker;
pub mod delete_development;
pub mod delete_sale;
pub mod mark_commission_installment_paid;
pub mod mark_down_payment_installment_paid;
pub mod update_broker;
pub mod update_development;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_broker::CreateBroker, create_development::CreateDevelopment,
    create_sale::CreateSale, delete_broker::DeleteBroker,
    delete_development::DeleteDevelopment, delete_sale::DeleteSale,
    mark_commission_installment_paid::MarkCommissionInstallmentPaid,
    mark_down_payment_installment_paid::MarkDownPaymentInstallmentPaid,
    update_broker::UpdateBroker, update_development::UpdateDevelopment,
};
