//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money};
use juniper::{graphql_object, Nullable};
use service::{command, Command as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `Broker`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createBroker",
            hired_on = %hired_on,
            name = %name,
            otel.name = Self::SPAN_NAME,
            phone = ?phone,
        ),
    )]
    pub async fn create_broker(
        name: api::broker::Name,
        email: api::broker::Email,
        phone: Option<api::broker::Phone>,
        hired_on: Date,
        ctx: &Context,
    ) -> Result<api::Broker, Error> {
        ctx.service()
            .execute(command::CreateBroker {
                name: name.into(),
                email: email.into(),
                phone: phone.map(Into::into),
                hired_on: hired_on.coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the provided fields of the `Broker` with the specified ID.
    ///
    /// A `null` phone removes the current one, while an omitted one keeps it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BROKER_NOT_EXISTS` - the `Broker` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "updateBroker",
            hired_on = ?hired_on,
            id = %id,
            name = ?name,
            otel.name = Self::SPAN_NAME,
            phone = ?phone,
        ),
    )]
    pub async fn update_broker(
        id: api::broker::Id,
        name: Option<api::broker::Name>,
        email: Option<api::broker::Email>,
        phone: Nullable<api::broker::Phone>,
        hired_on: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Broker, Error> {
        ctx.service()
            .execute(command::UpdateBroker {
                broker_id: id.into(),
                name: name.map(Into::into),
                email: email.map(Into::into),
                phone: phone.explicit().map(|p| p.map(Into::into)),
                hired_on: hired_on.map(Date::coerce),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Broker` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BROKER_NOT_EXISTS` - the `Broker` with the specified ID does not
    ///                         exist;
    /// - `BROKER_HAS_SALES` - the `Broker` has `Sale`s, which must be deleted
    ///                        first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteBroker",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_broker(
        id: api::broker::Id,
        ctx: &Context,
    ) -> Result<api::Broker, Error> {
        ctx.service()
            .execute(command::DeleteBroker {
                broker_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Development`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NEGATIVE_AMOUNT` - the provided `commission` is negative;
    /// - `AMOUNT_OUT_OF_RANGE` - the provided `commission` exceeds
    ///                           `99999999999999.99`.
    #[tracing::instrument(
        skip_all,
        fields(
            commission = %commission,
            gql.name = "createDevelopment",
            location = %location,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_development(
        name: api::development::Name,
        location: api::development::Location,
        commission: Money,
        ctx: &Context,
    ) -> Result<api::Development, Error> {
        ctx.service()
            .execute(command::CreateDevelopment {
                name: name.into(),
                location: location.into(),
                commission,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the provided fields of the `Development` with the specified
    /// ID.
    ///
    /// Existing `Sale`s keep the commission they were created with.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DEVELOPMENT_NOT_EXISTS` - the `Development` with the specified ID
    ///                              does not exist;
    /// - `NEGATIVE_AMOUNT` - the provided `commission` is negative;
    /// - `AMOUNT_OUT_OF_RANGE` - the provided `commission` exceeds
    ///                           `99999999999999.99`.
    #[tracing::instrument(
        skip_all,
        fields(
            commission = ?commission,
            gql.name = "updateDevelopment",
            id = %id,
            location = ?location,
            name = ?name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_development(
        id: api::development::Id,
        name: Option<api::development::Name>,
        location: Option<api::development::Location>,
        commission: Option<Money>,
        ctx: &Context,
    ) -> Result<api::Development, Error> {
        ctx.service()
            .execute(command::UpdateDevelopment {
                development_id: id.into(),
                name: name.map(Into::into),
                location: location.map(Into::into),
                commission,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Development` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DEVELOPMENT_NOT_EXISTS` - the `Development` with the specified ID
    ///                              does not exist;
    /// - `DEVELOPMENT_HAS_SALES` - the `Development` has `Sale`s, which must
    ///                             be deleted first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteDevelopment",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_development(
        id: api::development::Id,
        ctx: &Context,
    ) -> Result<api::Development, Error> {
        ctx.service()
            .execute(command::DeleteDevelopment {
                development_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Sale` along with its down payment and commission
    /// installments.
    ///
    /// The commission is taken from the `Development` at this moment.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BROKER_NOT_EXISTS` - the `Broker` with the specified ID does not
    ///                         exist;
    /// - `DEVELOPMENT_NOT_EXISTS` - the `Development` with the specified ID
    ///                              does not exist;
    /// - `INVALID_INSTALLMENTS_COUNT` - the `installmentsCount` is out of
    ///                                  the supported range;
    /// - `NEGATIVE_AMOUNT` - the `downPayment` or the commission is negative;
    /// - `AMOUNT_OUT_OF_RANGE` - the `downPayment` or the commission exceeds
    ///                           `99999999999999.99`;
    /// - `DUE_DATE_OUT_OF_RANGE` - the installments can't be scheduled from
    ///                             the `soldOn` date.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            broker_id = %broker_id,
            development_id = %development_id,
            down_payment = %down_payment,
            gql.name = "createSale",
            installments_count = installments_count,
            otel.name = Self::SPAN_NAME,
            sold_on = %sold_on,
        ),
    )]
    pub async fn create_sale(
        client_name: api::sale::ClientName,
        development_id: api::development::Id,
        broker_id: api::broker::Id,
        down_payment: Money,
        installments_count: i32,
        sold_on: Date,
        lot: Option<api::sale::Lot>,
        block: Option<api::sale::Block>,
        ctx: &Context,
    ) -> Result<api::Sale, Error> {
        ctx.service()
            .execute(command::CreateSale {
                client_name: client_name.into(),
                development_id: development_id.into(),
                broker_id: broker_id.into(),
                down_payment,
                installments_count,
                sold_on: sold_on.coerce(),
                lot: lot.map(Into::into),
                block: block.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Sale` with the specified ID along with all its
    /// installments.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SALE_NOT_EXISTS` - the `Sale` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteSale",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_sale(
        id: api::sale::Id,
        ctx: &Context,
    ) -> Result<api::Sale, Error> {
        ctx.service()
            .execute(command::DeleteSale { sale_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `DownPaymentInstallment` with the specified ID as paid on
    /// the provided `Date` (today, if omitted).
    ///
    /// The linked `CommissionInstallment` becomes due 7 days later. Marking
    /// an already paid installment changes nothing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INSTALLMENT_NOT_EXISTS` - the `DownPaymentInstallment` with the
    ///                              specified ID does not exist;
    /// - `DUE_DATE_OUT_OF_RANGE` - the commission due date overflows the
    ///                             calendar.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markDownPaymentInstallmentPaid",
            installment_id = %installment_id,
            otel.name = Self::SPAN_NAME,
            paid_on = ?paid_on,
        ),
    )]
    pub async fn mark_down_payment_installment_paid(
        installment_id: api::sale::DownPaymentInstallmentId,
        paid_on: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Sale, Error> {
        ctx.service()
            .execute(command::MarkDownPaymentInstallmentPaid {
                installment_id: installment_id.into(),
                paid_on: paid_on.map(Date::coerce),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `CommissionInstallment` with the specified ID as paid on the
    /// provided `Date` (today, if omitted).
    ///
    /// Marking an already paid installment changes nothing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INSTALLMENT_NOT_EXISTS` - the `CommissionInstallment` with the
    ///                              specified ID does not exist;
    /// - `COMMISSION_NOT_DUE` - the `CommissionInstallment` has no due date
    ///                          yet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markCommissionInstallmentPaid",
            installment_id = %installment_id,
            otel.name = Self::SPAN_NAME,
            paid_on = ?paid_on,
        ),
    )]
    pub async fn mark_commission_installment_paid(
        installment_id: api::sale::CommissionInstallmentId,
        paid_on: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Sale, Error> {
        ctx.service()
            .execute(command::MarkCommissionInstallmentPaid {
                installment_id: installment_id.into(),
                paid_on: paid_on.map(Date::coerce),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}
