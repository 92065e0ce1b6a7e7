//! [`Sale`]-related definitions.

use std::future;

use common::{Date, DateOf, DateTime, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, read};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, error::Kind, AsError, Context, Error};

/// A sale of a real estate unit.
#[derive(Clone, Debug)]
pub struct Sale {
    /// ID of this [`Sale`].
    id: Id,

    /// Underlying [`domain::Sale`].
    sale: OnceCell<domain::Sale>,
}

impl From<domain::Sale> for Sale {
    fn from(sale: domain::Sale) -> Self {
        Self {
            id: sale.id.into(),
            sale: OnceCell::new_with(Some(sale)),
        }
    }
}

impl Sale {
    /// Creates a new [`Sale`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Sale`] with the provided ID exists,
    /// otherwise accessing this [`Sale`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            sale: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Sale`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Sale`] doesn't exist.
    async fn sale(&self, ctx: &Context) -> Result<&domain::Sale, Error> {
        let id = self.id.into();
        self.sale
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::sale::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|s| {
                        future::ready(s.ok_or_else(|| {
                            Kind::SaleNotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A sale of a real estate unit.
#[graphql_object(context = Context)]
impl Sale {
    /// Unique identifier of this `Sale`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of the client who bought the unit.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.clientName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn client_name(&self, ctx: &Context) -> Result<ClientName, Error> {
        Ok(self.sale(ctx).await?.client_name.clone().into())
    }

    /// `Development` the sold unit belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.development",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn development(
        &self,
        ctx: &Context,
    ) -> Result<api::Development, Error> {
        let id = self.sale(ctx).await?.development_id;
        #[expect(unsafe_code, reason = "`Sale` references existing one")]
        let development = unsafe { api::Development::new_unchecked(id) };
        Ok(development)
    }

    /// `Broker` who closed this `Sale`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.broker",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn broker(&self, ctx: &Context) -> Result<api::Broker, Error> {
        let id = self.sale(ctx).await?.broker_id;
        #[expect(unsafe_code, reason = "`Sale` references existing one")]
        let broker = unsafe { api::Broker::new_unchecked(id) };
        Ok(broker)
    }

    /// Total down payment of this `Sale`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.downPayment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn down_payment(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.sale(ctx).await?.down_payment)
    }

    /// Number of installments the down payment and the commission are split
    /// into.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.installmentsCount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn installments_count(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.sale(ctx).await?.installments_count.get().into())
    }

    /// `Date` this `Sale` was closed on.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.soldOn",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn sold_on(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.sale(ctx).await?.sold_on.coerce())
    }

    /// Total commission of this `Sale`, as the `Development` had it when
    /// this `Sale` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.commission",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn commission(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.sale(ctx).await?.commission)
    }

    /// Paid part of this `Sale`'s commission.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.commissionPaid",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn commission_paid(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.sale(ctx).await?.commission_paid())
    }

    /// Due, but not yet paid part of this `Sale`'s commission.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.commissionPending",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn commission_pending(
        &self,
        ctx: &Context,
    ) -> Result<Money, Error> {
        Ok(self.sale(ctx).await?.commission_pending())
    }

    /// Lot of the sold unit, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.lot",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn lot(&self, ctx: &Context) -> Result<Option<Lot>, Error> {
        Ok(self.sale(ctx).await?.lot.clone().map(Into::into))
    }

    /// Block of the sold unit, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.block",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn block(&self, ctx: &Context) -> Result<Option<Block>, Error> {
        Ok(self.sale(ctx).await?.block.clone().map(Into::into))
    }

    /// Commission `PaymentStatus` of this `Sale` as of today.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.sale(ctx).await?.status(ctx.service().today()).into())
    }

    /// Down payment installments of this `Sale`, ordered by their numbers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.downPaymentInstallments",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn down_payment_installments(
        &self,
        ctx: &Context,
    ) -> Result<Vec<DownPaymentInstallment>, Error> {
        let sale = self.sale(ctx).await?;
        Ok(sale
            .down_payment_installments
            .iter()
            .map(|i| DownPaymentInstallment {
                sale_id: self.id,
                installment: i.clone(),
            })
            .collect())
    }

    /// Commission installments of this `Sale`, ordered by their numbers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.commissionInstallments",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn commission_installments(
        &self,
        ctx: &Context,
    ) -> Result<Vec<CommissionInstallment>, Error> {
        let sale = self.sale(ctx).await?;
        Ok(sale
            .commission_installments
            .iter()
            .map(|i| CommissionInstallment {
                sale_id: self.id,
                installment: i.clone(),
            })
            .collect())
    }

    /// `DateTime` when this `Sale` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.sale(ctx).await?.created_at.coerce())
    }
}

/// Installment of a [`Sale`]'s down payment.
#[derive(Clone, Debug)]
pub struct DownPaymentInstallment {
    /// ID of the [`Sale`] this installment belongs to.
    sale_id: Id,

    /// Underlying [`domain::sale::down_payment::Installment`].
    installment: domain::sale::down_payment::Installment,
}

/// Installment of a `Sale`'s down payment paid by its client.
#[graphql_object(context = Context)]
impl DownPaymentInstallment {
    /// Unique identifier of this `DownPaymentInstallment`.
    #[must_use]
    pub fn id(&self) -> DownPaymentInstallmentId {
        self.installment.id.into()
    }

    /// ID of the `Sale` this `DownPaymentInstallment` belongs to.
    #[must_use]
    pub fn sale_id(&self) -> Id {
        self.sale_id
    }

    /// Number of this `DownPaymentInstallment`, starting from `1`.
    #[must_use]
    pub fn installment_number(&self) -> i32 {
        u16::from(self.installment.number).into()
    }

    /// Amount of this `DownPaymentInstallment`.
    #[must_use]
    pub fn value(&self) -> Money {
        self.installment.amount
    }

    /// `Date` this `DownPaymentInstallment` is due on.
    #[must_use]
    pub fn due_date(&self) -> Date {
        self.installment.due_on.coerce()
    }

    /// Indicator whether this `DownPaymentInstallment` is paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.installment.is_paid()
    }

    /// `Date` this `DownPaymentInstallment` was paid on, if it was.
    #[must_use]
    pub fn paid_date(&self) -> Option<Date> {
        self.installment.paid_on.map(DateOf::coerce)
    }

    /// `PaymentStatus` of this `DownPaymentInstallment` as of today.
    #[must_use]
    pub fn status(&self, ctx: &Context) -> Status {
        self.installment.status(ctx.service().today()).into()
    }
}

/// Installment of a [`Sale`]'s commission.
#[derive(Clone, Debug)]
pub struct CommissionInstallment {
    /// ID of the [`Sale`] this installment belongs to.
    sale_id: Id,

    /// Underlying [`domain::sale::commission::Installment`].
    installment: domain::sale::commission::Installment,
}

impl CommissionInstallment {
    /// Creates a new [`CommissionInstallment`] of the [`Sale`] with the
    /// provided ID.
    #[must_use]
    pub fn new(
        sale_id: impl Into<Id>,
        installment: domain::sale::commission::Installment,
    ) -> Self {
        Self {
            sale_id: sale_id.into(),
            installment,
        }
    }
}

/// Installment of a `Sale`'s commission earned by its `Broker`.
#[graphql_object(context = Context)]
impl CommissionInstallment {
    /// Unique identifier of this `CommissionInstallment`.
    #[must_use]
    pub fn id(&self) -> CommissionInstallmentId {
        self.installment.id.into()
    }

    /// ID of the `Sale` this `CommissionInstallment` belongs to.
    #[must_use]
    pub fn sale_id(&self) -> Id {
        self.sale_id
    }

    /// `Sale` this `CommissionInstallment` belongs to.
    #[must_use]
    pub fn sale(&self) -> Sale {
        #[expect(unsafe_code, reason = "installment belongs to existing one")]
        unsafe {
            Sale::new_unchecked(self.sale_id)
        }
    }

    /// Number of this `CommissionInstallment`, starting from `1`.
    #[must_use]
    pub fn installment_number(&self) -> i32 {
        u16::from(self.installment.number).into()
    }

    /// Amount of this `CommissionInstallment`.
    #[must_use]
    pub fn value(&self) -> Money {
        self.installment.amount
    }

    /// `Date` this `CommissionInstallment` is due on.
    ///
    /// Absent until the linked `DownPaymentInstallment` is paid.
    #[must_use]
    pub fn due_date(&self) -> Option<Date> {
        self.installment.due_on.map(DateOf::coerce)
    }

    /// Indicator whether this `CommissionInstallment` is paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.installment.is_paid()
    }

    /// `Date` this `CommissionInstallment` was paid on, if it was.
    #[must_use]
    pub fn paid_date(&self) -> Option<Date> {
        self.installment.paid_on.map(DateOf::coerce)
    }

    /// ID of the `DownPaymentInstallment` this `CommissionInstallment` is
    /// linked to.
    #[must_use]
    pub fn linked_down_payment_installment_id(
        &self,
    ) -> DownPaymentInstallmentId {
        self.installment.down_payment_installment_id.into()
    }

    /// `PaymentStatus` of this `CommissionInstallment` as of today.
    #[must_use]
    pub fn status(&self, ctx: &Context) -> Status {
        self.installment.status(ctx.service().today()).into()
    }
}

/// Unique identifier of a `Sale`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::sale::Id)]
#[into(domain::sale::Id)]
#[graphql(name = "SaleId", transparent)]
pub struct Id(Uuid);

/// Unique identifier of a `DownPaymentInstallment`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::sale::down_payment::Id)]
#[into(domain::sale::down_payment::Id)]
#[graphql(transparent)]
pub struct DownPaymentInstallmentId(Uuid);

/// Unique identifier of a `CommissionInstallment`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::sale::commission::Id)]
#[into(domain::sale::commission::Id)]
#[graphql(transparent)]
pub struct CommissionInstallmentId(Uuid);

/// Name of a `Sale` client.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "SaleClientName",
    with = scalar::Via::<domain::sale::ClientName>,
)]
pub struct ClientName(domain::sale::ClientName);

/// Lot of a sold unit.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "SaleLot", with = scalar::Via::<domain::sale::Lot>)]
pub struct Lot(domain::sale::Lot);

/// Block of a sold unit.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "SaleBlock", with = scalar::Via::<domain::sale::Block>)]
pub struct Block(domain::sale::Block);

/// Calendar month in a `YYYY-MM` format.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "SaleMonth", with = scalar::Via::<read::sale::Month>)]
pub struct Month(read::sale::Month);

/// Payment status of a `Sale`'s commission or of a single installment.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentStatus")]
pub enum Status {
    /// Everything is paid.
    Paid,

    /// Something is due in the past and still unpaid.
    Overdue,

    /// Something is due and unpaid.
    Pending,

    /// Nothing is due yet.
    Awaiting,
}

impl From<domain::sale::Status> for Status {
    fn from(status: domain::sale::Status) -> Self {
        use domain::sale::Status as S;
        match status {
            S::Paid => Self::Paid,
            S::Overdue => Self::Overdue,
            S::Pending => Self::Pending,
            S::Awaiting => Self::Awaiting,
        }
    }
}

impl From<Status> for domain::sale::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Paid => Self::Paid,
            Status::Overdue => Self::Overdue,
            Status::Pending => Self::Pending,
            Status::Awaiting => Self::Awaiting,
        }
    }
}

pub mod list {
    //! Definitions related to the [`Sale`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use super::{Id, Sale};
    use crate::{api::scalar, AsError, Context, Error};

    /// Cursor for the `Sale` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "SaleListCursor",
        with = scalar::Via::<read::sale::list::Cursor>,
    )]
    pub struct Cursor(pub read::sale::list::Cursor);

    /// Edge in the [`Sale`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::sale::list::Edge);

    /// Edge in the `Sale` list.
    #[graphql_object(name = "SaleListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `SaleListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `SaleListEdge`.
        #[must_use]
        pub fn node(&self) -> Sale {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Sale` \
                          existence"
            )]
            unsafe {
                Sale::new_unchecked(Id::from(self.0.node))
            }
        }
    }

    /// Connection of the [`Sale`] list.
    #[derive(Clone, Debug)]
    pub struct Connection {
        /// Underlying [`read::sale::list::Connection`].
        connection: read::sale::list::Connection,

        /// [`read::sale::list::Filter`] this [`Connection`] was selected by.
        filter: read::sale::list::Filter,
    }

    impl Connection {
        /// Creates a new [`Connection`] selected by the provided `filter`.
        #[must_use]
        pub fn new(
            connection: read::sale::list::Connection,
            filter: read::sale::list::Filter,
        ) -> Self {
            Self { connection, filter }
        }
    }

    /// Connection of the `Sale` list.
    #[graphql_object(name = "SaleListConnection", context = Context)]
    impl Connection {
        /// Edges of this `SaleListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.connection.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.connection.page_info(),
                filter: self.filter,
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::sale::list::PageInfo`].
        info: read::sale::list::PageInfo,

        /// [`read::sale::list::Filter`] of the [`Connection`].
        filter: read::sale::list::Filter,
    }

    /// Information about a `SaleListConnection` page.
    #[graphql_object(name = "SaleListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> Option<Cursor> {
            self.info.start_cursor.map(Into::into)
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> Option<Cursor> {
            self.info.end_cursor.map(Into::into)
        }

        /// Total count of `Sale`s passing the same filters.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::sales::TotalCount::by(self.filter))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
