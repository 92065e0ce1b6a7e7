//! Reporting [`Query`]s.
//!
//! [`Query`]: crate::Query

pub mod broker_dashboard;
pub mod commissions;

pub use self::{
    broker_dashboard::BrokerDashboard, commissions::Commissions,
};
