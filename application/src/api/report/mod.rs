//! Report definitions.

pub mod broker_dashboard;
pub mod commissions;

pub use self::{broker_dashboard::BrokerDashboard, commissions::Commissions};
