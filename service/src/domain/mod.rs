//! Domain definitions.

pub mod broker;
pub mod development;
pub mod sale;

pub use self::{broker::Broker, development::Development, sale::Sale};
