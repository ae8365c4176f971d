//! Payment operations as agent tools.

pub mod balance_transactions;
pub mod disputes;
pub mod payment_methods;
pub mod payments;
pub mod payouts;
pub mod refunds;
pub mod registry;
pub mod toolkit;
pub mod validation;

pub use registry::{ToolDescriptor, ToolRegistry};
pub use toolkit::Toolkit;
