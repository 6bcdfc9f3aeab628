//! Cross-crate scenarios.

mod module_management;
mod recovery;
mod refund;
mod relayer;
