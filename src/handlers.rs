pub mod catalog;
pub mod ledger;
pub mod orders;
pub mod stock;
