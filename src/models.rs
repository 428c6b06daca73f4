pub mod auth;
pub mod inventory;
pub mod ledger;
pub mod orders;
