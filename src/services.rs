pub mod cascade_service;
pub mod credential_service;
pub mod ledger_service;
pub mod order_service;
pub mod stock_service;
