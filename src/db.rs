pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod operator_repo;
pub use operator_repo::OperatorRepository;
