pub mod aggregator;
pub mod trend;
pub mod baseline;
pub mod product_trends;
pub mod forecast;
pub mod session;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
