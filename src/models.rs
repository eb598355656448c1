pub mod sales;
pub mod dashboard;
