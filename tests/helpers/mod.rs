pub mod app;
pub mod test_metrics;
