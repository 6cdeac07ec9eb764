mod assistant_tests;
mod dashboard_tests;
mod metrics_tests;
