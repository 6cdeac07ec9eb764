pub mod assistant;
pub mod dashboard;
pub mod metric;

pub use assistant::{assistant_page, AssistantOutcome, AssistantVm};
pub use dashboard::{dashboard_page, CityReport, DashboardVm, FilterForm};
pub use metric::{metric_page, MetricVm};
