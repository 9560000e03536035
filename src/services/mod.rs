pub mod api_client;
pub mod dashboard_engine;
pub mod event_stream;
pub mod task_aggregator;
