pub mod activity_service;
pub mod aggregation_service;
pub mod api_client;
pub mod poller;
pub mod prediction_service;
pub mod report_service;
pub mod review_service;
pub mod settings_service;
