pub mod api_client;
pub mod resource_resolver;
pub mod task_poller;
