mod api_client_tests;
mod power_tests;
mod resolver_tests;
mod snapshot_tests;
mod task_poller_tests;
