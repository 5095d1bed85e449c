pub mod snapshot_options;
