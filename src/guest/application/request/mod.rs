pub mod power_options;
