//! Tests that drive the client against a mocked Proxmox API.

mod resources;
mod support;
