//! End-to-end tests for the fleetcheck workspace.

mod batch;
mod telnet;
