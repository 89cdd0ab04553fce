//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the `AppService` loop
//! against the mock board.  All tests run on the host (x86_64) with no
//! real hardware required.

mod menu_flow_tests;
mod mock_hw;
mod service_tests;
