//! Integration tests: the full attach → interrupt → detach path on mock and
//! simulated hardware.

mod mock_hw;
mod servo_tests;
mod timing_tests;
