//! Scenario tests for the full render pass, driven through the library's public API.
