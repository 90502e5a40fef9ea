//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the video platform and run
//! the full discovery, dispatch and storage cycle end-to-end.

mod crawl_tests;
