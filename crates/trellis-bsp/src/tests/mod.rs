//! Test suites for the build-server adapter.

mod support;
