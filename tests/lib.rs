// Integration-test-only package; see endpoint_integration_tests.rs.
