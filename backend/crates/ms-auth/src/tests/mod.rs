mod property_tests;
mod rate_limit;

pub(crate) const TEST_SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";
pub(crate) const NOW: i64 = 1_767_225_600; // 2026-01-01T00:00:00Z
