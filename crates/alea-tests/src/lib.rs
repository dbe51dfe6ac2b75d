//! Test-only crate for Alea.
//!
//! All tests live under `tests/`; this library target is intentionally empty.
