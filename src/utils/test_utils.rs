//! Test utilities: canonical programs and helpers shared across test modules.
