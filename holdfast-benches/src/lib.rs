//! Benchmarks for `holdfast`; see `benches/`.
