//! Utility functions for benchmarks.
#![allow(dead_code, unreachable_pub)]

use sandbox_guest::{Element, Guest, MemoryHost};

/// Name of the benchmark input channel.
pub const INPUT: &str = "bench_input";

/// Number of items placed in each benchmark channel.
pub const NUM_ITEMS: usize = 4096;

/// Generate a text item for testing.
pub fn get_text(n: usize) -> String {
    format!("item{n}")
}

/// A guest whose input channel holds `items` and is closed.
pub fn closed_guest<T: Element>(items: Vec<T>) -> Guest<MemoryHost> {
    let host = MemoryHost::new();
    host.add_closed_input(INPUT, items);
    Guest::new(host)
}

/// A closed channel of [`NUM_ITEMS`] integers.
pub fn int_guest() -> Guest<MemoryHost> {
    closed_guest((0..NUM_ITEMS as i64).collect())
}

/// A closed channel of [`NUM_ITEMS`] strings.
pub fn text_guest() -> Guest<MemoryHost> {
    closed_guest((0..NUM_ITEMS).map(get_text).collect())
}
