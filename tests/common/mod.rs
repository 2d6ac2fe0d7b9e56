//! Common test infrastructure.
//!
//! [`Sample`] produces deterministic values for every element kind, so the
//! channel properties can be checked once per kind by generic test
//! functions.
#![allow(missing_docs, dead_code)]
use sandbox_guest::{Element, Guest, MemoryHost};

/// An element type with deterministic sample values.
pub trait Sample: Element + PartialEq {
    fn sample(i: usize) -> Self;

    fn samples(n: usize) -> Vec<Self> {
        (0..n).map(Self::sample).collect()
    }
}

impl Sample for bool {
    fn sample(i: usize) -> Self {
        i % 2 == 0
    }
}

impl Sample for u8 {
    fn sample(i: usize) -> Self {
        (i % 251) as u8
    }
}

impl Sample for i64 {
    fn sample(i: usize) -> Self {
        (i as i64 - 50) * 1_000_003
    }
}

impl Sample for f64 {
    fn sample(i: usize) -> Self {
        i as f64 * 0.25 - 3.0
    }
}

impl Sample for String {
    fn sample(i: usize) -> Self {
        format!("stringstring-{i}")
    }
}

/// A fresh host and a guest serviced by it.
pub fn guest() -> (MemoryHost, Guest<MemoryHost>) {
    let host = MemoryHost::new();
    (host.clone(), Guest::new(host))
}

/// A guest whose input `key` holds `items` and is closed.
pub fn closed_input<T: Element>(key: &str, items: Vec<T>) -> (MemoryHost, Guest<MemoryHost>) {
    let (host, guest) = guest();
    host.add_closed_input(key, items);
    (host, guest)
}

/// A guest whose input `key` holds `items` and is still open.
pub fn open_input<T: Element>(key: &str, items: Vec<T>) -> (MemoryHost, Guest<MemoryHost>) {
    let (host, guest) = guest();
    host.add_input::<T>(key);
    host.push(key, items).unwrap();
    (host, guest)
}

/// Alternating booleans, starting with `true`.
pub fn alternating_bools(n: usize) -> Vec<bool> {
    (0..n).map(|i| i % 2 == 0).collect()
}
