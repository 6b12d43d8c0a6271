#![allow(clippy::type_complexity)]

#[macro_use]
extern crate common;

#[macro_use]
extern crate log as extern_log;

pub mod map;
#[cfg(test)]
mod tests;

pub use map::{load, load_with_clock, Clock, LoadError, Network, NetworkError, NetworkOptions};
