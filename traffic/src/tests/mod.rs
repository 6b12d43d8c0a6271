#![allow(dead_code)]
#![cfg(test)]

use crate::map::{Clock, Network, TrafficSignal};
use common::logger::MyLog;

mod test_codec;

pub(crate) static DEMO: &str = include_str!("demo.txt");

pub(crate) struct TestCtx {
    pub n: Network,
    pub clock: Clock,
}

impl TestCtx {
    pub(crate) fn new() -> Self {
        MyLog::init();
        let clock = Clock::new();
        Self {
            n: Network::with_clock(clock.clone()),
            clock,
        }
    }

    pub(crate) fn intersections(&mut self, names: &[&str]) {
        for name in names {
            self.n.create_intersection(name).unwrap();
        }
    }

    /// Builds `center` with one incoming route from each origin, in the given order
    pub(crate) fn star(&mut self, center: &str, origins: &[&str]) {
        self.intersections(&[center]);
        self.intersections(origins);
        for origin in origins {
            self.n.connect(origin, center, 60).unwrap();
        }
    }

    pub(crate) fn tick(&mut self) {
        self.clock.tick();
    }

    /// Signals of the routes entering `name`, in the intersection's order
    pub(crate) fn signals(&self, name: &str) -> Vec<TrafficSignal> {
        self.n
            .incoming(name)
            .unwrap()
            .into_iter()
            .map(|origin| self.n.route(origin, name).unwrap().signal().unwrap())
            .collect()
    }

    /// Re-parses the serialized network and checks nothing was lost
    pub(crate) fn check_roundtrip(&self) {
        let text = self.n.serialize();
        let parsed = Network::parse(&text).unwrap_or_else(|e| panic!("{}\n{}", e, text));
        assert!(parsed.same_content(&self.n), "{}", text);
        assert_eq!(parsed.serialize(), text);
    }
}
