use crate::map::{FIELD_SEPARATOR, LIST_SEPARATOR};
use itertools::Itertools;
use std::cell::Cell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrafficSignal {
    GREEN,
    YELLOW,
    #[default]
    RED,
}

impl TrafficSignal {
    pub fn is_red(self) -> bool {
        matches!(self, TrafficSignal::RED)
    }
}

/// The light shown to a route. The route and the controller of its destination share it.
#[derive(Clone, Debug, Default)]
pub struct TrafficLight(Rc<Cell<TrafficSignal>>);

impl TrafficLight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> TrafficSignal {
        self.0.get()
    }

    pub fn set_signal(&self, signal: TrafficSignal) {
        self.0.set(signal)
    }
}

/// Cycles green then yellow across a fixed order of routes, one route at a time.
/// Every other controlled route is red.
#[derive(Debug)]
pub struct LightController {
    yellow_time: u32,
    duration: u32,
    // green cycle order, never reordered
    lights: Vec<(String, TrafficLight)>,
    active: usize,
    elapsed: u32,
}

impl LightController {
    /// `duration` must exceed `yellow_time`, the network checks it before building one.
    pub fn new(lights: Vec<(String, TrafficLight)>, yellow_time: u32, duration: u32) -> Self {
        debug_assert!(yellow_time >= 1);
        debug_assert!(duration > yellow_time);
        let mut c = Self {
            yellow_time,
            duration,
            lights,
            active: 0,
            elapsed: 0,
        };
        c.reset();
        c
    }

    pub fn yellow_time(&self) -> u32 {
        self.yellow_time
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Origin ids of the controlled routes, in cycle order
    pub fn order(&self) -> impl Iterator<Item = &str> + '_ {
        self.lights.iter().map(|(origin, _)| origin.as_str())
    }

    pub fn signals(&self) -> impl Iterator<Item = TrafficSignal> + '_ {
        self.lights.iter().map(|(_, light)| light.signal())
    }

    /// Changing the duration always restarts the cycle from the first route.
    pub fn set_duration(&mut self, duration: u32) {
        debug_assert!(duration > self.yellow_time);
        self.duration = duration;
        self.reset();
    }

    /// The new route joins the end of the cycle and stays red until its turn comes.
    pub fn push(&mut self, origin: String, light: TrafficLight) {
        light.set_signal(TrafficSignal::RED);
        self.lights.push((origin, light));
    }

    fn reset(&mut self) {
        self.elapsed = 0;
        self.active = 0;
        self.show(TrafficSignal::GREEN);
    }

    fn show(&self, signal: TrafficSignal) {
        for (i, (_, light)) in self.lights.iter().enumerate() {
            if i == self.active {
                light.set_signal(signal);
            } else {
                light.set_signal(TrafficSignal::RED);
            }
        }
    }

    pub fn one_second(&mut self) {
        if self.lights.is_empty() {
            return;
        }

        let remainder = self.elapsed % self.duration;
        if remainder < self.duration - self.yellow_time {
            self.show(TrafficSignal::GREEN);
        } else {
            self.show(TrafficSignal::YELLOW);
        }

        if remainder == self.duration - 1 {
            self.active = (self.active + 1) % self.lights.len();
        }

        self.elapsed += 1;
    }
}

impl Display for LightController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.duration,
            FIELD_SEPARATOR,
            self.order().join(&LIST_SEPARATOR.to_string())
        )
    }
}
