use crate::map::{
    average_congestion, IntersectionID, Sensor, SensorKind, TrafficLight, TrafficSignal,
};
use slotmapd::new_key_type;
use std::collections::BTreeMap;

new_key_type! {
    pub struct RouteID;
}

/// An electronic sign displaying the current speed limit of a route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpeedSign {
    pub current: i32,
}

/// A one way connection from `src` to `dst`. The destination holds the route as incoming.
#[derive(Debug)]
pub struct Route {
    pub id: RouteID,
    pub src: IntersectionID,
    pub dst: IntersectionID,

    default_speed: i32,
    speed_sign: Option<SpeedSign>,
    light: Option<TrafficLight>,

    // at most one per kind, iterates sorted by kind code
    sensors: BTreeMap<SensorKind, Sensor>,
}

impl Route {
    pub(crate) fn new(
        id: RouteID,
        src: IntersectionID,
        dst: IntersectionID,
        default_speed: i32,
    ) -> Self {
        Self {
            id,
            src,
            dst,
            default_speed,
            speed_sign: None,
            light: None,
            sensors: BTreeMap::new(),
        }
    }

    pub fn default_speed(&self) -> i32 {
        self.default_speed
    }

    /// The sign's speed when there is one, the default otherwise
    pub fn speed(&self) -> i32 {
        self.speed_sign.map_or(self.default_speed, |s| s.current)
    }

    pub fn speed_sign(&self) -> Option<SpeedSign> {
        self.speed_sign
    }

    pub fn has_speed_sign(&self) -> bool {
        self.speed_sign.is_some()
    }

    pub(crate) fn set_speed_sign(&mut self, sign: SpeedSign) {
        self.speed_sign = Some(sign);
    }

    pub fn light(&self) -> Option<&TrafficLight> {
        self.light.as_ref()
    }

    pub fn signal(&self) -> Option<TrafficSignal> {
        self.light.as_ref().map(TrafficLight::signal)
    }

    /// Returns the route's light, creating a red one if it has none yet
    pub(crate) fn ensure_light(&mut self) -> TrafficLight {
        self.light.get_or_insert_with(TrafficLight::new).clone()
    }

    pub fn sensors(&self) -> impl Iterator<Item = &Sensor> + '_ {
        self.sensors.values()
    }

    pub fn n_sensors(&self) -> usize {
        self.sensors.len()
    }

    pub fn has_sensor(&self, kind: SensorKind) -> bool {
        self.sensors.contains_key(&kind)
    }

    pub(crate) fn insert_sensor(&mut self, sensor: Sensor) {
        self.sensors.insert(sensor.kind(), sensor);
    }

    pub(crate) fn sensors_mut(&mut self) -> impl Iterator<Item = &mut Sensor> + '_ {
        self.sensors.values_mut()
    }

    pub fn congestion(&self) -> u8 {
        average_congestion(self.sensors())
    }

    /// Same speeds, sign, signal and sensors
    pub fn same_content(&self, other: &Route) -> bool {
        self.default_speed == other.default_speed
            && self.speed_sign == other.speed_sign
            && self.signal() == other.signal()
            && self.sensors.len() == other.sensors.len()
            && self.sensors().eq(other.sensors())
    }
}
