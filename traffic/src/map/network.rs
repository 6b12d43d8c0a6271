use crate::map::{
    Clock, Intersection, IntersectionID, LightController, NetworkError, NetworkResult, Route,
    RouteID, Sensor, SpeedSign,
};
use common::FastMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use slotmapd::HopSlotMap;
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

pub type Intersections = HopSlotMap<IntersectionID, Intersection>;
pub type Routes = HopSlotMap<RouteID, Route>;

/// Signs showing at least this much are slowed down by [`Network::reduce_incoming_speed_signs`]
pub const SPEED_REDUCTION_CUTOFF: i32 = 50;
pub const SPEED_REDUCTION_AMOUNT: i32 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// Yellow time given to every light controller created from now on, in seconds
    pub yellow_time: u32,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self { yellow_time: 1 }
    }
}

impl NetworkOptions {
    /// Reads options from a JSON file, missing fields and unreadable files fall back to the defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        common::saveload::load_json_or_default(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Option<()> {
        common::saveload::save_json(self, path)
    }
}

/// The road network: named intersections joined by one way routes.
///
/// The network owns every intersection and route. Light controllers belong to their
/// intersection and are ticked by the network's [`Clock`]. Mutators either apply fully or
/// return an error without touching anything.
#[derive(Debug)]
pub struct Network {
    pub(crate) intersections: Intersections,
    pub(crate) routes: Routes,

    // sorted by name
    pub(crate) names: BTreeMap<String, IntersectionID>,
    // creation order
    pub(crate) route_order: Vec<RouteID>,
    route_index: FastMap<(IntersectionID, IntersectionID), RouteID>,

    yellow_time: u32,
    clock: Clock,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    // Public API
    pub fn new() -> Self {
        Self::with_clock(Clock::new())
    }

    /// An empty network whose light controllers will be ticked by `clock`
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            intersections: Intersections::default(),
            routes: Routes::default(),
            names: BTreeMap::new(),
            route_order: Vec::new(),
            route_index: FastMap::default(),
            yellow_time: NetworkOptions::default().yellow_time,
            clock,
        }
    }

    pub fn new_with_options(options: NetworkOptions, clock: Clock) -> NetworkResult<Self> {
        let mut n = Self::with_clock(clock);
        n.set_yellow_time(i32::try_from(options.yellow_time).unwrap_or(i32::MAX))?;
        Ok(n)
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn yellow_time(&self) -> u32 {
        self.yellow_time
    }

    /// Only light controllers created afterwards use the new yellow time.
    ///
    /// The network format records a single yellow time, so lights added before this call
    /// come back from [`Network::parse`] with the new value.
    pub fn set_yellow_time(&mut self, yellow_time: i32) -> NetworkResult<()> {
        if yellow_time < 1 {
            return Err(NetworkError::InvalidArgument(format!(
                "yellow time must be at least 1, got {}",
                yellow_time
            )));
        }
        self.yellow_time = yellow_time as u32;
        Ok(())
    }

    pub fn create_intersection(&mut self, name: &str) -> NetworkResult<IntersectionID> {
        if !Intersection::is_valid_name(name) {
            return Err(NetworkError::InvalidId(name.to_string()));
        }
        if self.names.contains_key(name) {
            return Err(NetworkError::DuplicateId(name.to_string()));
        }
        info!("create_intersection {:?}", name);

        let id = self
            .intersections
            .insert_with_key(|id| Intersection::new(id, name.to_string()));
        self.names.insert(name.to_string(), id);

        self.check_invariants();
        Ok(id)
    }

    pub fn connect(&mut self, from: &str, to: &str, default_speed: i32) -> NetworkResult<RouteID> {
        let src = self.id(from)?;
        let dst = self.id(to)?;
        if default_speed < 0 {
            return Err(NetworkError::InvalidArgument(format!(
                "default speed must not be negative, got {}",
                default_speed
            )));
        }
        if self.route_index.contains_key(&(src, dst)) {
            return Err(NetworkError::RouteExists(from.to_string(), to.to_string()));
        }
        info!("connect {:?} -> {:?} at {}", from, to, default_speed);

        let rid = self
            .routes
            .insert_with_key(|id| Route::new(id, src, dst, default_speed));
        self.route_order.push(rid);
        self.route_index.insert((src, dst), rid);

        #[allow(clippy::indexing_slicing)]
        let inter = &mut self.intersections[dst];
        inter.incoming.push(rid);
        if let Some(ref lights) = inter.lights {
            #[allow(clippy::indexing_slicing)]
            let light = self.routes[rid].ensure_light();
            lights.borrow_mut().push(from.to_string(), light);
        }

        self.check_invariants();
        Ok(rid)
    }

    pub fn add_speed_sign(&mut self, from: &str, to: &str, initial_speed: i32) -> NetworkResult<()> {
        let rid = self.route_id(from, to)?;
        if initial_speed < 0 {
            return Err(NetworkError::InvalidArgument(format!(
                "speed sign speed must not be negative, got {}",
                initial_speed
            )));
        }
        info!("add_speed_sign {:?} -> {:?} at {}", from, to, initial_speed);

        let route = unwrap_or!(
            self.routes.get_mut(rid),
            return Err(NetworkError::RouteNotFound(from.to_string(), to.to_string()))
        );
        route.set_speed_sign(SpeedSign {
            current: initial_speed,
        });
        Ok(())
    }

    pub fn set_speed_limit(&mut self, from: &str, to: &str, speed: i32) -> NetworkResult<()> {
        if speed < 0 {
            return Err(NetworkError::InvalidArgument(format!(
                "speed limit must not be negative, got {}",
                speed
            )));
        }
        let rid = self.route_id(from, to)?;
        #[allow(clippy::indexing_slicing)]
        let route = &mut self.routes[rid];
        if !route.has_speed_sign() {
            return Err(NetworkError::NoSpeedSign(route_name(from, to)));
        }
        info!("set_speed_limit {:?} -> {:?} to {}", from, to, speed);

        route.set_speed_sign(SpeedSign { current: speed });
        Ok(())
    }

    pub fn add_sensor(&mut self, from: &str, to: &str, sensor: Sensor) -> NetworkResult<()> {
        let rid = self.route_id(from, to)?;
        #[allow(clippy::indexing_slicing)]
        let route = &mut self.routes[rid];
        if route.has_sensor(sensor.kind()) {
            return Err(NetworkError::DuplicateSensor(
                route_name(from, to),
                sensor.kind(),
            ));
        }
        info!("add_sensor {:?} -> {:?}: {}", from, to, sensor);

        route.insert_sensor(sensor);
        Ok(())
    }

    /// Puts lights on every route into `name`. `order` lists the origins of those routes
    /// in the order they get their green.
    pub fn add_lights<S: AsRef<str>>(
        &mut self,
        name: &str,
        duration: i32,
        order: &[S],
    ) -> NetworkResult<()> {
        let id = self.id(name)?;
        let routes = self.resolve_order(id, order)?;
        let duration = self.check_duration(duration)?;
        info!(
            "add_lights {:?} duration {} order {}",
            name,
            duration,
            order.iter().map(|s| AsRef::<str>::as_ref(s)).join(",")
        );

        let lights = routes
            .iter()
            .map(|&rid| {
                #[allow(clippy::indexing_slicing)]
                let route = &mut self.routes[rid];
                #[allow(clippy::indexing_slicing)]
                let origin = self.intersections[route.src].name().to_string();
                (origin, route.ensure_light())
            })
            .collect();

        let controller = Rc::new(RefCell::new(LightController::new(
            lights,
            self.yellow_time,
            duration,
        )));
        self.clock.register(&controller);

        #[allow(clippy::indexing_slicing)]
        let inter = &mut self.intersections[id];
        inter.incoming = routes;
        inter.lights = Some(controller);

        self.check_invariants();
        Ok(())
    }

    pub fn change_light_duration(&mut self, name: &str, duration: i32) -> NetworkResult<()> {
        let inter = self.intersection(name)?;
        let lights = unwrap_or!(
            inter.lights.as_ref(),
            return Err(NetworkError::NoTrafficLights(name.to_string()))
        );
        let duration = self.check_duration(duration)?;
        // the controller may predate a smaller network yellow time
        let own_yellow = lights.borrow().yellow_time();
        if duration <= own_yellow {
            return Err(NetworkError::InvalidArgument(format!(
                "light duration must be at least {}, got {}",
                own_yellow + 1,
                duration
            )));
        }
        debug!("change_light_duration {:?} to {}", name, duration);

        lights.borrow_mut().set_duration(duration);
        Ok(())
    }

    /// Adds the reverse of an existing route, driven at the forward route's current speed
    pub fn make_two_way(&mut self, from: &str, to: &str) -> NetworkResult<RouteID> {
        let fwd = self.route(from, to)?;
        let speed = fwd.speed();
        let has_sign = fwd.has_speed_sign();
        if self.route(to, from).is_ok() {
            return Err(NetworkError::RouteExists(to.to_string(), from.to_string()));
        }

        let rid = self.connect(to, from, speed)?;
        if has_sign {
            if let Some(reverse) = self.routes.get_mut(rid) {
                reverse.set_speed_sign(SpeedSign { current: speed });
            }
        }
        Ok(rid)
    }

    /// Slows down the signs of every route entering `name`, without going below the cutoff.
    pub fn reduce_incoming_speed_signs(&mut self, name: &str) -> NetworkResult<()> {
        let id = self.id(name)?;
        info!("reduce_incoming_speed_signs {:?}", name);

        let inter = unwrap_or!(
            self.intersections.get(id),
            return Err(NetworkError::IntersectionNotFound(name.to_string()))
        );
        for &rid in &inter.incoming {
            let route = unwrap_cont!(self.routes.get_mut(rid));
            let sign = unwrap_cont!(route.speed_sign());
            if sign.current >= SPEED_REDUCTION_CUTOFF {
                route.set_speed_sign(SpeedSign {
                    current: SPEED_REDUCTION_CUTOFF.max(sign.current - SPEED_REDUCTION_AMOUNT),
                });
            }
        }
        Ok(())
    }

    /// Moves every sensor to its next reading. Sensors keep their own time, separate from the clock.
    pub fn advance_sensors(&mut self) {
        for route in self.routes.values_mut() {
            for sensor in route.sensors_mut() {
                sensor.one_second();
            }
        }
    }

    pub fn congestion(&self, from: &str, to: &str) -> NetworkResult<u8> {
        Ok(self.route(from, to)?.congestion())
    }

    // Lookups
    pub fn id(&self, name: &str) -> NetworkResult<IntersectionID> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::IntersectionNotFound(name.to_string()))
    }

    pub fn intersection(&self, name: &str) -> NetworkResult<&Intersection> {
        let id = self.id(name)?;
        self.intersections
            .get(id)
            .ok_or_else(|| NetworkError::IntersectionNotFound(name.to_string()))
    }

    /// All intersections, sorted by name
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> + '_ {
        self.names
            .values()
            .filter_map(move |&id| self.intersections.get(id))
    }

    pub fn n_intersections(&self) -> usize {
        self.intersections.len()
    }

    pub fn route_id(&self, from: &str, to: &str) -> NetworkResult<RouteID> {
        let src = self.id(from)?;
        let dst = self.id(to)?;
        self.route_index
            .get(&(src, dst))
            .copied()
            .ok_or_else(|| NetworkError::RouteNotFound(from.to_string(), to.to_string()))
    }

    pub fn route(&self, from: &str, to: &str) -> NetworkResult<&Route> {
        let rid = self.route_id(from, to)?;
        self.routes
            .get(rid)
            .ok_or_else(|| NetworkError::RouteNotFound(from.to_string(), to.to_string()))
    }

    /// All routes, in the order they were connected
    pub fn routes(&self) -> impl Iterator<Item = &Route> + '_ {
        self.route_order
            .iter()
            .filter_map(move |&rid| self.routes.get(rid))
    }

    pub fn n_routes(&self) -> usize {
        self.routes.len()
    }

    /// Name of the intersection behind an id handed out by this network
    pub fn name_of(&self, id: IntersectionID) -> &str {
        self.intersections.get(id).map_or("", Intersection::name)
    }

    /// Origins of the routes entering `name`, in their current order
    pub fn incoming(&self, name: &str) -> NetworkResult<Vec<&str>> {
        let inter = self.intersection(name)?;
        Ok(inter
            .incoming
            .iter()
            .filter_map(|&rid| self.routes.get(rid))
            .map(|r| self.name_of(r.src))
            .collect())
    }

    pub fn has_traffic_lights(&self, name: &str) -> NetworkResult<bool> {
        Ok(self.intersection(name)?.has_traffic_lights())
    }

    pub fn light_controller(&self, name: &str) -> NetworkResult<Option<Ref<'_, LightController>>> {
        Ok(self.intersection(name)?.lights())
    }

    /// Equality of everything the network format records: intersections, routes and
    /// their speeds, signs, signals and sensors, and the light controllers.
    pub fn same_content(&self, other: &Network) -> bool {
        if self != other
            || self.yellow_time != other.yellow_time
            || self.routes.len() != other.routes.len()
        {
            return false;
        }

        for (name, &id) in &self.names {
            let Some(&other_id) = other.names.get(name) else {
                return false;
            };
            let (Some(a), Some(b)) = (self.intersections.get(id), other.intersections.get(other_id))
            else {
                return false;
            };

            let same_lights = match (a.lights(), b.lights()) {
                (None, None) => true,
                (Some(x), Some(y)) => {
                    x.duration() == y.duration()
                        && x.yellow_time() == y.yellow_time()
                        && x.order().eq(y.order())
                }
                _ => false,
            };
            if !same_lights || a.incoming.len() != b.incoming.len() {
                return false;
            }

            for (&ra, &rb) in a.incoming.iter().zip(&b.incoming) {
                let (Some(ra), Some(rb)) = (self.routes.get(ra), other.routes.get(rb)) else {
                    return false;
                };
                if self.name_of(ra.src) != other.name_of(rb.src) || !ra.same_content(rb) {
                    return false;
                }
            }
        }
        true
    }

    // Private helpers
    fn check_duration(&self, duration: i32) -> NetworkResult<u32> {
        if (duration as i64) < self.yellow_time as i64 + 1 {
            return Err(NetworkError::InvalidArgument(format!(
                "light duration must be at least {}, got {}",
                self.yellow_time + 1,
                duration
            )));
        }
        Ok(duration as u32)
    }

    fn resolve_order<S: AsRef<str>>(
        &self,
        id: IntersectionID,
        order: &[S],
    ) -> NetworkResult<Vec<RouteID>> {
        let name = self.name_of(id);
        if order.is_empty() {
            return Err(NetworkError::InvalidOrder(format!(
                "empty order for {:?}",
                name
            )));
        }

        let mut routes = Vec::with_capacity(order.len());
        for origin in order {
            let origin: &str = AsRef::<str>::as_ref(origin);
            let src = unwrap_or!(
                self.names.get(origin),
                return Err(NetworkError::InvalidOrder(format!(
                    "{:?} is not an intersection",
                    origin
                )))
            );
            let rid = unwrap_or!(
                self.route_index.get(&(*src, id)),
                return Err(NetworkError::InvalidOrder(format!(
                    "no route from {:?} into {:?}",
                    origin, name
                )))
            );
            routes.push(*rid);
        }

        let mut wanted = routes.clone();
        wanted.sort();
        #[allow(clippy::indexing_slicing)]
        let mut current = self.intersections[id].incoming.clone();
        current.sort();
        if wanted != current {
            return Err(NetworkError::InvalidOrder(format!(
                "{} is not a permutation of the routes into {:?}",
                order.iter().map(|s| AsRef::<str>::as_ref(s)).join(","),
                name
            )));
        }

        Ok(routes)
    }

    #[cfg(not(debug_assertions))]
    pub fn check_invariants(&self) {}

    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) {
        assert_eq!(self.names.len(), self.intersections.len());
        for (name, &id) in &self.names {
            let inter = self.intersections.get(id).expect("named intersection does not exist");
            assert_eq!(inter.name(), name);
            assert_eq!(inter.id, id);

            for &rid in &inter.incoming {
                let route = self.routes.get(rid).expect("incoming route does not exist");
                assert_eq!(route.dst, id);
            }
            if let Some(lights) = inter.lights() {
                assert_eq!(lights.len(), inter.incoming.len());
            }
        }

        assert_eq!(self.route_order.len(), self.routes.len());
        assert_eq!(self.route_index.len(), self.routes.len());
        for &rid in &self.route_order {
            let route = self.routes.get(rid).expect("route does not exist");
            assert_eq!(self.route_index.get(&(route.src, route.dst)), Some(&rid));
            assert!(self
                .intersections
                .get(route.dst)
                .is_some_and(|i| i.incoming.contains(&rid)));
        }
    }
}

impl PartialEq for Network {
    /// Networks are equal when they have the same intersection names
    fn eq(&self, other: &Self) -> bool {
        self.names.keys().eq(other.names.keys())
    }
}

impl Eq for Network {}

pub(crate) fn route_name(from: &str, to: &str) -> String {
    format!("{}{}{}", from, crate::map::FIELD_SEPARATOR, to)
}
