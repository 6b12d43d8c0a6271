use crate::map::{Network, Route, FIELD_SEPARATOR};
use std::fmt::{Display, Formatter, Write};
use std::io;
use std::path::Path;

impl Network {
    /// Canonical text form: header counts and yellow time, intersections sorted by name,
    /// then every route in creation order followed by its sensors sorted by kind.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        common::saveload::save_string(path, &self.serialize())
    }

    /// `from:to:defaultSpeed:numSensors[:signSpeed]`, without the sensor lines
    pub fn route_line(&self, route: &Route) -> String {
        let mut line = format!(
            "{from}{sep}{to}{sep}{speed}{sep}{n}",
            from = self.name_of(route.src),
            to = self.name_of(route.dst),
            speed = route.default_speed(),
            n = route.n_sensors(),
            sep = FIELD_SEPARATOR
        );
        if let Some(sign) = route.speed_sign() {
            let _ = write!(line, "{}{}", FIELD_SEPARATOR, sign.current);
        }
        line
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.n_intersections())?;
        writeln!(f, "{}", self.n_routes())?;
        writeln!(f, "{}", self.yellow_time())?;

        for inter in self.intersections() {
            writeln!(f, "{}", inter)?;
        }

        for route in self.routes() {
            writeln!(f, "{}", self.route_line(route))?;
            for sensor in route.sensors() {
                writeln!(f, "{}", sensor)?;
            }
        }
        Ok(())
    }
}
