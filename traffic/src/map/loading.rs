use crate::map::network::route_name;
use crate::map::{
    Clock, Network, NetworkError, Sensor, SensorKind, COMMENT_PREFIX,
    FIELD_SEPARATOR, LIST_SEPARATOR,
};
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// A file may end with at most this many newlines
const MAX_TRAILING_NEWLINES: usize = 2;

#[derive(Error, Debug)]
pub enum FormatCause {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("{field} {value:?} is not a number")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be at least {min}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
    },
    #[error("empty field")]
    EmptyField,
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: &'static str, found: usize },
    #[error("declared {declared} {what} but found {found}")]
    CountMismatch {
        what: &'static str,
        declared: usize,
        found: usize,
    },
    #[error("unknown intersection {0:?}")]
    UnknownIntersection(String),
    #[error("route {0:?} is declared twice")]
    DuplicateRoute(String),
    #[error("{0:?} is reserved for sensors and cannot name an intersection")]
    ReservedId(String),
    #[error("unknown sensor kind {0:?}")]
    UnknownSensorKind(String),
    #[error("route {route:?} declares {declared} sensors but {found} follow")]
    SensorCount {
        route: String,
        declared: usize,
        found: usize,
    },
    #[error("{0} newlines at the end of the file")]
    TrailingNewlines(usize),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// The text does not describe a valid network. Nothing is kept from a failed parse.
#[derive(Error, Debug)]
#[error("malformed network at line {line}: {cause}")]
pub struct InvalidNetworkFormat {
    /// 1-based, counting comment lines
    pub line: usize,
    #[source]
    pub cause: FormatCause,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("reading network file: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Format(#[from] InvalidNetworkFormat),
}

pub fn load(path: impl AsRef<Path>) -> Result<Network, LoadError> {
    load_with_clock(path, Clock::new())
}

/// Loads a network whose light controllers are ticked by `clock`
pub fn load_with_clock(path: impl AsRef<Path>, clock: Clock) -> Result<Network, LoadError> {
    let path = path.as_ref();
    let text = common::saveload::load_string(path)?;
    let n = Network::parse_with_clock(&text, clock)?;
    info!(
        "loaded network from {} with {} intersections and {} routes",
        path.display(),
        n.n_intersections(),
        n.n_routes()
    );
    Ok(n)
}

impl Network {
    pub fn parse(text: &str) -> Result<Network, InvalidNetworkFormat> {
        Self::parse_with_clock(text, Clock::new())
    }

    pub fn parse_with_clock(text: &str, clock: Clock) -> Result<Network, InvalidNetworkFormat> {
        let mut p = Parser::new(text)?;

        let n_intersections = p.header("number of intersections", 0)? as usize;
        let n_routes = p.header("number of routes", 0)? as usize;
        let yellow_time = p.header("yellow time", 1)?;

        let mut net = Network::with_clock(clock);
        net.set_yellow_time(yellow_time)
            .map_err(|e| p.error_here(e.into()))?;

        let lights = p.intersections(&mut net, n_intersections)?;
        p.routes(&mut net, n_routes)?;

        // lights last, they need every incoming route
        for light in lights {
            let duration = number("light duration", light.duration, yellow_time.saturating_add(1))
                .map_err(|cause| light.line.error(cause))?;
            let order = list(light.order).map_err(|cause| light.line.error(cause))?;
            net.add_lights(light.name, duration, &order)
                .map_err(|e| light.line.error(e.into()))?;
        }

        Ok(net)
    }
}

impl FromStr for Network {
    type Err = InvalidNetworkFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::parse(s)
    }
}

#[derive(Copy, Clone)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

impl<'a> Line<'a> {
    fn error(&self, cause: FormatCause) -> InvalidNetworkFormat {
        InvalidNetworkFormat {
            line: self.number,
            cause,
        }
    }

    fn fields(&self) -> Result<Vec<&'a str>, InvalidNetworkFormat> {
        let fields: Vec<&str> = self.text.split(FIELD_SEPARATOR).collect();
        if fields.iter().any(|f| f.is_empty()) {
            return Err(self.error(FormatCause::EmptyField));
        }
        Ok(fields)
    }
}

struct LightLine<'a> {
    line: Line<'a>,
    name: &'a str,
    duration: &'a str,
    order: &'a str,
}

fn number(field: &'static str, value: &str, min: i32) -> Result<i32, FormatCause> {
    let v = value
        .parse::<i32>()
        .map_err(|_| FormatCause::NotANumber {
            field,
            value: value.to_string(),
        })?;
    if v < min {
        return Err(FormatCause::OutOfRange {
            field,
            value: v,
            min,
        });
    }
    Ok(v)
}

fn list(value: &str) -> Result<Vec<&str>, FormatCause> {
    let elements: Vec<&str> = value.split(LIST_SEPARATOR).collect();
    if elements.iter().any(|e| e.is_empty()) {
        return Err(FormatCause::EmptyField);
    }
    Ok(elements)
}

fn route_cause(e: NetworkError) -> FormatCause {
    match e {
        NetworkError::IntersectionNotFound(name) => FormatCause::UnknownIntersection(name),
        NetworkError::RouteExists(from, to) => FormatCause::DuplicateRoute(route_name(&from, &to)),
        e => FormatCause::Network(e),
    }
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    // line number reported when the input ends too early
    last_line: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Result<Self, InvalidNetworkFormat> {
        let mut lines: Vec<Line<'a>> = text
            .split('\n')
            .enumerate()
            .map(|(i, l)| Line {
                number: i + 1,
                text: l.strip_suffix('\r').unwrap_or(l),
            })
            .filter(|l| !l.text.starts_with(COMMENT_PREFIX))
            .collect();

        // each trailing empty entry stands for one newline at the end of the text
        let trailing = lines.iter().rev().take_while(|l| l.text.is_empty()).count();
        if trailing > MAX_TRAILING_NEWLINES {
            let line = lines.last().map_or(0, |l| l.number);
            return Err(InvalidNetworkFormat {
                line,
                cause: FormatCause::TrailingNewlines(trailing),
            });
        }
        lines.truncate(lines.len() - trailing);

        let last_line = lines.last().map_or(0, |l| l.number);
        Ok(Self {
            lines,
            pos: 0,
            last_line,
        })
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Line<'a>> {
        let l = self.peek()?;
        self.pos += 1;
        Some(l)
    }

    fn error_here(&self, cause: FormatCause) -> InvalidNetworkFormat {
        InvalidNetworkFormat {
            line: self.peek().map_or(self.last_line, |l| l.number),
            cause,
        }
    }

    fn header(&mut self, field: &'static str, min: i32) -> Result<i32, InvalidNetworkFormat> {
        let line = unwrap_or!(
            self.next(),
            return Err(self.error_here(FormatCause::Missing(field)))
        );
        number(field, line.text, min).map_err(|cause| line.error(cause))
    }

    /// Reads intersection lines until the first route line, lights are returned to be added
    /// once the routes exist.
    fn intersections(
        &mut self,
        net: &mut Network,
        declared: usize,
    ) -> Result<Vec<LightLine<'a>>, InvalidNetworkFormat> {
        let mut lights = vec![];
        let mut found = 0;

        while let Some(line) = self.peek() {
            let fields = line.fields()?;
            let (name, light) = match *fields {
                [name] => (name, None),
                [name, duration, order] => (name, Some((duration, order))),
                _ => break,
            };
            self.next();

            if SensorKind::is_code(name) {
                return Err(line.error(FormatCause::ReservedId(name.to_string())));
            }
            net.create_intersection(name)
                .map_err(|e| line.error(e.into()))?;

            if let Some((duration, order)) = light {
                lights.push(LightLine {
                    line,
                    name,
                    duration,
                    order,
                });
            }
            found += 1;
        }

        if found != declared {
            return Err(self.error_here(FormatCause::CountMismatch {
                what: "intersections",
                declared,
                found,
            }));
        }
        Ok(lights)
    }

    fn routes(&mut self, net: &mut Network, declared: usize) -> Result<(), InvalidNetworkFormat> {
        let mut found = 0;
        let mut previous: Option<(String, usize)> = None;

        while let Some(line) = self.next() {
            let fields = line.fields()?;
            let [from, to, speed, n_sensors, rest @ ..] = fields.as_slice() else {
                if fields.len() == 3 && SensorKind::is_code(fields[0]) {
                    if let Some((route, n)) = previous {
                        return Err(line.error(FormatCause::SensorCount {
                            route,
                            declared: n,
                            found: n + 1,
                        }));
                    }
                }
                return Err(line.error(FormatCause::FieldCount {
                    expected: "4 or 5",
                    found: fields.len(),
                }));
            };
            if rest.len() > 1 {
                return Err(line.error(FormatCause::FieldCount {
                    expected: "4 or 5",
                    found: fields.len(),
                }));
            }

            let speed = number("default speed", speed, 0).map_err(|cause| line.error(cause))?;
            let n_sensors =
                number("number of sensors", n_sensors, 0).map_err(|cause| line.error(cause))?
                    as usize;
            net.connect(from, to, speed)
                .map_err(|e| line.error(route_cause(e)))?;

            if let Some(sign) = rest.first() {
                let sign = number("speed sign speed", sign, 0).map_err(|cause| line.error(cause))?;
                net.add_speed_sign(from, to, sign)
                    .map_err(|e| line.error(e.into()))?;
            }

            for i in 0..n_sensors {
                let sensor = self.sensor(route_name(from, to), n_sensors, i)?;
                net.add_sensor(from, to, sensor)
                    .map_err(|e| self.error_at_previous(e.into()))?;
            }

            previous = Some((route_name(from, to), n_sensors));
            found += 1;
        }

        if found != declared {
            return Err(self.error_here(FormatCause::CountMismatch {
                what: "routes",
                declared,
                found,
            }));
        }
        Ok(())
    }

    /// Reads the `found`th of the `declared` sensors of `route`
    fn sensor(
        &mut self,
        route: String,
        declared: usize,
        found: usize,
    ) -> Result<Sensor, InvalidNetworkFormat> {
        let missing = FormatCause::SensorCount {
            route,
            declared,
            found,
        };
        let line = unwrap_or!(self.peek(), return Err(self.error_here(missing)));
        let fields = line.fields()?;
        let [kind, threshold, data] = *fields else {
            return Err(line.error(missing));
        };
        self.next();

        let kind = SensorKind::from_code(kind)
            .ok_or_else(|| line.error(FormatCause::UnknownSensorKind(kind.to_string())))?;
        let threshold =
            number("sensor threshold", threshold, 1).map_err(|cause| line.error(cause))?;
        let data = list(data)
            .and_then(|data| {
                data.into_iter()
                    .map(|d| number("sensor reading", d, 0).map(|d| d as u32))
                    .collect::<Result<Vec<u32>, _>>()
            })
            .map_err(|cause| line.error(cause))?;

        Sensor::new(kind, threshold as u32, data).map_err(|e| line.error(e.into()))
    }

    fn error_at_previous(&self, cause: FormatCause) -> InvalidNetworkFormat {
        let line = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map_or(self.last_line, |l| l.number);
        InvalidNetworkFormat { line, cause }
    }
}
