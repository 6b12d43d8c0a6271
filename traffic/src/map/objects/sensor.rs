use crate::map::{NetworkError, NetworkResult, FIELD_SEPARATOR, LIST_SEPARATOR};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// What a sensor measures. Declaration order is the order of the file codes,
/// so sorting by kind sorts by code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorKind {
    /// Vehicles currently standing on the pad
    PressurePad,
    /// Average speed of passing vehicles
    SpeedCamera,
    /// Vehicles passing per minute
    VehicleCount,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::PressurePad,
        SensorKind::SpeedCamera,
        SensorKind::VehicleCount,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            SensorKind::PressurePad => "PP",
            SensorKind::SpeedCamera => "SC",
            SensorKind::VehicleCount => "VC",
        }
    }

    pub fn from_code(code: &str) -> Option<SensorKind> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    pub fn is_code(s: &str) -> bool {
        Self::from_code(s).is_some()
    }

    /// Congestion in [0, 100] for a single reading against a positive threshold.
    ///
    /// A pressure pad is congested when many vehicles stand on it, while few vehicles
    /// passing a counter or a low average speed mean congestion for the other kinds.
    pub fn congestion(self, reading: u32, threshold: u32) -> u8 {
        if threshold == 0 {
            return 0;
        }
        let ratio = (reading as u64 * 100 / threshold as u64).min(100);
        match self {
            SensorKind::PressurePad => ratio as u8,
            SensorKind::SpeedCamera | SensorKind::VehicleCount => (100 - ratio) as u8,
        }
    }
}

impl Display for SensorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SensorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or(())
    }
}

/// A data driven sensor cycling through a fixed sequence of readings.
#[derive(Clone, Debug)]
pub struct Sensor {
    kind: SensorKind,
    threshold: u32,
    data: Vec<u32>,
    cursor: usize,
}

impl Sensor {
    pub fn new(kind: SensorKind, threshold: u32, data: Vec<u32>) -> NetworkResult<Self> {
        if threshold == 0 {
            return Err(NetworkError::InvalidArgument(format!(
                "{} sensor threshold must be positive",
                kind
            )));
        }
        if data.is_empty() {
            return Err(NetworkError::InvalidArgument(format!(
                "{} sensor needs at least one reading",
                kind
            )));
        }
        Ok(Self {
            kind,
            threshold,
            data,
            cursor: 0,
        })
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    #[allow(clippy::indexing_slicing)]
    pub fn reading(&self) -> u32 {
        self.data[self.cursor]
    }

    pub fn congestion(&self) -> u8 {
        self.kind.congestion(self.reading(), self.threshold)
    }

    /// Moves on to the next reading, wrapping around at the end of the data.
    pub fn one_second(&mut self) {
        self.cursor = (self.cursor + 1) % self.data.len();
    }
}

impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.threshold == other.threshold && self.data == other.data
    }
}

impl Eq for Sensor {}

impl Display for Sensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.kind,
            self.threshold,
            self.data.iter().join(&LIST_SEPARATOR.to_string()),
            sep = FIELD_SEPARATOR
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_cycle() {
        let mut s = Sensor::new(SensorKind::PressurePad, 10, vec![1, 2, 3]).unwrap();
        let mut seen = vec![];
        for _ in 0..5 {
            seen.push(s.reading());
            s.one_second();
        }
        assert_eq!(seen, vec![1, 2, 3, 1, 2]);
    }

    #[test]
    fn congestion_by_kind() {
        assert_eq!(SensorKind::PressurePad.congestion(5, 10), 50);
        assert_eq!(SensorKind::PressurePad.congestion(40, 10), 100);
        assert_eq!(SensorKind::SpeedCamera.congestion(30, 40), 25);
        assert_eq!(SensorKind::SpeedCamera.congestion(80, 40), 0);
        assert_eq!(SensorKind::VehicleCount.congestion(0, 40), 100);
        assert_eq!(SensorKind::VehicleCount.congestion(u32::MAX, 1), 0);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(
            Sensor::new(SensorKind::SpeedCamera, 0, vec![1]),
            Err(NetworkError::InvalidArgument(_))
        ));
        assert!(matches!(
            Sensor::new(SensorKind::SpeedCamera, 5, vec![]),
            Err(NetworkError::InvalidArgument(_))
        ));
    }

    #[test]
    fn display_and_codes() {
        let s = Sensor::new(SensorKind::VehicleCount, 40, vec![4, 5, 6]).unwrap();
        assert_eq!(s.to_string(), "VC:40:4,5,6");
        assert_eq!("SC".parse::<SensorKind>(), Ok(SensorKind::SpeedCamera));
        assert!("XX".parse::<SensorKind>().is_err());
    }

    #[test]
    fn equality_ignores_cursor() {
        let a = Sensor::new(SensorKind::PressurePad, 10, vec![1, 2]).unwrap();
        let mut b = a.clone();
        b.one_second();
        assert_eq!(a, b);
    }
}
