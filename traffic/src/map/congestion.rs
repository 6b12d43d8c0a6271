use crate::map::Sensor;

/// Mean congestion of the given sensors, rounded half up and clamped to [0, 100].
/// No sensors means no congestion.
pub fn average_congestion<'a>(sensors: impl IntoIterator<Item = &'a Sensor>) -> u8 {
    let (sum, n) = sensors
        .into_iter()
        .fold((0u32, 0u32), |(sum, n), s| (sum + s.congestion() as u32, n + 1));
    if n == 0 {
        return 0;
    }
    ((sum + n / 2) / n).min(100) as u8
}
