mod objects {
    mod intersection;
    mod route;
    mod sensor;

    pub use intersection::*;
    pub use route::*;
    pub use sensor::*;
}

pub use objects::*;

mod clock;
mod congestion;
mod error;
mod loading;
mod network;
mod serializing;
mod traffic_control;

pub use clock::*;
pub use congestion::*;
pub use error::*;
pub use loading::*;
pub use network::*;
pub use traffic_control::*;

/// Separates the fields of a line in the network format
pub const FIELD_SEPARATOR: char = ':';
/// Separates the elements of a list field
pub const LIST_SEPARATOR: char = ',';
/// Lines starting with this are ignored by the loader
pub const COMMENT_PREFIX: char = ';';
