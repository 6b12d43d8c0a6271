use crate::map::SensorKind;
use thiserror::Error;

/// Rejections of the network mutation API.
/// A failing operation leaves the network untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("intersection {0:?} already exists")]
    DuplicateId(String),
    #[error("{0:?} is not a valid intersection id")]
    InvalidId(String),
    #[error("intersection {0:?} not found")]
    IntersectionNotFound(String),
    #[error("no route from {0:?} to {1:?}")]
    RouteNotFound(String, String),
    #[error("a route from {0:?} to {1:?} already exists")]
    RouteExists(String, String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid light order: {0}")]
    InvalidOrder(String),
    #[error("route {0:?} has no speed sign")]
    NoSpeedSign(String),
    #[error("intersection {0:?} has no traffic lights")]
    NoTrafficLights(String),
    #[error("route {0:?} already has a {1} sensor")]
    DuplicateSensor(String, SensorKind),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
