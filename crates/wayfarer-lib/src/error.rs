use thiserror::Error;

/// Convenient result alias for the Wayfarer library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when adding a stop would exceed the route length cap.
    #[error("route is limited to {max} stops")]
    RouteTooLong { max: usize },

    /// Raised when a stop id does not resolve to a known marker or waypoint.
    #[error("unknown marker id: {id}")]
    UnknownMarker { id: String },

    /// Raised when a stop index does not fall inside the current route.
    #[error("stop index {index} out of range for a route of {len} stops")]
    StopIndexOutOfRange { index: usize, len: usize },

    /// Raised when a marker or terrain feature carries non-finite coordinates.
    #[error("non-finite coordinates on {what} '{id}': ({x}, {y})")]
    NonFiniteCoordinates {
        what: &'static str,
        id: String,
        x: f64,
        y: f64,
    },

    /// Raised when the routing graph cannot be assembled at all.
    #[error("failed to build routing graph: {message}")]
    GraphBuild { message: String },

    /// Raised when a pathfinding endpoint is missing from the graph.
    #[error("graph node not found: {id}")]
    NodeNotFound { id: String },

    /// Raised when a recomputation is requested while one is already running.
    #[error("route calculation already in progress")]
    CalculationInProgress,

    /// Raised when an in-flight recomputation is cancelled cooperatively.
    #[error("route calculation cancelled")]
    Cancelled,
}
