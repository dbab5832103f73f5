//! Platform boundaries
//!
//! Capability interfaces for the location service and notification
//! delivery, with the in-process implementations used by the binary and
//! the tests.

pub mod location;
pub mod notification;
pub mod simulated;

pub use location::{
    distance_meters, Geofence, GeofenceErrorKind, GeofencingRequest, LocationError,
    LocationService, TransitionEvent, TransitionType,
};
pub use notification::{ChannelNotifier, LogNotifier, Notification, Notifier, NotifierEvent};
pub use simulated::SimulatedLocationService;
