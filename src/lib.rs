pub mod config;
pub mod coordinator;
pub mod error;
pub mod io;
pub mod observer;
pub mod placement;
pub mod registry;
pub mod scene;
pub mod session;
pub mod types;
pub mod visualization;

pub use config::{IndicatorColor, TrackingConfig};
pub use coordinator::TrackingCoordinator;
pub use error::{Result, TrackingError};
pub use observer::{ImageTrackingObserver, LoggingObserver};
pub use placement::IndicatorGeometry;
pub use registry::ImageRegistry;
pub use scene::SceneRoot;
pub use session::{EventSender, TrackingSession};
pub use types::{DetectedImage, ImageId, LifecycleEvent, PlacementOffset, PoseMatrix};
