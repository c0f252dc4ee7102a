//! Hex map surface: a retained scene of hex cells, a pan/zoom camera, pointer
//! interaction with pluggable tools and reactive overlay stores kept in sync
//! with the scene.

pub mod camera;
pub mod colors;
pub mod config;
pub mod host;
pub mod interaction;
pub mod lifecycle;
pub mod overlay;
pub mod registry;
pub mod scene;
pub mod surface;
pub mod svg;
pub mod sync;
pub mod tools;
pub mod translator;

pub use camera::{CameraController, CameraTransform};
pub use config::SurfaceConfig;
pub use host::{HeadlessHost, SurfaceHost};
pub use interaction::{InteractionDelegate, InteractionOutcome, PointerEvent, PointerPhase};
pub use lifecycle::Lifecycle;
pub use overlay::{ControlStore, InfluenceStore, MarkerStore, OverlayStore, Subscription};
pub use registry::{MapStores, StoreRegistry};
pub use scene::{OverlayStyle, Scene};
pub use surface::MapSurface;
pub use sync::SceneSync;
pub use tools::Tool;
