use derive_more::{Deref, From, Into};
use photo_pinhole::PhotogrammetricCamera;
use std::sync::Arc;

/// An immutable copy of a camera, cheap to clone and safe to share between threads.
///
/// It dereferences to the camera it holds.
#[derive(Debug, Clone, PartialEq, Deref, From, Into)]
#[deref(forward)]
pub struct CameraSnapshot(pub Arc<PhotogrammetricCamera>);

impl CameraSnapshot {
    pub fn new(camera: PhotogrammetricCamera) -> Self {
        Self(Arc::new(camera))
    }

    /// Whether both snapshots share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<PhotogrammetricCamera> for CameraSnapshot {
    fn from(camera: PhotogrammetricCamera) -> Self {
        Self::new(camera)
    }
}

impl From<&PhotogrammetricCamera> for CameraSnapshot {
    fn from(camera: &PhotogrammetricCamera) -> Self {
        Self::new(camera.clone())
    }
}
