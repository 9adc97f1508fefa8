use crate::{CameraSnapshot, TransitionSettings};
use log::*;
use photo_pinhole::PhotogrammetricCamera;

/// What happened during a call to [`TransitionController::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionEvent {
    /// No transition is running.
    Idle,
    /// The current camera was moved to this progress in `[0, 1)`.
    Progress(f64),
    /// The current camera reached the target and the transition was cleared.
    Finished,
}

#[derive(Debug, Clone)]
struct TransitionState {
    from: CameraSnapshot,
    to: CameraSnapshot,
    /// Unset until the first tick after the selection.
    start: Option<f64>,
    duration: f64,
    progress: f64,
}

/// Drives the current view from one camera to another, one frame tick at a time.
///
/// ```
/// use photo_core::nalgebra::Vector2;
/// use photo_pinhole::PhotogrammetricCamera;
/// use photo_transition::{TransitionController, TransitionEvent};
///
/// let start = PhotogrammetricCamera::new(Vector2::new(1000.0, 1000.0), Vector2::new(1024, 768));
/// let target = start.clone().near_far(1.0, 100.0);
/// let mut controller = TransitionController::new(start);
///
/// controller.select(&target);
/// assert_eq!(controller.update(10_000.0), TransitionEvent::Progress(0.0));
/// assert_eq!(controller.update(11_500.0), TransitionEvent::Progress(0.5));
/// assert_eq!(controller.update(13_000.0), TransitionEvent::Finished);
/// assert_eq!(controller.current(), &target);
/// assert_eq!(controller.update(13_100.0), TransitionEvent::Idle);
/// ```
#[derive(Debug, Clone)]
pub struct TransitionController {
    settings: TransitionSettings,
    current: PhotogrammetricCamera,
    state: Option<TransitionState>,
}

impl TransitionController {
    pub fn new(current: PhotogrammetricCamera) -> Self {
        Self {
            settings: TransitionSettings::default(),
            current,
            state: None,
        }
    }

    /// Invalid values in `settings` are logged and replaced by their defaults.
    #[must_use]
    pub fn settings(self, settings: TransitionSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            ..self
        }
    }

    pub fn transition_settings(&self) -> &TransitionSettings {
        &self.settings
    }

    /// The camera of the current view.
    pub fn current(&self) -> &PhotogrammetricCamera {
        &self.current
    }

    /// A shareable copy of the current view.
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot::from(&self.current)
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.is_some()
    }

    /// Progress of the running transition as of the last tick.
    pub fn progress(&self) -> Option<f64> {
        self.state.as_ref().map(|state| state.progress)
    }

    /// The camera the running transition heads to.
    pub fn target(&self) -> Option<&CameraSnapshot> {
        self.state.as_ref().map(|state| &state.to)
    }

    /// Starts a transition from the current view to `target`, replacing any running one.
    ///
    /// The transition starts on the next call to [`TransitionController::update`].
    pub fn select(&mut self, target: impl Into<CameraSnapshot>) {
        let mut to = target.into();
        if self.settings.preserve_zoom && to.zoom != self.current.zoom {
            let mut camera = PhotogrammetricCamera::clone(&to);
            camera.zoom = self.current.zoom;
            camera.update_projection_matrix();
            to = CameraSnapshot::new(camera);
        }
        if let Some(previous) = &self.state {
            debug!(
                "camera {:?} replaces camera {:?} as transition target",
                to.name, previous.to.name
            );
        }
        self.state = Some(TransitionState {
            from: self.snapshot(),
            to,
            start: None,
            duration: self.settings.duration_ms(),
            progress: 0.0,
        });
    }

    /// Advances the running transition to `timestamp`, in milliseconds.
    pub fn update(&mut self, timestamp: f64) -> TransitionEvent {
        let state = match &mut self.state {
            Some(state) => state,
            None => return TransitionEvent::Idle,
        };
        let start = match state.start {
            Some(start) => start,
            None => {
                info!(
                    "transition from camera {:?} to camera {:?} over {} ms",
                    state.from.name, state.to.name, state.duration
                );
                state.start = Some(timestamp);
                timestamp
            }
        };
        if timestamp >= start + state.duration {
            return self.finish();
        }
        let t = ((timestamp - start) / state.duration).max(0.0);
        state.progress = t;
        self.current = state.from.lerp(&state.to, t, &self.settings.radius);
        TransitionEvent::Progress(t)
    }

    /// Jumps to the target of the running transition, returning whether there was one.
    pub fn cancel(&mut self) -> bool {
        match self.finish() {
            TransitionEvent::Finished => true,
            _ => false,
        }
    }

    fn finish(&mut self) -> TransitionEvent {
        match self.state.take() {
            Some(state) => {
                self.current.set_from(&state.to);
                info!("transition to camera {:?} finished", state.to.name);
                TransitionEvent::Finished
            }
            None => TransitionEvent::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_core::nalgebra::Vector2;
    use photo_pinhole::{RadiusBlend, ValidRadius};

    fn camera(focal: f64) -> PhotogrammetricCamera {
        PhotogrammetricCamera::new(Vector2::new(focal, focal), Vector2::new(1024, 768))
    }

    #[test]
    fn idle_without_selection() {
        let mut controller = TransitionController::new(camera(1000.0));
        assert_eq!(controller.update(0.0), TransitionEvent::Idle);
        assert!(!controller.is_transitioning());
        assert_eq!(controller.progress(), None);
        assert!(!controller.cancel());
    }

    #[test]
    fn start_waits_for_first_tick() {
        let mut controller = TransitionController::new(camera(1000.0));
        controller.select(&camera(2000.0));
        assert!(controller.is_transitioning());
        assert_eq!(controller.progress(), Some(0.0));
        assert_eq!(controller.update(50_000.0), TransitionEvent::Progress(0.0));
        assert_eq!(controller.update(50_300.0), TransitionEvent::Progress(0.1));
    }

    #[test]
    fn latest_selection_wins() {
        let mut controller = TransitionController::new(camera(1000.0));
        controller.select(&camera(2000.0).name("first"));
        controller.update(0.0);
        controller.update(1500.0);
        controller.select(&camera(3000.0).name("second"));
        assert_eq!(controller.target().map(|to| to.name.as_str()), Some("second"));

        // The new transition starts from where the previous one was left.
        let halfway = controller.current().intrinsics.focals.x;
        assert!((halfway - 1500.0).abs() < 1e-9);
        controller.update(2000.0);
        assert_eq!(controller.current().intrinsics.focals.x, halfway);
        controller.update(5000.0);
        assert_eq!(controller.current().intrinsics.focals.x, 3000.0);
    }

    #[test]
    fn zoom_survives_selection() {
        let mut start = camera(1000.0);
        start.zoom = 2.0;
        start.update_projection_matrix();
        let mut controller = TransitionController::new(start);
        controller.select(&camera(1000.0));
        controller.update(0.0);
        controller.update(3000.0);
        assert_eq!(controller.current().zoom, 2.0);

        let mut controller = TransitionController::new(controller.current().clone())
            .settings(TransitionSettings::default().preserve_zoom(false));
        controller.select(&camera(1000.0));
        assert!(controller.cancel());
        assert_eq!(controller.current().zoom, 1.0);
    }

    #[test]
    fn zero_duration_finishes_on_first_tick() {
        let mut controller = TransitionController::new(camera(1000.0))
            .settings(TransitionSettings::default().duration(0.0));
        controller.select(&camera(2000.0));
        assert_eq!(controller.update(10.0), TransitionEvent::Finished);
        assert_eq!(controller.current(), &camera(2000.0));
    }

    #[test]
    fn invalid_duration_still_finishes() {
        let mut controller = TransitionController::new(camera(1000.0))
            .settings(TransitionSettings::default().duration(f64::NAN));
        assert_eq!(controller.transition_settings().duration, 3.0);
        controller.select(&camera(2000.0));
        assert_eq!(controller.update(0.0), TransitionEvent::Progress(0.0));
        assert_eq!(controller.update(1e6), TransitionEvent::Finished);
        assert_eq!(controller.current(), &camera(2000.0));
    }

    #[test]
    fn invalid_blend_starts_from_source_radius() {
        let mut from = camera(1000.0);
        from.radius = ValidRadius {
            r2img: 500.0,
            r2max: 1000.0,
        };
        let blend = RadiusBlend {
            shrink_end: 0.0,
            grow_start: 0.8,
        };
        let mut controller = TransitionController::new(from)
            .settings(TransitionSettings::default().radius(blend));
        assert_eq!(controller.transition_settings().radius, RadiusBlend::default());
        controller.select(&camera(2000.0));
        controller.update(0.0);
        assert_eq!(controller.current().radius.r2img, 500.0);
    }

    #[test]
    fn snapshots_do_not_follow_the_view() {
        let mut controller = TransitionController::new(camera(1000.0));
        let before = controller.snapshot();
        controller.select(&camera(2000.0));
        controller.update(0.0);
        controller.update(1000.0);
        assert_eq!(before.intrinsics.focals.x, 1000.0);
        assert!(controller.snapshot().intrinsics.focals.x > 1000.0);
        let shared = before.clone();
        assert!(shared.ptr_eq(&before));
    }
}
