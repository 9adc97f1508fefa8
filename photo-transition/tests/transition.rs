use approx::assert_relative_eq;
use log::*;
use photo_core::nalgebra::{Point2, Point3, UnitQuaternion, Vector2, Vector3};
use photo_core::CameraPose;
use photo_pinhole::{Distortion, PhotogrammetricCamera, RadialDistortion};
use photo_transition::{CameraSnapshot, TransitionController, TransitionEvent};
use std::f64::consts::FRAC_PI_2;

fn init() {
    let _ = pretty_env_logger::try_init_timed();
}

fn distorted_camera(name: &str, pose: CameraPose) -> PhotogrammetricCamera {
    let center = Point2::new(512.0, 384.0);
    let mut camera =
        PhotogrammetricCamera::new(Vector2::new(1000.0, 1000.0), Vector2::new(1024, 768))
            .name(name)
            .distortions(vec![Distortion::Radial(RadialDistortion::new(
                center,
                &[-2e-7],
            ))])
            .pose(pose);
    camera.set_distortion_radius();
    camera
}

fn cameras() -> (PhotogrammetricCamera, PhotogrammetricCamera) {
    let from = distorted_camera("front", CameraPose::identity());
    let to = distorted_camera(
        "side",
        CameraPose::new(
            Point3::new(2.0, 0.0, 1.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
        ),
    );
    (from, to)
}

#[test]
fn halfway_through_quarter_turn() {
    init();
    let (from, to) = cameras();
    assert!(from.radius.r2img > 0.0);
    let mut controller = TransitionController::new(from.clone());
    controller.select(&to);

    let start = 120_000.0;
    assert_eq!(controller.update(start), TransitionEvent::Progress(0.0));
    let event = controller.update(start + 1500.0);
    info!("halfway event: {:?}", event);
    assert_eq!(event, TransitionEvent::Progress(0.5));

    let current = controller.current();
    assert_eq!(current.radius.r2img, 0.0);
    assert_eq!(current.distortions, from.distortions);
    assert_relative_eq!(current.pose.orientation.angle(), FRAC_PI_2 / 2.0, epsilon = 1e-9);
    assert_relative_eq!(
        current.pose.position,
        Point3::new(1.0, 0.0, 0.5),
        epsilon = 1e-12
    );
}

#[test]
fn endpoints_match_cameras() {
    init();
    let (from, to) = cameras();
    let mut controller = TransitionController::new(from.clone());
    controller.select(CameraSnapshot::new(to.clone()));

    controller.update(0.0);
    let current = controller.current();
    assert_relative_eq!(current.pose.orientation, from.pose.orientation, epsilon = 1e-12);
    assert_relative_eq!(current.radius.r2img, from.radius.r2img, epsilon = 1e-6);
    assert_relative_eq!(
        current.matrices().projection,
        from.matrices().projection,
        epsilon = 1e-9
    );

    // Frames are rarely on time, the last one overshoots.
    assert!(matches!(
        controller.update(2999.0),
        TransitionEvent::Progress(t) if t < 1.0
    ));
    assert_eq!(controller.update(3016.0), TransitionEvent::Finished);
    assert_eq!(controller.current(), &to);
    assert!(!controller.is_transitioning());
}

#[test]
fn radius_fades_through_pinhole() {
    init();
    let (from, to) = cameras();
    let mut controller = TransitionController::new(from.clone());
    controller.select(&to);
    controller.update(0.0);

    let mut previous = f64::INFINITY;
    for ms in (0..600).step_by(50) {
        controller.update(ms as f64);
        let r2img = controller.current().radius.r2img;
        assert!(r2img <= previous);
        assert!(r2img <= controller.current().radius.r2max);
        previous = r2img;
    }
    for ms in (600..2400).step_by(100) {
        controller.update(ms as f64);
        assert_eq!(controller.current().radius.r2img, 0.0);
    }
    controller.update(2700.0);
    let r2img = controller.current().radius.r2img;
    assert!(r2img > 0.0 && r2img < to.radius.r2img);
}
