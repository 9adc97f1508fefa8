use log::*;
use photo_core::nalgebra::{Point2, Point3, Vector2};
use photo_pinhole::{
    Distortion, DistortionDescriptor, FishEyeDistortion, PhotogrammetricCamera, RadialDistortion,
    RadiusSearch,
};
use proptest::prelude::*;

fn init() {
    let _ = pretty_env_logger::try_init_timed();
}

fn barrel_camera(coefficients: &[f64]) -> PhotogrammetricCamera {
    let center = Point2::new(512.0, 384.0);
    PhotogrammetricCamera::new(Vector2::new(1000.0, 1000.0), Vector2::new(1024, 768))
        .principal_point(center)
        .distortions(vec![Distortion::Radial(RadialDistortion::new(
            center,
            coefficients,
        ))])
}

#[test]
fn barrel_scenario() {
    init();
    let mut camera = barrel_camera(&[-2e-7, 0.0, 0.0]);
    let solution = camera.set_distortion_radius();
    info!("barrel solution: {:?}", solution);
    assert!(matches!(solution.search, RadiusSearch::Converged(ratio) if ratio > 0.0));
    assert!(camera.radius.r2img < camera.radius.r2max);

    // Points close to the image border come back within a pixel.
    for pixel in [
        Point2::new(1.0, 1.0),
        Point2::new(1023.0, 1.0),
        Point2::new(1.0, 767.0),
        Point2::new(1023.0, 767.0),
        Point2::new(512.0, 767.0),
        Point2::new(1023.0, 384.0),
    ] {
        let undistorted = camera.undistort(pixel).unwrap();
        let distorted = camera.distortions[0].project(undistorted);
        assert!(
            (distorted - pixel).norm() < 1.0,
            "{:?} came back as {:?}",
            pixel,
            distorted
        );
    }
}

#[test]
fn undistorted_pixels_reproject() {
    init();
    let mut camera = barrel_camera(&[-2e-7]);
    camera.set_distortion_radius();
    let pixel = Point2::new(950.0, 80.0);
    let undistorted = camera.undistort(pixel).unwrap();
    // Cast a ray through the undistorted pixel and project it again.
    let f = camera.intrinsics.focals;
    let c = camera.intrinsics.principal_point;
    let depth = 7.0;
    let point = Point3::new(
        (undistorted.x - c.x) / f.x * depth,
        -(undistorted.y - c.y) / f.y * depth,
        -depth,
    );
    let reprojected = camera.distort(point).unwrap();
    assert!((reprojected.xy() - pixel).norm() < 1.0);
}

#[test]
fn mild_barrel_matches_target() {
    init();
    let mut camera = barrel_camera(&[-1e-7, 1e-14, 0.0]);
    let solution = camera.set_distortion_radius();
    let ratio = match solution.search {
        RadiusSearch::Converged(ratio) => ratio,
        other => panic!("search did not converge: {:?}", other),
    };
    // The farthest corner of the image expanded by 100 pixels.
    let center = Point2::new(512.0, 384.0);
    let corner = Point2::new(1124.0, 868.0);
    let undistorted = center + (corner - center) * ratio;
    let error = (camera.distortions[0].project(undistorted) - corner).norm_squared();
    assert!(error < 0.5);
}

#[test]
fn fisheye_radius_is_bounded_by_image() {
    init();
    let center = Point2::new(640.0, 480.0);
    let descriptor = DistortionDescriptor::new("fisheye", center)
        .focal(400.0)
        .radial(vec![0.01]);
    let focals = Vector2::new(400.0, 400.0);
    let mut camera = PhotogrammetricCamera::new(focals, Vector2::new(1280, 960))
        .distortions(vec![Distortion::from(&descriptor)]);
    camera.set_distortion_radius();
    assert!(matches!(
        camera.distortions[0],
        Distortion::FishEye(FishEyeDistortion { equisolid: false, .. })
    ));
    assert_eq!(camera.radius.r2img, camera.radius.r2max);
}

#[test]
fn chained_distortions_use_half_diagonal() {
    init();
    let center = Point2::new(512.0, 384.0);
    let radial = Distortion::Radial(RadialDistortion::new(center, &[-2e-7]));
    let mut camera = barrel_camera(&[-2e-7]).distortions(vec![radial, radial]);
    let solution = camera.set_distortion_radius();
    assert_eq!(solution.search, RadiusSearch::Skipped);
    assert_eq!(camera.radius.r2img, 0.25 * (1124.0 * 1124.0 + 868.0 * 868.0));
    assert_eq!(camera.undistort(center), None);
}

proptest! {
    #[test]
    fn image_radius_never_exceeds_bound(
        r0 in -5e-7..5e-7f64,
        r1 in -1e-13..1e-13f64,
        r2 in -1e-20..1e-20f64,
    ) {
        let mut camera = barrel_camera(&[r0, r1, r2]);
        camera.set_distortion_radius();
        prop_assert!(camera.radius.r2img <= camera.radius.r2max);
        prop_assert!(camera.radius.r2img > 0.0);
    }
}
