use criterion::{black_box, criterion_group, criterion_main, Criterion};
use photo_core::nalgebra::{Point2, Point3, Vector2};
use photo_pinhole::{
    Distortion, FishEyeDistortion, FraserDistortion, PhotogrammetricCamera, RadialDistortion,
};

fn camera() -> PhotogrammetricCamera {
    let center = Point2::new(512.0, 384.0);
    PhotogrammetricCamera::new(Vector2::new(1000.0, 1000.0), Vector2::new(1024, 768))
        .distortions(vec![Distortion::Radial(RadialDistortion::new(
            center,
            &[-2e-7],
        ))])
}

fn bench_project(c: &mut Criterion) {
    let center = Point2::new(512.0, 384.0);
    let point = Point2::new(900.0, 100.0);
    let radial = Distortion::Radial(RadialDistortion::new(center, &[-2e-7, 1e-14, 0.0]));
    c.bench_function("project_radial", |b| {
        b.iter(|| radial.project(black_box(point)))
    });
    let fraser = Distortion::Fraser(FraserDistortion::new(
        center,
        &[-2e-7, 1e-14, 0.0],
        &[1e-6, -1e-6],
        &[1e-4, 0.0],
    ));
    c.bench_function("project_fraser", |b| {
        b.iter(|| fraser.project(black_box(point)))
    });
    let fisheye = Distortion::FishEye(FishEyeDistortion::new(
        center,
        400.0,
        &[0.01, -0.002],
        &[],
        &[],
    ));
    c.bench_function("project_fisheye", |b| {
        b.iter(|| fisheye.project(black_box(point)))
    });
}

fn bench_camera(c: &mut Criterion) {
    let mut camera = camera();
    c.bench_function("set_distortion_radius", |b| {
        b.iter(|| camera.set_distortion_radius())
    });
    let point = Point3::new(0.3, -0.2, -1.0);
    c.bench_function("camera_project", |b| {
        b.iter(|| camera.project(black_box(point)))
    });
    let pixel = Point2::new(950.0, 80.0);
    c.bench_function("camera_undistort", |b| {
        b.iter(|| camera.undistort(black_box(pixel)))
    });
}

criterion_group!(benches, bench_project, bench_camera);
criterion_main!(benches);
