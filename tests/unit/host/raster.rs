use super::*;

fn top_camera(height: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, height))
}

fn settings() -> CameraSettings {
    CameraSettings {
        sensor_width: 36.0,
        lens: 36.0,
        ..CameraSettings::default()
    }
}

#[test]
fn center_projects_to_image_center() {
    let p = Projector::new(top_camera(10.0), &settings(), 100, 100);
    let (x, y, d) = p.project(Vec3::ZERO).unwrap();
    assert!((x - 50.0).abs() < 1e-3);
    assert!((y - 50.0).abs() < 1e-3);
    assert!((d - 10.0).abs() < 1e-3);
    assert!(p.project(Vec3::new(0.0, 0.0, 20.0)).is_none());
}

#[test]
fn box_rect_is_centered_and_clamped() {
    let p = Projector::new(top_camera(10.0), &settings(), 100, 100);
    let r = p
        .rect(Aabb::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)))
        .unwrap();
    assert!(r.x0 < 50 && r.x1 > 50);
    assert!(r.y0 < 50 && r.y1 > 50);

    let huge = p
        .rect(Aabb::new(Vec3::splat(-100.0), Vec3::new(100.0, 100.0, 0.0)))
        .unwrap();
    assert_eq!((huge.x0, huge.y0, huge.x1, huge.y1), (0, 0, 100, 100));
}

#[test]
fn nearer_shapes_win_and_holdout_is_transparent() {
    let far = Shape {
        rect: PixelRect {
            x0: 0,
            y0: 0,
            x1: 4,
            y1: 4,
            depth: 10.0,
        },
        fill: Fill::Color([255, 0, 0, 255]),
    };
    let near = Shape {
        rect: PixelRect {
            x0: 1,
            y0: 1,
            x1: 3,
            y1: 3,
            depth: 5.0,
        },
        fill: Fill::Holdout,
    };
    let img = rasterize(4, 4, vec![near, far], Compositing::Glare);
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(2, 2).0, [0, 0, 0, 0]);

    let mask = rasterize(4, 4, vec![near, far], Compositing::MonochromeMask);
    assert_eq!(mask.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(mask.get_pixel(2, 2).0, [0, 0, 0, 255]);
}

#[test]
fn rgb_conversion_rounds_and_is_opaque() {
    assert_eq!(rgb_to_rgba8([1.0, 0.5, 0.0]), [255, 128, 0, 255]);
}
