use super::*;
use crate::foundation::core::{Aabb, FrameSpan, Vec3};
use crate::host::MemoryHost;
use crate::host::scene_file::{ObjectDef, SceneDef};

fn setup(dir: &Path, formats: Vec<ImageFormat>) -> (MemoryHost, ObjectId, Renderer) {
    let mut scene = SceneDef::default();
    scene.objects.push(ObjectDef::mesh(
        "board",
        Aabb::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.2)),
    ));
    let mut host = MemoryHost::from_scene(scene).unwrap();
    let camera = host.add_camera("cam", None).unwrap();
    host.set_location(camera, Vec3::new(0.0, 0.0, 20.0)).unwrap();

    let mut config = Config::default();
    config.settings.render_dir = dir.to_path_buf();
    config.settings.image_format = formats;
    config.renderer.thumbnail_width = 16;
    config.renderer.thumbnail_height = 8;
    (host, camera, Renderer::new(&config))
}

#[test]
fn second_render_reuses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let (mut host, cam, mut renderer) = setup(dir.path(), vec![ImageFormat::Png, ImageFormat::Jpeg]);

    renderer.render(&mut host, cam, "topT_transparent").unwrap();
    renderer.render(&mut host, cam, "topT_transparent").unwrap();
    assert_eq!(host.render_count(), 1);
    assert!(dir.path().join("topT_transparent.png").is_file());
    assert!(dir.path().join("topT_transparent.jpg").is_file());

    renderer.clear_cache();
    assert!(!renderer.cache_path().exists());
    renderer.render(&mut host, cam, "topT_transparent").unwrap();
    assert_eq!(host.render_count(), 2);
}

#[test]
fn thumbnail_leaves_cache_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (mut host, cam, mut renderer) = setup(dir.path(), vec![ImageFormat::Png]);

    renderer.render(&mut host, cam, "a").unwrap();
    let before = renderer.cached().unwrap().clone();
    renderer.thumbnail(&mut host, cam, "a").unwrap();
    renderer.render(&mut host, cam, "a").unwrap();

    assert_eq!(renderer.cached().unwrap(), &before);
    assert_eq!(host.render_count(), 1);
    let thumb = image::open(dir.path().join("a_thumbnail.png")).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (16, 8));
    let full = image::open(dir.path().join("a.png")).unwrap();
    assert_eq!(full.to_rgba8(), before);
}

#[test]
fn thumbnail_alone_renders_once() {
    let dir = tempfile::tempdir().unwrap();
    let (mut host, cam, mut renderer) = setup(dir.path(), vec![ImageFormat::Png]);
    renderer.thumbnail(&mut host, cam, "nested/b").unwrap();
    assert_eq!(host.render_count(), 1);
    assert!(dir.path().join("nested/b_thumbnail.png").is_file());
}

#[test]
fn animation_renders_each_frame_once() {
    let dir = tempfile::tempdir().unwrap();
    let (mut host, cam, mut renderer) = setup(dir.path(), vec![ImageFormat::Jpeg]);
    host.set_frame_range(FrameSpan::new(1, 3).unwrap()).unwrap();

    let count = renderer.render_animation(&mut host, cam, "leftT_rightT").unwrap();
    assert_eq!(count, 3);
    assert_eq!(host.render_count(), 3);
    for frame in 1..=3 {
        assert!(dir.path().join(format!("leftT_rightT_{frame:04}.png")).is_file());
    }
    assert!(renderer.cached().is_none());
}

#[test]
fn failed_render_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (mut host, _, mut renderer) = setup(dir.path(), vec![ImageFormat::Png]);
    let not_a_camera = host.find_object("board").unwrap();
    assert!(renderer.render(&mut host, not_a_camera, "x").is_err());
    assert!(renderer.cached().is_none());
}

#[test]
fn jpeg_drops_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let image = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 0]));
    let path = dir.path().join("x.jpg");
    save_image(&image, &path, ImageFormat::Jpeg).unwrap();
    assert_eq!(image::open(&path).unwrap().color(), image::ColorType::Rgb8);
}
