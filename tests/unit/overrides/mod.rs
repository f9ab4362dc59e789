use super::*;
use crate::foundation::core::{Aabb, Vec3};
use crate::host::scene_file::{ObjectDef, SceneDef};
use crate::host::{Compositing, MemoryHost, ObjectId, RenderQuality};

fn host() -> MemoryHost {
    let mut scene = SceneDef::default();
    scene.materials.insert("copper".into(), "B87333".into());
    let mut a = ObjectDef::mesh("a", Aabb::new(Vec3::ZERO, Vec3::ONE));
    a.materials = vec![Some("copper".into()), None];
    scene.objects.push(a);
    scene.objects.push(ObjectDef::mesh("b", Aabb::new(Vec3::ZERO, Vec3::ONE)));
    let mut linked = ObjectDef::mesh("lib", Aabb::new(Vec3::ZERO, Vec3::ONE));
    linked.linked = true;
    linked.hide_render = true;
    scene.objects.push(linked);
    scene
        .node_groups
        .entry("Color_group".into())
        .or_default()
        .insert("Solder_Switch".into(), 0.0);
    MemoryHost::from_scene(scene).unwrap()
}

fn ids(h: &MemoryHost) -> (ObjectId, ObjectId, ObjectId) {
    (
        h.find_object("a").unwrap(),
        h.find_object("b").unwrap(),
        h.find_object("lib").unwrap(),
    )
}

fn fail() -> PcboothResult<()> {
    Err(PcboothError::render("boom"))
}

#[test]
fn material_override_restores_slots_after_error() {
    let mut h = host();
    let (a, b, lib) = ids(&h);
    let mut ov = MaterialOverride::new("white", vec![a, b, lib]).with_color([1.0; 3]);
    let err = scoped(&mut h, &mut ov, OnMissing::Fail, |host| {
        assert_eq!(host.material_slots(a), vec![Some("white".into()); 2]);
        assert_eq!(host.material_slots(b), vec![Some("white".to_string())]);
        assert!(host.material_slots(lib).is_empty());
        fail()
    })
    .unwrap_err();
    assert!(err.to_string().contains("boom"));
    assert_eq!(h.material_slots(a), vec![Some("copper".into()), None]);
    assert!(h.material_slots(b).is_empty());
}

#[test]
fn holdout_full_hides_others_and_restores_flags() {
    let mut h = host();
    let (a, b, lib) = ids(&h);
    let mut ov = HoldoutOverride::new(vec![a], true);
    let out = scoped(&mut h, &mut ov, OnMissing::Fail, |host| {
        assert!(host.is_holdout(a));
        assert!(!host.hide_render(a));
        assert!(host.hide_render(b));
        Ok(7)
    })
    .unwrap();
    assert_eq!(out.value, 7);
    assert_eq!(out.availability, Availability::Applied);
    assert!(!h.is_holdout(a));
    assert!(!h.hide_render(b));
    assert!(h.hide_render(lib));
}

#[test]
fn hide_override_restores_render_and_viewport() {
    let mut h = host();
    let (a, b, _) = ids(&h);
    let mut ov = HideOverride::new(vec![a, b], true);
    let _ = scoped(&mut h, &mut ov, OnMissing::Fail, |host| {
        assert!(host.hide_render(a) && host.hide_viewport(b));
        fail()
    });
    assert!(!h.hide_render(a) && !h.hide_viewport(a));
    assert!(!h.hide_render(b) && !h.hide_viewport(b));
}

#[test]
fn render_state_overrides_restore_defaults() {
    let mut h = host();
    let mut comp = CompositingOverride::monochrome_mask();
    let mut quality = RenderQualityOverride::new();
    let mut material = GlobalMaterialOverride::new();
    let result = scoped_all(
        &mut h,
        &mut [&mut quality, &mut comp, &mut material],
        OnMissing::Fail,
        |host| {
            assert_eq!(host.compositing(), Compositing::MonochromeMask);
            assert_eq!(host.render_quality(), RenderQuality::UltraLow);
            assert_eq!(host.global_material_override().as_deref(), Some("_override"));
            fail()
        },
    );
    assert!(result.is_err());
    assert_eq!(h.compositing(), Compositing::Glare);
    assert_eq!(h.render_quality(), RenderQuality::Configured);
    assert_eq!(h.global_material_override(), None);
}

#[test]
fn nested_render_state_overrides_restore_the_outer_state() {
    let mut h = host();
    let mut outer_comp = CompositingOverride::monochrome_mask();
    let mut outer_quality = RenderQualityOverride::new();
    let mut inner_comp = CompositingOverride::new(Compositing::Glare);
    let mut inner_quality = RenderQualityOverride::new();
    scoped_all(
        &mut h,
        &mut [&mut outer_quality, &mut outer_comp],
        OnMissing::Fail,
        |host| {
            scoped_all(
                host,
                &mut [&mut inner_quality, &mut inner_comp],
                OnMissing::Fail,
                |_| Ok(()),
            )?;
            assert_eq!(host.compositing(), Compositing::MonochromeMask);
            assert_eq!(host.render_quality(), RenderQuality::UltraLow);
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(h.compositing(), Compositing::Glare);
    assert_eq!(h.render_quality(), RenderQuality::Configured);
}

#[test]
fn shadow_and_shader_switch_restore() {
    let mut h = host();
    let (a, _, _) = ids(&h);
    let mut shadow = ShadowOverride::new(vec![a]);
    let mut switch = ShaderSwitchOverride::solder();
    scoped_all(&mut h, &mut [&mut shadow, &mut switch], OnMissing::Fail, |host| {
        assert!(!host.visible_shadow(a));
        assert_eq!(host.shader_switch("Color_group", "Solder_Switch"), Some(1.0));
        Ok(())
    })
    .unwrap();
    assert!(h.visible_shadow(a));
    assert_eq!(h.shader_switch("Color_group", "Solder_Switch"), Some(0.0));
}

#[test]
fn dof_override_returns_to_configured_setting() {
    let mut h = host();
    let cam = h.add_camera("cam", None).unwrap();
    let mut ov = DofOverride::new(cam, true);
    scoped(&mut h, &mut ov, OnMissing::Fail, |host| {
        assert!(!host.camera_settings(cam)?.dof.use_dof);
        Ok(())
    })
    .unwrap();
    assert!(h.camera_settings(cam).unwrap().dof.use_dof);
}

fn lift(host: &mut dyn Host, objects: &[ObjectId]) -> PcboothResult<()> {
    for (i, id) in objects.iter().enumerate() {
        host.set_delta_location(*id, Vec3::new(0.0, 0.0, i as f32 + 1.0))?;
    }
    Ok(())
}

#[test]
fn position_override_zeroes_deltas() {
    let mut h = host();
    let (a, b, _) = ids(&h);
    let mut ov = PositionOverride::new(vec![a, b], lift);
    scoped(&mut h, &mut ov, OnMissing::Fail, |host| {
        assert_eq!(host.delta_location(b).z, 2.0);
        Ok(())
    })
    .unwrap();
    assert_eq!(h.delta_location(a), Vec3::ZERO);
    assert_eq!(h.delta_location(b), Vec3::ZERO);
}

#[test]
fn missing_capability_skips_or_fails() {
    let mut h = host().without_capability(Capability::Holdout);
    let (a, _, _) = ids(&h);
    let mut ov = HoldoutOverride::new(vec![a], false);
    let out = scoped(&mut h, &mut ov, OnMissing::Skip, |host| Ok(host.is_holdout(a))).unwrap();
    assert!(!out.value);
    assert_eq!(out.availability, Availability::Unsupported(Capability::Holdout));

    let err = scoped(&mut h, &mut ov, OnMissing::Fail, |_| Ok(())).unwrap_err();
    assert!(matches!(err, PcboothError::Unsupported(Capability::Holdout)));
}

struct FailingRelease;

impl ScopedOverride for FailingRelease {
    fn label(&self) -> &'static str {
        "failing"
    }

    fn acquire(&mut self, _: &mut dyn Host) -> PcboothResult<()> {
        Ok(())
    }

    fn release(&mut self, _: &mut dyn Host) -> PcboothResult<()> {
        Err(PcboothError::host("release failed"))
    }
}

#[test]
fn release_error_never_masks_body_error() {
    let mut h = host();
    let err = scoped(&mut h, &mut FailingRelease, OnMissing::Fail, |_| fail()).unwrap_err();
    assert!(err.to_string().contains("boom"));

    let err = scoped(&mut h, &mut FailingRelease, OnMissing::Fail, |_| Ok(())).unwrap_err();
    assert!(err.to_string().contains("release failed"));
}
