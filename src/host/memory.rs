//! In-memory [`Host`] over a [`SceneDef`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::foundation::core::{
    Aabb, FrameSpan, Mat4, Quat, Vec3, euler_to_quat, hex_to_rgb, quat_to_euler,
};
use crate::foundation::error::{PcboothError, PcboothResult};
use crate::foundation::fs::ensure_parent_dir;
use crate::host::raster::{self, Fill, Projector, Shape};
use crate::host::scene_file::{BackgroundDef, ObjectDef, SceneDef};
use crate::host::{
    Action, CameraSettings, Capability, Compositing, Host, KeyChannel, LightParams, ObjectId,
    ObjectKind, RenderQuality, RenderSettings,
};

const DEFAULT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

#[derive(Clone, Debug)]
struct Node {
    name: String,
    kind: ObjectKind,
    parent: Option<ObjectId>,
    parent_inverse: Mat4,
    location: Vec3,
    rotation: Vec3,
    scale: Vec3,
    delta_location: Vec3,
    delta_rotation: Vec3,
    geometry: Option<Aabb>,
    collections: Vec<String>,
    properties: BTreeMap<String, serde_json::Value>,
    linked: bool,
    materials: Vec<Option<String>>,
    color: [f32; 3],
    hide_render: bool,
    hide_viewport: bool,
    holdout: bool,
    visible_shadow: bool,
    camera: Option<CameraSettings>,
    light: Option<LightParams>,
    action: Option<Action>,
}

impl Node {
    fn new(name: &str, kind: ObjectKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            parent: None,
            parent_inverse: Mat4::IDENTITY,
            location: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            delta_location: Vec3::ZERO,
            delta_rotation: Vec3::ZERO,
            geometry: None,
            collections: Vec::new(),
            properties: BTreeMap::new(),
            linked: false,
            materials: Vec::new(),
            color: DEFAULT_COLOR,
            hide_render: false,
            hide_viewport: false,
            holdout: false,
            visible_shadow: true,
            camera: (kind == ObjectKind::Camera).then(CameraSettings::default),
            light: (kind == ObjectKind::Light).then(LightParams::default),
            action: None,
        }
    }

    fn rotation_quat(&self) -> Quat {
        euler_to_quat(self.rotation) * euler_to_quat(self.delta_rotation)
    }

    fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation_quat(),
            self.location + self.delta_location,
        )
    }
}

/// Scene graph held in memory with a bounding-box rasterizer as its render backend.
#[derive(Clone, Debug)]
pub struct MemoryHost {
    nodes: Vec<Option<Node>>,
    collections: BTreeSet<String>,
    materials: BTreeMap<String, [f32; 3]>,
    global_material: Option<String>,
    backgrounds: Vec<BackgroundDef>,
    node_groups: BTreeMap<String, BTreeMap<String, f32>>,
    emission: bool,
    render: RenderSettings,
    compositing: Compositing,
    quality: RenderQuality,
    active_camera: Option<ObjectId>,
    frame_range: FrameSpan,
    frame: i32,
    source: Option<PathBuf>,
    capabilities: HashSet<Capability>,
    renders: usize,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            collections: BTreeSet::new(),
            materials: BTreeMap::new(),
            global_material: None,
            backgrounds: Vec::new(),
            node_groups: BTreeMap::new(),
            emission: true,
            render: RenderSettings {
                width: 64,
                height: 64,
                samples: 1,
                film_transparent: true,
            },
            compositing: Compositing::Glare,
            quality: RenderQuality::Configured,
            active_camera: None,
            frame_range: FrameSpan { start: 1, end: 1 },
            frame: 1,
            source: None,
            capabilities: [
                Capability::Holdout,
                Capability::MaterialOverride,
                Capability::MaterialSlots,
                Capability::Compositing,
                Capability::RenderQuality,
                Capability::ShadowVisibility,
                Capability::DepthOfField,
                Capability::ShaderSwitch,
                Capability::Keyframes,
            ]
            .into_iter()
            .collect(),
            renders: 0,
        }
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip(scene))]
    pub fn from_scene(scene: SceneDef) -> PcboothResult<Self> {
        let mut host = Self::new();
        host.collections.extend(scene.collections.iter().cloned());
        for (name, hex) in &scene.materials {
            host.materials.insert(name.clone(), hex_to_rgb(hex)?);
        }
        host.backgrounds = scene.backgrounds;
        host.node_groups = scene.node_groups;

        for def in &scene.objects {
            if host.find_object(&def.name).is_some() {
                return Err(PcboothError::host(format!(
                    "duplicate object name '{}' in scene",
                    def.name
                )));
            }
            let mut node = Node::new(&def.name, def.kind);
            node.location = def.location;
            node.rotation = Vec3::new(
                def.rotation.x.to_radians(),
                def.rotation.y.to_radians(),
                def.rotation.z.to_radians(),
            );
            node.scale = def.scale;
            node.geometry = if def.kind == ObjectKind::Mesh {
                def.bounds
            } else {
                None
            };
            node.collections = def.collections.clone();
            node.properties = def.properties.clone();
            node.linked = def.linked;
            node.materials = def.materials.clone();
            node.hide_render = def.hide_render;
            if let Some(hex) = &def.color {
                node.color = hex_to_rgb(hex)?;
            }
            if def.camera.is_some() {
                node.camera = def.camera;
            }
            if def.light.is_some() {
                node.light = def.light;
            }
            host.collections.extend(def.collections.iter().cloned());
            host.nodes.push(Some(node));
        }

        // Parents resolve after every object exists; the file stores local transforms.
        for def in &scene.objects {
            let Some(parent) = &def.parent else { continue };
            let child = host.require(&def.name)?;
            let parent = host.require(parent)?;
            if host.is_ancestor(child, parent) {
                return Err(PcboothError::host(format!(
                    "parenting '{}' under '{}' creates a cycle",
                    def.name,
                    host.name(parent)
                )));
            }
            host.node_mut(child)?.parent = Some(parent);
        }

        for (object, mut action) in scene.actions {
            let id = host.require(&object)?;
            action.normalize();
            host.node_mut(id)?.action = Some(action);
        }

        tracing::debug!(objects = host.nodes.len(), "loaded scene");
        Ok(host)
    }

    pub fn load(path: &Path) -> PcboothResult<Self> {
        let mut host = Self::from_scene(SceneDef::load(path)?)?;
        host.source = Some(path.to_path_buf());
        Ok(host)
    }

    /// Drop a capability, for exercising degraded hosts.
    pub fn without_capability(mut self, capability: Capability) -> Self {
        self.capabilities.remove(&capability);
        self
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn active_camera(&self) -> Option<ObjectId> {
        self.active_camera
    }

    pub fn emission_enabled(&self) -> bool {
        self.emission
    }

    pub fn render_settings(&self) -> RenderSettings {
        self.render
    }

    pub fn material_color(&self, name: &str) -> Option<[f32; 3]> {
        self.materials.get(name).copied()
    }

    /// Snapshot of the current state as a scene description.
    pub fn to_scene(&self) -> SceneDef {
        let mut scene = SceneDef {
            collections: self.collections.iter().cloned().collect(),
            backgrounds: self.backgrounds.clone(),
            node_groups: self.node_groups.clone(),
            ..SceneDef::default()
        };
        for (name, rgb) in &self.materials {
            let [r, g, b, _] = raster::rgb_to_rgba8(*rgb);
            scene.materials.insert(name.clone(), format!("{r:02X}{g:02X}{b:02X}"));
        }
        for (id, node) in self.live() {
            // Saved transforms are relative to the parent's world matrix.
            let local = node.parent_inverse * node.local_matrix();
            let (scale, rot, loc) = local.to_scale_rotation_translation();
            let rot = quat_to_euler(rot);
            let [r, g, b, _] = raster::rgb_to_rgba8(node.color);
            scene.objects.push(ObjectDef {
                name: node.name.clone(),
                kind: node.kind,
                parent: node.parent.map(|p| self.name(p).to_string()),
                location: loc,
                rotation: Vec3::new(rot.x.to_degrees(), rot.y.to_degrees(), rot.z.to_degrees()),
                scale,
                bounds: node.geometry,
                collections: node.collections.clone(),
                properties: node.properties.clone(),
                linked: node.linked,
                materials: node.materials.clone(),
                color: Some(format!("{r:02X}{g:02X}{b:02X}")),
                hide_render: node.hide_render,
                camera: node.camera,
                light: node.light,
            });
            if let Some(action) = &node.action {
                scene.actions.insert(self.name(id).to_string(), action.clone());
            }
        }
        scene
    }

    fn live(&self) -> impl Iterator<Item = (ObjectId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (ObjectId(i), n)))
    }

    fn node(&self, id: ObjectId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ObjectId) -> PcboothResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| PcboothError::host(format!("object {id:?} does not exist")))
    }

    fn require(&self, name: &str) -> PcboothResult<ObjectId> {
        self.find_object(name)
            .ok_or_else(|| PcboothError::host(format!("object '{name}' does not exist")))
    }

    fn is_ancestor(&self, ancestor: ObjectId, mut id: ObjectId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn add_node(&mut self, name: &str, kind: ObjectKind, collection: Option<&str>) -> ObjectId {
        let mut node = Node::new(name, kind);
        if let Some(c) = collection {
            self.collections.insert(c.to_string());
            node.collections.push(c.to_string());
        }
        self.nodes.push(Some(node));
        ObjectId(self.nodes.len() - 1)
    }

    fn parent_matrix(&self, node: &Node) -> Mat4 {
        match node.parent {
            Some(p) => self.matrix_world(p) * node.parent_inverse,
            None => node.parent_inverse,
        }
    }

    fn channel_value(&self, id: ObjectId, channel: KeyChannel) -> PcboothResult<Vec3> {
        let node = self
            .node(id)
            .ok_or_else(|| PcboothError::host(format!("object {id:?} does not exist")))?;
        let missing =
            || PcboothError::host(format!("'{}' has no data for {channel:?} keys", node.name));
        Ok(match channel {
            KeyChannel::Location => node.location,
            KeyChannel::Rotation => node.rotation,
            KeyChannel::DeltaLocation => node.delta_location,
            KeyChannel::SensorWidth => Vec3::X * node.camera.ok_or_else(missing)?.sensor_width,
            KeyChannel::FocusDistance => {
                Vec3::X * node.camera.ok_or_else(missing)?.dof.focus_distance
            }
            KeyChannel::Aperture => Vec3::X * node.camera.ok_or_else(missing)?.dof.aperture,
            KeyChannel::LightEnergy => Vec3::X * node.light.ok_or_else(missing)?.energy,
            KeyChannel::LightSize => {
                let l = node.light.ok_or_else(missing)?;
                Vec3::new(l.size, l.size_y, 0.0)
            }
        })
    }

    fn apply_channel(node: &mut Node, channel: KeyChannel, v: Vec3) {
        match channel {
            KeyChannel::Location => node.location = v,
            KeyChannel::Rotation => node.rotation = v,
            KeyChannel::DeltaLocation => node.delta_location = v,
            KeyChannel::SensorWidth => {
                if let Some(c) = node.camera.as_mut() {
                    c.sensor_width = v.x;
                }
            }
            KeyChannel::FocusDistance => {
                if let Some(c) = node.camera.as_mut() {
                    c.dof.focus_distance = v.x;
                }
            }
            KeyChannel::Aperture => {
                if let Some(c) = node.camera.as_mut() {
                    c.dof.aperture = v.x;
                }
            }
            KeyChannel::LightEnergy => {
                if let Some(l) = node.light.as_mut() {
                    l.energy = v.x;
                }
            }
            KeyChannel::LightSize => {
                if let Some(l) = node.light.as_mut() {
                    l.size = v.x;
                    l.size_y = v.y;
                }
            }
        }
    }

    fn fill_for(&self, node: &Node) -> Fill {
        if node.holdout {
            return Fill::Holdout;
        }
        let material = self
            .global_material
            .as_deref()
            .or_else(|| node.materials.iter().flatten().next().map(String::as_str));
        let rgb = material
            .and_then(|m| self.materials.get(m).copied())
            .unwrap_or(node.color);
        Fill::Color(raster::rgb_to_rgba8(rgb))
    }
}

impl Host for MemoryHost {
    fn objects(&self) -> Vec<ObjectId> {
        self.live().map(|(id, _)| id).collect()
    }

    fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.live().find(|(_, n)| n.name == name).map(|(id, _)| id)
    }

    fn has_collection(&self, name: &str) -> bool {
        self.collections.contains(name)
    }

    fn collection_objects(&self, name: &str) -> Option<Vec<ObjectId>> {
        if !self.collections.contains(name) {
            return None;
        }
        Some(
            self.live()
                .filter(|(_, n)| n.collections.iter().any(|c| c == name))
                .map(|(id, _)| id)
                .collect(),
        )
    }

    fn name(&self, id: ObjectId) -> &str {
        self.node(id).map(|n| n.name.as_str()).unwrap_or("")
    }

    fn kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.node(id).map(|n| n.kind)
    }

    fn is_linked(&self, id: ObjectId) -> bool {
        self.node(id).is_some_and(|n| n.linked)
    }

    fn custom_property(&self, id: ObjectId, key: &str) -> Option<serde_json::Value> {
        self.node(id)?.properties.get(key).cloned()
    }

    fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.node(id)?.parent
    }

    fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.live()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(c, _)| c)
            .collect()
    }

    fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> PcboothResult<()> {
        if let Some(p) = parent
            && self.is_ancestor(child, p)
        {
            return Err(PcboothError::host(format!(
                "parenting '{}' under '{}' creates a cycle",
                self.name(child),
                self.name(p)
            )));
        }
        let world = self.matrix_world(child);
        let parent_inverse = match parent {
            Some(p) => self.matrix_world(p).inverse(),
            None => Mat4::IDENTITY,
        };
        let node = self.node_mut(child)?;
        node.parent = parent;
        node.parent_inverse = parent_inverse;
        self.set_matrix_world(child, world)
    }

    fn add_empty(&mut self, name: &str, collection: Option<&str>) -> PcboothResult<ObjectId> {
        Ok(self.add_node(name, ObjectKind::Empty, collection))
    }

    fn add_camera(&mut self, name: &str, collection: Option<&str>) -> PcboothResult<ObjectId> {
        Ok(self.add_node(name, ObjectKind::Camera, collection))
    }

    fn add_light(&mut self, name: &str, collection: Option<&str>) -> PcboothResult<ObjectId> {
        Ok(self.add_node(name, ObjectKind::Light, collection))
    }

    fn remove_object(&mut self, id: ObjectId) -> PcboothResult<()> {
        // Children are unparented in place, like deleting a parent keeps its children.
        for child in self.children(id) {
            self.set_parent(child, None)?;
        }
        self.node_mut(id)?;
        self.nodes[id.0] = None;
        if self.active_camera == Some(id) {
            self.active_camera = None;
        }
        Ok(())
    }

    fn location(&self, id: ObjectId) -> Vec3 {
        self.node(id).map(|n| n.location).unwrap_or_default()
    }

    fn set_location(&mut self, id: ObjectId, location: Vec3) -> PcboothResult<()> {
        self.node_mut(id)?.location = location;
        Ok(())
    }

    fn rotation(&self, id: ObjectId) -> Vec3 {
        self.node(id).map(|n| n.rotation).unwrap_or_default()
    }

    fn set_rotation(&mut self, id: ObjectId, rotation: Vec3) -> PcboothResult<()> {
        self.node_mut(id)?.rotation = rotation;
        Ok(())
    }

    fn delta_location(&self, id: ObjectId) -> Vec3 {
        self.node(id).map(|n| n.delta_location).unwrap_or_default()
    }

    fn set_delta_location(&mut self, id: ObjectId, delta: Vec3) -> PcboothResult<()> {
        self.node_mut(id)?.delta_location = delta;
        Ok(())
    }

    fn delta_rotation(&self, id: ObjectId) -> Vec3 {
        self.node(id).map(|n| n.delta_rotation).unwrap_or_default()
    }

    fn set_delta_rotation(&mut self, id: ObjectId, delta: Vec3) -> PcboothResult<()> {
        self.node_mut(id)?.delta_rotation = delta;
        Ok(())
    }

    fn matrix_world(&self, id: ObjectId) -> Mat4 {
        match self.node(id) {
            Some(n) => self.parent_matrix(n) * n.local_matrix(),
            None => Mat4::IDENTITY,
        }
    }

    fn set_matrix_world(&mut self, id: ObjectId, matrix: Mat4) -> PcboothResult<()> {
        let parent = {
            let node = self
                .node(id)
                .ok_or_else(|| PcboothError::host(format!("object {id:?} does not exist")))?;
            self.parent_matrix(node)
        };
        let local = parent.inverse() * matrix;
        let (scale, rot, loc) = local.to_scale_rotation_translation();
        let node = self.node_mut(id)?;
        let delta_rot = euler_to_quat(node.delta_rotation);
        node.scale = scale;
        node.rotation = quat_to_euler(rot * delta_rot.inverse());
        node.location = loc - node.delta_location;
        Ok(())
    }

    fn world_bounds(&self, id: ObjectId) -> Option<Aabb> {
        let node = self.node(id)?;
        let geometry = node.geometry?;
        Some(geometry.transformed(self.matrix_world(id)))
    }

    fn dimensions(&self, id: ObjectId) -> Option<Vec3> {
        let node = self.node(id)?;
        Some(node.geometry?.size() * node.scale.abs())
    }

    fn apply_transforms(&mut self, id: ObjectId) -> PcboothResult<()> {
        let node = self.node_mut(id)?;
        let basis = Mat4::from_scale_rotation_translation(
            node.scale,
            euler_to_quat(node.rotation),
            node.location,
        );
        node.geometry = node.geometry.map(|g| g.transformed(basis));
        node.location = Vec3::ZERO;
        node.rotation = Vec3::ZERO;
        node.scale = Vec3::ONE;
        for child in self.children(id) {
            let c = self.node_mut(child)?;
            c.parent_inverse = basis * c.parent_inverse;
        }
        Ok(())
    }

    fn set_origin_to_geometry(&mut self, id: ObjectId) -> PcboothResult<()> {
        let node = self.node_mut(id)?;
        let Some(geometry) = node.geometry else {
            return Ok(());
        };
        let c = geometry.center();
        if c.length_squared() <= f32::EPSILON {
            return Ok(());
        }
        node.geometry = Some(Aabb::new(geometry.min - c, geometry.max - c));
        node.location += node.rotation_quat() * (node.scale * c);
        for child in self.children(id) {
            let ch = self.node_mut(child)?;
            ch.parent_inverse = Mat4::from_translation(-c) * ch.parent_inverse;
        }
        Ok(())
    }

    fn camera_settings(&self, id: ObjectId) -> PcboothResult<CameraSettings> {
        self.node(id)
            .and_then(|n| n.camera)
            .ok_or_else(|| PcboothError::host(format!("'{}' is not a camera", self.name(id))))
    }

    fn set_camera_settings(
        &mut self,
        id: ObjectId,
        settings: CameraSettings,
    ) -> PcboothResult<()> {
        let node = self.node_mut(id)?;
        match node.camera.as_mut() {
            Some(c) => {
                *c = settings;
                Ok(())
            }
            None => Err(PcboothError::host(format!("'{}' is not a camera", node.name))),
        }
    }

    fn set_active_camera(&mut self, id: ObjectId) -> PcboothResult<()> {
        self.camera_settings(id)?;
        self.active_camera = Some(id);
        Ok(())
    }

    fn frame_objects(&mut self, camera: ObjectId, objects: &[ObjectId]) -> PcboothResult<()> {
        let cam = self.camera_settings(camera)?;
        let bounds = objects
            .iter()
            .filter_map(|o| self.world_bounds(*o))
            .reduce(Aabb::union)
            .ok_or_else(|| PcboothError::host("no geometry to frame"))?;

        let tan_h = cam.sensor_width * 0.5 / cam.lens.max(f32::EPSILON);
        let aspect = self.render.width as f32 / self.render.height.max(1) as f32;
        let tan_half = if aspect >= 1.0 {
            tan_h / aspect
        } else {
            tan_h * aspect
        };
        let half = tan_half.atan();
        let distance = bounds.radius().max(f32::EPSILON) / half.sin();

        let (scale, rot, _) = self.matrix_world(camera).to_scale_rotation_translation();
        let forward = rot * Vec3::NEG_Z;
        let location = bounds.center() - forward * distance;
        self.set_matrix_world(
            camera,
            Mat4::from_scale_rotation_translation(scale, rot, location),
        )
    }

    fn light_params(&self, id: ObjectId) -> PcboothResult<LightParams> {
        self.node(id)
            .and_then(|n| n.light)
            .ok_or_else(|| PcboothError::host(format!("'{}' is not a light", self.name(id))))
    }

    fn set_light_params(&mut self, id: ObjectId, params: LightParams) -> PcboothResult<()> {
        let node = self.node_mut(id)?;
        match node.light.as_mut() {
            Some(l) => {
                *l = params;
                Ok(())
            }
            None => Err(PcboothError::host(format!("'{}' is not a light", node.name))),
        }
    }

    fn hide_render(&self, id: ObjectId) -> bool {
        self.node(id).is_some_and(|n| n.hide_render)
    }

    fn set_hide_render(&mut self, id: ObjectId, hide: bool) -> PcboothResult<()> {
        self.node_mut(id)?.hide_render = hide;
        Ok(())
    }

    fn hide_viewport(&self, id: ObjectId) -> bool {
        self.node(id).is_some_and(|n| n.hide_viewport)
    }

    fn set_hide_viewport(&mut self, id: ObjectId, hide: bool) -> PcboothResult<()> {
        self.node_mut(id)?.hide_viewport = hide;
        Ok(())
    }

    fn is_holdout(&self, id: ObjectId) -> bool {
        self.node(id).is_some_and(|n| n.holdout)
    }

    fn set_holdout(&mut self, id: ObjectId, holdout: bool) -> PcboothResult<()> {
        self.node_mut(id)?.holdout = holdout;
        Ok(())
    }

    fn visible_shadow(&self, id: ObjectId) -> bool {
        self.node(id).is_some_and(|n| n.visible_shadow)
    }

    fn set_visible_shadow(&mut self, id: ObjectId, visible: bool) -> PcboothResult<()> {
        self.node_mut(id)?.visible_shadow = visible;
        Ok(())
    }

    fn ensure_material(&mut self, name: &str, color: Option<[f32; 3]>) -> PcboothResult<()> {
        match color {
            Some(rgb) => {
                self.materials.insert(name.to_string(), rgb);
            }
            None => {
                self.materials.entry(name.to_string()).or_insert(DEFAULT_COLOR);
            }
        }
        Ok(())
    }

    fn global_material_override(&self) -> Option<String> {
        self.global_material.clone()
    }

    fn set_global_material_override(&mut self, material: Option<&str>) -> PcboothResult<()> {
        if let Some(m) = material
            && !self.materials.contains_key(m)
        {
            return Err(PcboothError::host(format!("material '{m}' does not exist")));
        }
        self.global_material = material.map(str::to_string);
        Ok(())
    }

    fn has_material_data(&self, id: ObjectId) -> bool {
        self.node(id).is_some_and(|n| n.kind == ObjectKind::Mesh)
    }

    fn material_slots(&self, id: ObjectId) -> Vec<Option<String>> {
        self.node(id).map(|n| n.materials.clone()).unwrap_or_default()
    }

    fn set_material_slots(
        &mut self,
        id: ObjectId,
        slots: Vec<Option<String>>,
    ) -> PcboothResult<()> {
        if let Some(missing) = slots
            .iter()
            .flatten()
            .find(|m| !self.materials.contains_key(m.as_str()))
        {
            return Err(PcboothError::host(format!(
                "material '{missing}' does not exist"
            )));
        }
        let node = self.node_mut(id)?;
        if node.kind != ObjectKind::Mesh {
            return Err(PcboothError::host(format!(
                "'{}' has no material data",
                node.name
            )));
        }
        node.materials = slots;
        Ok(())
    }

    fn configure_render(&mut self, settings: RenderSettings) -> PcboothResult<()> {
        if settings.width == 0 || settings.height == 0 {
            return Err(PcboothError::host("render resolution must be non-zero"));
        }
        self.render = settings;
        Ok(())
    }

    fn compositing(&self) -> Compositing {
        self.compositing
    }

    fn set_compositing(&mut self, compositing: Compositing) -> PcboothResult<()> {
        self.compositing = compositing;
        Ok(())
    }

    fn render_quality(&self) -> RenderQuality {
        self.quality
    }

    fn set_render_quality(&mut self, quality: RenderQuality) -> PcboothResult<()> {
        self.quality = quality;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(camera = self.name(camera)))]
    fn render_still(&mut self, camera: ObjectId, path: &Path) -> PcboothResult<()> {
        let cam = self.camera_settings(camera)?;
        let (w, h) = (self.render.width, self.render.height);
        let projector = Projector::new(self.matrix_world(camera), &cam, w, h);

        let mut shapes = Vec::new();
        for (id, node) in self.live() {
            if node.hide_render || node.kind != ObjectKind::Mesh {
                continue;
            }
            let Some(bounds) = self.world_bounds(id) else {
                continue;
            };
            if let Some(rect) = projector.rect(bounds) {
                shapes.push(Shape {
                    rect,
                    fill: self.fill_for(node),
                });
            }
        }
        let img = raster::rasterize(w, h, shapes, self.compositing);

        ensure_parent_dir(path)?;
        img.save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| PcboothError::render(format!("failed to write '{}': {e}", path.display())))?;
        self.renders += 1;
        Ok(())
    }

    fn frame_range(&self) -> FrameSpan {
        self.frame_range
    }

    fn set_frame_range(&mut self, span: FrameSpan) -> PcboothResult<()> {
        self.frame_range = FrameSpan::new(span.start, span.end)?;
        Ok(())
    }

    fn current_frame(&self) -> i32 {
        self.frame
    }

    fn set_frame(&mut self, frame: i32) -> PcboothResult<()> {
        self.frame = frame;
        for node in self.nodes.iter_mut().flatten() {
            let Some(action) = node.action.clone() else {
                continue;
            };
            for channel in action.channels.keys() {
                if let Some(v) = action.sample(*channel, frame) {
                    Self::apply_channel(node, *channel, v);
                }
            }
        }
        Ok(())
    }

    fn insert_keyframe(
        &mut self,
        id: ObjectId,
        channel: KeyChannel,
        frame: i32,
    ) -> PcboothResult<()> {
        let value = self.channel_value(id, channel)?;
        let node = self.node_mut(id)?;
        let name = format!("{}Action", node.name);
        node.action
            .get_or_insert_with(|| Action::named(name))
            .insert(channel, frame, value);
        Ok(())
    }

    fn action(&self, id: ObjectId) -> Option<Action> {
        self.node(id)?.action.clone()
    }

    fn set_action(&mut self, id: ObjectId, mut action: Option<Action>) -> PcboothResult<()> {
        if let Some(action) = action.as_mut() {
            action.normalize();
        }
        self.node_mut(id)?.action = action;
        Ok(())
    }

    fn clear_animation(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.action = None;
        }
    }

    fn background_library(&self) -> Vec<String> {
        self.backgrounds.iter().map(|b| b.name.clone()).collect()
    }

    fn import_background(&mut self, name: &str, collection: &str) -> PcboothResult<ObjectId> {
        let def = self
            .backgrounds
            .iter()
            .find(|b| b.name == name)
            .cloned()
            .ok_or_else(|| PcboothError::host(format!("no background '{name}' in library")))?;
        let half = def.size * 0.5;
        let color = hex_to_rgb(&def.color)?;
        let id = self.add_node(name, ObjectKind::Mesh, Some(collection));
        let node = self.node_mut(id)?;
        node.geometry = Some(Aabb::new(
            Vec3::new(-half, -half, 0.0),
            Vec3::new(half, half, 0.0),
        ));
        node.color = color;
        Ok(id)
    }

    fn shader_switch(&self, group: &str, node: &str) -> Option<f32> {
        self.node_groups.get(group)?.get(node).copied()
    }

    fn set_shader_switch(&mut self, group: &str, node: &str, value: f32) -> PcboothResult<()> {
        let slot = self
            .node_groups
            .get_mut(group)
            .and_then(|g| g.get_mut(node))
            .ok_or_else(|| PcboothError::host(format!("no shader node '{group}/{node}'")))?;
        *slot = value;
        Ok(())
    }

    fn set_emission_enabled(&mut self, enabled: bool) -> PcboothResult<()> {
        self.emission = enabled;
        Ok(())
    }

    fn source_path(&self) -> Option<PathBuf> {
        self.source.clone()
    }

    fn save_scene(&self, path: &Path) -> PcboothResult<()> {
        self.to_scene().save(path)
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/memory.rs"]
mod tests;
