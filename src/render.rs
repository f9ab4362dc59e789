use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::config::{Config, ImageFormat};
use crate::foundation::error::{PcboothError, PcboothResult};
use crate::foundation::fs::{ensure_parent_dir, remove_file_if_exists};
use crate::host::{Host, ObjectId};

pub const CACHE_NAME: &str = "_tmp_render";

/// One host render per combination, fanned out to every image format and a thumbnail.
///
/// The first `render`/`thumbnail` call renders into `<render_dir>/_tmp_render.png` and
/// loads it as the cache; later calls reuse it until [`Renderer::clear_cache`].
#[derive(Clone, Debug)]
pub struct Renderer {
    render_dir: PathBuf,
    formats: Vec<ImageFormat>,
    thumbnail_size: (u32, u32),
    keep_frames: bool,
    cache: Option<RgbaImage>,
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Self {
            render_dir: config.settings.render_dir.clone(),
            formats: config.settings.image_format.clone(),
            thumbnail_size: (
                config.renderer.thumbnail_width,
                config.renderer.thumbnail_height,
            ),
            keep_frames: config.settings.keep_frames,
            cache: None,
        }
    }

    pub fn render_dir(&self) -> &Path {
        &self.render_dir
    }

    pub fn cache_path(&self) -> PathBuf {
        self.render_dir.join(format!("{CACHE_NAME}.png"))
    }

    pub fn cached(&self) -> Option<&RgbaImage> {
        self.cache.as_ref()
    }

    fn ensure_cache(
        &mut self,
        host: &mut dyn Host,
        camera: ObjectId,
        name: &str,
    ) -> PcboothResult<&RgbaImage> {
        if self.cache.is_none() {
            tracing::info!("rendering {name}...");
            let image = self.init_render(host, camera).inspect_err(|e| {
                tracing::error!("render of {name} failed: {e}");
            })?;
            self.cache = Some(image);
        }
        self.cache
            .as_ref()
            .ok_or_else(|| PcboothError::render("render cache is empty"))
    }

    fn init_render(&self, host: &mut dyn Host, camera: ObjectId) -> PcboothResult<RgbaImage> {
        let path = self.cache_path();
        ensure_parent_dir(&path)?;
        host.set_active_camera(camera)?;
        host.render_still(camera, &path)
            .map_err(|e| PcboothError::render(format!("host render failed: {e}")))?;
        let image = image::open(&path).map_err(|e| {
            PcboothError::render(format!("can't load cache from {}: {e}", path.display()))
        })?;
        tracing::debug!("render completed, saved temp file to {}", path.display());
        Ok(image.to_rgba8())
    }

    /// Save the cached render as `<name>.<ext>` for every configured format.
    pub fn render(&mut self, host: &mut dyn Host, camera: ObjectId, name: &str) -> PcboothResult<()> {
        self.render_as(host, camera, name, None)
    }

    /// Like [`Renderer::render`] with a single format replacing the configured list.
    pub fn render_as(
        &mut self,
        host: &mut dyn Host,
        camera: ObjectId,
        name: &str,
        format: Option<ImageFormat>,
    ) -> PcboothResult<()> {
        let formats = format.map_or_else(|| self.formats.clone(), |f| vec![f]);
        let base = self.render_dir.join(name);
        let image = self.ensure_cache(host, camera, name)?;
        save_all(image, &base, "", &formats)
    }

    /// Save a scaled copy of the cached render as `<name>_thumbnail.<ext>`.
    pub fn thumbnail(
        &mut self,
        host: &mut dyn Host,
        camera: ObjectId,
        name: &str,
    ) -> PcboothResult<()> {
        let (w, h) = self.thumbnail_size;
        let formats = self.formats.clone();
        let base = self.render_dir.join(name);
        let image = self.ensure_cache(host, camera, name)?;
        let scaled = image::imageops::resize(image, w, h, FilterType::Triangle);
        save_all(&scaled, &base, "_thumbnail", &formats)
    }

    /// Drop the cache so the next call renders again. The cache file stays with `KEEP_FRAMES`.
    pub fn clear_cache(&mut self) {
        tracing::debug!("removing cached render");
        if !self.keep_frames
            && let Err(e) = remove_file_if_exists(&self.cache_path())
        {
            tracing::warn!("failed to remove render cache: {e}");
        }
        self.cache = None;
    }

    /// Render every frame of the host's range as `<name>_%04d.png`; returns the frame count.
    pub fn render_animation(
        &mut self,
        host: &mut dyn Host,
        camera: ObjectId,
        name: &str,
    ) -> PcboothResult<usize> {
        let mut count = 0;
        for frame in host.frame_range().frames() {
            host.set_frame(frame)?;
            let result = self.render_as(host, camera, &frame_name(name, frame), Some(ImageFormat::Png));
            self.clear_cache();
            result?;
            count += 1;
        }
        Ok(count)
    }
}

pub fn frame_name(name: &str, frame: i32) -> String {
    format!("{name}_{frame:04}")
}

fn save_all(image: &RgbaImage, base: &Path, suffix: &str, formats: &[ImageFormat]) -> PcboothResult<()> {
    let mut first_error = None;
    for format in formats {
        let path = with_suffix(base, suffix, format.extension());
        match save_image(image, &path, *format) {
            Ok(()) => tracing::info!("saved render as {}", path.display()),
            Err(e) => {
                tracing::error!("save failed for {}: {e}", path.display());
                first_error.get_or_insert(e);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn with_suffix(base: &Path, suffix: &str, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!("{suffix}.{ext}"));
    PathBuf::from(name)
}

/// Write `image` in `format`, dropping alpha for formats without it.
pub fn save_image(image: &RgbaImage, path: &Path, format: ImageFormat) -> PcboothResult<()> {
    ensure_parent_dir(path)?;
    let dynamic = DynamicImage::ImageRgba8(image.clone());
    let result = match format {
        ImageFormat::Jpeg => dynamic.to_rgb8().save_with_format(path, format.codec()),
        ImageFormat::OpenExr => dynamic.to_rgba32f().save_with_format(path, format.codec()),
        _ => dynamic.save_with_format(path, format.codec()),
    };
    result.map_err(|e| PcboothError::render(format!("failed to write {}: {e}", path.display())))
}

#[cfg(test)]
#[path = "../tests/unit/render.rs"]
mod tests;
