use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Reconfigures the surface. A zero-sized request only updates `size`;
/// wgpu rejects 0×0 configurations.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: &wgpu::SurfaceError,
) -> SurfaceErrorAction {
    let action = classify_surface_error(err);
    if action == SurfaceErrorAction::Reconfigured && size.width > 0 && size.height > 0 {
        surface.configure(device, config);
    }
    action
}

/// How the frame loop should react to a failed surface acquire.
pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

/// Offscreen attachments that follow the surface size: the multisampled
/// color target (when antialiasing) and the depth buffer (when depth testing).
#[derive(Default)]
pub(crate) struct FrameTargets {
    size: (u32, u32),
    sample_count: u32,
    msaa: Option<wgpu::TextureView>,
    depth: Option<wgpu::TextureView>,
}

impl FrameTargets {
    /// Recreates attachments if the surface size or sampling changed.
    pub(crate) fn ensure(
        &mut self,
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
        depth: bool,
    ) {
        let size = (config.width, config.height);
        let fresh = self.size == size
            && self.sample_count == sample_count
            && self.msaa.is_some() == (sample_count > 1)
            && self.depth.is_some() == depth;
        if fresh {
            return;
        }

        self.size = size;
        self.sample_count = sample_count;
        self.msaa = (sample_count > 1).then(|| {
            create_attachment(device, size, sample_count, config.format, "stipple msaa color")
        });
        self.depth =
            depth.then(|| create_attachment(device, size, sample_count, DEPTH_FORMAT, "stipple depth"));
    }

    pub(crate) fn msaa(&self) -> Option<&wgpu::TextureView> {
        self.msaa.as_ref()
    }

    pub(crate) fn depth(&self) -> Option<&wgpu::TextureView> {
        self.depth.as_ref()
    }
}

fn create_attachment(
    device: &wgpu::Device,
    (width, height): (u32, u32),
    sample_count: u32,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_and_outdated_surfaces_reconfigure() {
        assert_eq!(classify_surface_error(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Outdated),
            SurfaceErrorAction::Reconfigured
        );
    }

    #[test]
    fn out_of_memory_is_fatal_and_timeouts_skip() {
        let oom = wgpu::SurfaceError::OutOfMemory;
        assert_eq!(classify_surface_error(&oom), SurfaceErrorAction::Fatal);
        // The error stays usable after classification.
        assert!(!oom.to_string().is_empty());

        assert_eq!(classify_surface_error(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(classify_surface_error(&wgpu::SurfaceError::Other), SurfaceErrorAction::SkipFrame);
    }
}
