use std::ops::{Deref, DerefMut};

use foundation::math::{Mat4, Vec3};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The shared graphics context went away; the overlay is disabled.
    #[error("graphics context lost")]
    ContextLost,
    #[error("overlay is already attached to a map")]
    AlreadyAttached,
    #[error("overlay has not been attached to a map yet")]
    NotAttached,
    #[error("draw failed: {0}")]
    Draw(String),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    /// 0xRRGGBB
    pub color: u32,
    pub intensity: f32,
    /// Unit vector pointing from the scene towards the light.
    pub direction: Vec3,
}

impl DirectionalLight {
    pub fn white(towards: Vec3) -> Self {
        Self {
            color: 0xffffff,
            intensity: 1.0,
            direction: towards.normalize(),
        }
    }
}

/// Key and fill light above the model, one from each side.
pub fn default_lights() -> [DirectionalLight; 2] {
    [
        DirectionalLight::white(Vec3::new(0.0, -70.0, 100.0)),
        DirectionalLight::white(Vec3::new(0.0, 70.0, 100.0)),
    ]
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayScene {
    pub lights: Vec<DirectionalLight>,
}

impl OverlayScene {
    pub fn add_light(&mut self, light: DirectionalLight) {
        self.lights.push(light);
    }
}

/// Camera whose projection carries the whole map-aligned transform.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct OverlayCamera {
    pub projection: Mat4,
}

/// Renderer bound to the host map's existing drawing surface and context.
///
/// The host constructs it from its own context; the overlay never creates a
/// surface of its own.
pub trait SurfaceRenderer {
    fn set_auto_clear(&mut self, auto_clear: bool);

    /// Drop any GL/GPU state left bound by the previous user of the context.
    fn reset_state(&mut self);

    fn render(&mut self, scene: &OverlayScene, camera: &OverlayCamera) -> Result<(), RenderError>;
}

/// The host side that presents the shared surface.
pub trait RepaintHost {
    fn trigger_repaint(&mut self);
}

/// Scoped use of the shared context: state is reset on acquire and again on
/// release, so neither side observes the other's bindings.
pub struct ContextGuard<'a, R: SurfaceRenderer> {
    renderer: &'a mut R,
}

impl<'a, R: SurfaceRenderer> ContextGuard<'a, R> {
    pub fn acquire(renderer: &'a mut R) -> Self {
        renderer.reset_state();
        Self { renderer }
    }
}

impl<R: SurfaceRenderer> Deref for ContextGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: SurfaceRenderer> DerefMut for ContextGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

impl<R: SurfaceRenderer> Drop for ContextGuard<'_, R> {
    fn drop(&mut self) {
        self.renderer.reset_state();
    }
}

#[derive(Debug)]
struct Attached<R> {
    scene: OverlayScene,
    camera: OverlayCamera,
    renderer: R,
}

/// Owns the overlay's scene, camera and renderer.
///
/// Lifecycle: `attach` once when the map first integrates the overlay, then
/// `render` on every map repaint. Losing the context disables the overlay;
/// the map itself keeps running.
#[derive(Debug)]
pub struct Overlay<R> {
    attached: Option<Attached<R>>,
    disabled: bool,
    frames_rendered: u64,
}

impl<R> Default for Overlay<R> {
    fn default() -> Self {
        Self {
            attached: None,
            disabled: false,
            frames_rendered: 0,
        }
    }
}

impl<R: SurfaceRenderer> Overlay<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, mut renderer: R) -> Result<(), RenderError> {
        if self.attached.is_some() {
            return Err(RenderError::AlreadyAttached);
        }

        let mut scene = OverlayScene::default();
        for light in default_lights() {
            scene.add_light(light);
        }
        // The map has already drawn into the surface this frame.
        renderer.set_auto_clear(false);

        info!(lights = scene.lights.len(), "overlay attached to host context");
        self.attached = Some(Attached {
            scene,
            camera: OverlayCamera::default(),
            renderer,
        });
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn scene(&self) -> Option<&OverlayScene> {
        self.attached.as_ref().map(|a| &a.scene)
    }

    pub fn camera(&self) -> Option<&OverlayCamera> {
        self.attached.as_ref().map(|a| &a.camera)
    }

    pub fn renderer(&self) -> Option<&R> {
        self.attached.as_ref().map(|a| &a.renderer)
    }

    /// Draw one frame with `frame_matrix` as the camera projection, then ask
    /// the host to present immediately.
    pub fn render<H: RepaintHost + ?Sized>(
        &mut self,
        frame_matrix: Mat4,
        host: &mut H,
    ) -> Result<(), RenderError> {
        if self.disabled {
            return Ok(());
        }
        let Some(attached) = self.attached.as_mut() else {
            return Err(RenderError::NotAttached);
        };

        attached.camera.projection = frame_matrix;
        let result = {
            let mut ctx = ContextGuard::acquire(&mut attached.renderer);
            ctx.render(&attached.scene, &attached.camera)
        };

        match result {
            Ok(()) => {
                self.frames_rendered += 1;
                host.trigger_repaint();
                Ok(())
            }
            Err(RenderError::ContextLost) => {
                error!(
                    frames = self.frames_rendered,
                    "overlay context lost; disabling overlay"
                );
                self.disabled = true;
                Err(RenderError::ContextLost)
            }
            Err(e) => {
                debug!(error = %e, "overlay draw failed");
                Err(e)
            }
        }
    }
}
