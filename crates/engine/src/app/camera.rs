use super::scene::{Vec2, Vec3};

pub const PIXELS_PER_WORLD: f32 = 32.0;
/// Distance of the orthographic eye above the play plane, along -z.
pub const CAMERA_EYE_DEPTH: f32 = 10.0;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn from_window_size(window_size: (u32, u32)) -> Self {
        Self {
            width: window_size.0,
            height: window_size.1,
        }
    }
}

/// Top-down orthographic camera looking along +z at the play plane.
#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub pixels_per_world: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            pixels_per_world: PIXELS_PER_WORLD,
        }
    }
}

impl Camera2D {
    fn effective_pixels_per_world(&self) -> f32 {
        if self.pixels_per_world.is_finite() && self.pixels_per_world > 0.0 {
            self.pixels_per_world
        } else {
            PIXELS_PER_WORLD
        }
    }

    pub fn world_to_screen(&self, world: Vec3, viewport: Viewport) -> (i32, i32) {
        let ppw = self.effective_pixels_per_world();
        let x = (world.x - self.position.x) * ppw + viewport.width as f32 * 0.5;
        let y = viewport.height as f32 * 0.5 - (world.y - self.position.y) * ppw;
        (x.round() as i32, y.round() as i32)
    }

    /// Projects a screen pixel onto the play plane (`z == 0`).
    pub fn screen_to_world(&self, screen_px: Vec2, viewport: Viewport) -> Vec3 {
        let ppw = self.effective_pixels_per_world();
        let x = (screen_px.x - viewport.width as f32 * 0.5) / ppw + self.position.x;
        let y = (viewport.height as f32 * 0.5 - screen_px.y) / ppw + self.position.y;
        Vec3::new(x, y, 0.0)
    }

    pub fn eye_above(&self, world: Vec3) -> Vec3 {
        Vec3::new(world.x, world.y, -CAMERA_EYE_DEPTH)
    }
}
