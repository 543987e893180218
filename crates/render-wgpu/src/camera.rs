use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Top-down orthographic camera over the map.
///
/// Looks straight down -Y with -Z at the top of the screen, so image row 0 of
/// the map (smallest z) ends up at the top of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCamera {
    /// Point on the ground plane at the center of the view.
    pub center: Vec3,
    /// Visible extent along world z (screen height).
    pub view_height: f32,
    pub aspect: f32,
    pub height: f32,
    pub min_view_height: f32,
}

impl Default for MapCamera {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            view_height: 20.0,
            aspect: 16.0 / 9.0,
            height: 100.0,
            min_view_height: 1.0,
        }
    }
}

impl MapCamera {
    /// Camera framing the whole world rectangle at the given aspect ratio.
    pub fn framing(world_size: Vec3, aspect: f32) -> Self {
        let view_height = world_size.z.max(world_size.x / aspect);
        Self {
            view_height,
            aspect,
            height: world_size.length().max(1.0) * 2.0,
            ..Self::default()
        }
    }

    pub fn pan(&mut self, dx: f32, dz: f32) {
        self.center.x += dx;
        self.center.z += dz;
    }

    /// Scale the visible extent. Factors below 1 zoom in.
    pub fn zoom_by(&mut self, factor: f32) {
        self.view_height = (self.view_height * factor).max(self.min_view_height);
    }

    pub fn eye(&self) -> Vec3 {
        self.center + Vec3::Y * self.height
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.center, Vec3::NEG_Z)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half_h = self.view_height * 0.5;
        let half_w = half_h * self.aspect;
        Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, 0.1, self.height * 2.0)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray `(origin, direction)` through a point in normalized
    /// device coordinates (`[-1, 1]`, +y up).
    pub fn ray_through(&self, ndc: Vec2) -> (Vec3, Vec3) {
        let inverse = self.view_projection().inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        (near, (far - near).normalize())
    }
}
