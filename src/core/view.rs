//! Orthografische Pick-Ansicht: Bildschirmkoordinaten → Weltstrahl.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Strahl in Weltkoordinaten (Richtung normiert).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickRay {
    pub origin: DVec3,
    pub direction: DVec3,
}

/// Orthografische Kamera, mit der der Host Mausereignisse auflöst
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickView {
    /// Kameraposition in Weltkoordinaten
    pub eye: DVec3,
    /// Blickziel
    pub target: DVec3,
    /// Ungefähre Oben-Richtung
    pub up: DVec3,
    /// Sichtbare Welt-Halbhöhe
    pub half_height: f64,
    /// Viewport-Größe in Pixeln
    pub viewport: DVec2,
}

impl PickView {
    pub fn new() -> Self {
        Self {
            eye: DVec3::new(0.0, 0.0, 10.0),
            target: DVec3::ZERO,
            up: DVec3::Y,
            half_height: 2.0,
            viewport: DVec2::new(800.0, 600.0),
        }
    }

    /// Orthonormale Basis (rechts, oben, vorwärts) oder `None` bei entarteter Kamera.
    fn basis(&self) -> Option<(DVec3, DVec3, DVec3)> {
        let forward = (self.target - self.eye).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        if forward == DVec3::ZERO || right == DVec3::ZERO {
            return None;
        }
        Some((right, right.cross(forward), forward))
    }

    /// Konvertiert Screen-Koordinaten (Ursprung oben links) in einen Pick-Strahl.
    pub fn ray(&self, screen: DVec2) -> Option<PickRay> {
        let (right, up, forward) = self.basis()?;
        let size = self.viewport.max(DVec2::ONE);
        let ndc = DVec2::new(screen.x / size.x * 2.0 - 1.0, 1.0 - screen.y / size.y * 2.0);
        let aspect = size.x / size.y;
        let origin = self.eye
            + right * (ndc.x * self.half_height * aspect)
            + up * (ndc.y * self.half_height);
        Some(PickRay {
            origin,
            direction: forward,
        })
    }

    /// Projiziert einen Weltpunkt auf den Bildschirm (Umkehrung von [`Self::ray`]).
    pub fn project(&self, point: DVec3) -> Option<DVec2> {
        let (right, up, _) = self.basis()?;
        let size = self.viewport.max(DVec2::ONE);
        let aspect = size.x / size.y;
        let rel = point - self.eye;
        let ndc = DVec2::new(
            rel.dot(right) / (self.half_height * aspect),
            rel.dot(up) / self.half_height,
        );
        Some(DVec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y))
    }

    /// Welt-Verschiebung in der Bildebene für eine Pixel-Differenz.
    pub fn screen_delta_to_world(&self, delta: DVec2) -> DVec3 {
        let Some((right, up, _)) = self.basis() else {
            return DVec3::ZERO;
        };
        let world_per_pixel = 2.0 * self.half_height / self.viewport.y.max(1.0);
        (right * delta.x - up * delta.y) * world_per_pixel
    }
}

impl Default for PickView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_screen_center_hits_target_axis() {
        let view = PickView::new();
        let ray = view.ray(DVec2::new(400.0, 300.0)).expect("Strahl");
        assert_relative_eq!(ray.origin.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ray.origin.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ray.direction.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_inverts_ray() {
        let view = PickView::new();
        let screen = view.project(DVec3::new(0.5, -1.0, 0.0)).expect("Projektion");
        let ray = view.ray(screen).expect("Strahl");
        assert_relative_eq!(ray.origin.x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(ray.origin.y, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_camera_has_no_ray() {
        let view = PickView {
            up: DVec3::Z,
            ..PickView::new()
        };
        assert!(view.ray(DVec2::ZERO).is_none());
    }

    #[test]
    fn test_screen_delta_y_points_up() {
        let view = PickView::new();
        let delta = view.screen_delta_to_world(DVec2::new(0.0, -300.0));
        assert_relative_eq!(delta.y, 2.0, epsilon = 1e-12);
    }
}
