//! PickEngine: nächster Parameter und nächster Kontrollpunkt zu einem Strahl.
//!
//! Entartete Eingaben (Geometrie ohne Ausdehnung, Richtung der Länge 0)
//! liefern `None`. Das ist im normalen Betrieb erwartet und kein Fehler.

use super::geometry::{dehomogenize, EditableGeometry};
use super::params::{Axis, EndCondition};
use crate::shared::spline_basis::KNOT_EPSILON;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Geometrie mit kleinerer Ausdehnung gilt als entartet.
pub const MIN_PICK_EXTENT: f64 = 1e-12;

/// Ergebnis der Parametersuche.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterHit {
    pub u: f64,
    pub v: f64,
    /// Richtung, auf die eine Ziehgeste wirken soll
    pub axis: Axis,
    /// Abstand des Flächenpunkts zum Strahl
    pub distance: f64,
}

/// Ergebnis der Kontrollpunktsuche.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlHit {
    pub index: usize,
    pub rational: bool,
    pub distance: f64,
}

/// Zusammengefasstes Pick-Ergebnis für die Sitzung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickResult {
    pub u: f64,
    pub v: f64,
    pub axis: Axis,
    pub control_index: Option<usize>,
    pub rational: bool,
}

impl PickResult {
    pub fn from_hits(parameter: &ParameterHit, control: Option<&ControlHit>, rational: bool) -> Self {
        Self {
            u: parameter.u,
            v: parameter.v,
            axis: parameter.axis,
            control_index: control.map(|c| c.index),
            rational,
        }
    }

    /// Parameter entlang der Zielrichtung.
    pub fn param(&self) -> f64 {
        match self.axis {
            Axis::U => self.u,
            Axis::V => self.v,
        }
    }
}

/// Abstand eines Punkts zum Strahl `origin + s · dir` (dir normiert).
fn ray_offset(p: DVec3, origin: DVec3, dir: DVec3) -> DVec3 {
    let rel = p - origin;
    rel - dir * rel.dot(dir)
}

/// Sucht den Parameter, dessen Flächenpunkt dem Strahl am nächsten liegt.
///
/// Grobes Raster mit `grid_samples` Stützstellen je Richtung, dann
/// Gauß-Newton auf dem senkrechten Abstand.
pub fn find_closest_parameter(
    geom: &EditableGeometry,
    point: DVec3,
    direction: DVec3,
    grid_samples: usize,
    iterations: usize,
) -> Option<ParameterHit> {
    let dir = direction.normalize_or_zero();
    if dir == DVec3::ZERO || geom.extent() < MIN_PICK_EXTENT {
        return None;
    }

    let surface = geom.is_surface();
    let (ua, ub) = geom.domain(Axis::U);
    let (va, vb) = geom.domain(Axis::V);
    let n = grid_samples.max(2);
    let residual = |uv: DVec2| ray_offset(geom.evaluate(uv.x, uv.y), point, dir);

    // Grobe Suche
    let mut best = DVec2::new(ua, va);
    let mut best_dist = f64::INFINITY;
    let v_steps = if surface { n } else { 0 };
    for j in 0..=v_steps {
        for i in 0..=n {
            let uv = DVec2::new(
                ua + (ub - ua) * i as f64 / n as f64,
                if surface { va + (vb - va) * j as f64 / n as f64 } else { va },
            );
            let d = residual(uv).length();
            if d < best_dist {
                best_dist = d;
                best = uv;
            }
        }
    }

    // Lokale Verfeinerung
    let fit = |x: f64, axis: Axis| {
        let (a, b) = geom.domain(axis);
        let periodic = geom
            .axis(axis)
            .is_some_and(|s| s.end == EndCondition::Periodic);
        if periodic && b > a {
            a + (x - a).rem_euclid(b - a)
        } else {
            x.clamp(a, b)
        }
    };
    let hu = ((ub - ua) * 1e-6).max(1e-9);
    let hv = ((vb - va) * 1e-6).max(1e-9);
    let mut uv = best;
    for _ in 0..iterations {
        let r = residual(uv);
        let du =
            (residual(uv + DVec2::new(hu, 0.0)) - residual(uv - DVec2::new(hu, 0.0))) / (2.0 * hu);
        let step = if surface {
            let dv = (residual(uv + DVec2::new(0.0, hv)) - residual(uv - DVec2::new(0.0, hv)))
                / (2.0 * hv);
            let (a, b, c) = (du.dot(du), du.dot(dv), dv.dot(dv));
            let det = a * c - b * b;
            if det.abs() < 1e-24 {
                break;
            }
            let gu = -du.dot(r);
            let gv = -dv.dot(r);
            DVec2::new((c * gu - b * gv) / det, (a * gv - b * gu) / det)
        } else {
            let a = du.dot(du);
            if a < 1e-24 {
                break;
            }
            DVec2::new(-du.dot(r) / a, 0.0)
        };
        let next_v = if surface { fit(uv.y + step.y, Axis::V) } else { uv.y };
        let next = DVec2::new(fit(uv.x + step.x, Axis::U), next_v);
        let moved = (next - uv).length();
        uv = next;
        if moved < 1e-14 {
            break;
        }
    }

    let refined_dist = residual(uv).length();
    if !(refined_dist.is_finite() && refined_dist <= best_dist) {
        uv = best;
    }
    let distance = refined_dist.min(best_dist);
    if !(uv.is_finite() && distance.is_finite()) {
        return None;
    }

    let axis = if surface { drag_axis(geom, uv) } else { Axis::U };
    Some(ParameterHit {
        u: uv.x,
        v: uv.y,
        axis,
        distance,
    })
}

/// Zielrichtung einer Geste: die Richtung, deren nächste Knotenlinie in Weltmaß näher liegt.
fn drag_axis(geom: &EditableGeometry, uv: DVec2) -> Axis {
    let world_gap = |axis: Axis, t: f64, tangent: DVec3| {
        geom.axis(axis).map_or(f64::INFINITY, |spline| {
            let gap = spline
                .knots
                .iter()
                .map(|k| (k - t).abs())
                .fold(f64::INFINITY, f64::min);
            gap * tangent.length()
        })
    };
    let h = 1e-6;
    let su = (geom.evaluate(uv.x + h, uv.y) - geom.evaluate(uv.x - h, uv.y)) / (2.0 * h);
    let sv = (geom.evaluate(uv.x, uv.y + h) - geom.evaluate(uv.x, uv.y - h)) / (2.0 * h);
    let gap_u = world_gap(Axis::U, uv.x, su);
    let gap_v = world_gap(Axis::V, uv.y, sv);
    if gap_u <= gap_v + KNOT_EPSILON {
        Axis::U
    } else {
        Axis::V
    }
}

/// Nächster Kontrollpunkt zum Strahl; bei Gleichstand gewinnt der kleinste Index.
pub fn find_closest_control_point(
    geom: &EditableGeometry,
    point: DVec3,
    direction: DVec3,
) -> Option<ControlHit> {
    let dir = direction.normalize_or_zero();
    if dir == DVec3::ZERO {
        return None;
    }
    let mut best: Option<ControlHit> = None;
    for (index, p) in geom.points().iter().enumerate() {
        let distance = ray_offset(dehomogenize(*p), point, dir).length();
        if !distance.is_finite() {
            continue;
        }
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(ControlHit {
                index,
                rational: geom.is_rational(),
                distance,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::ParameterSet;

    fn bumped_surface() -> EditableGeometry {
        let grid = (0..5)
            .map(|j| {
                (0..5)
                    .map(|i| {
                        let z = if i == 2 && j == 2 { 1.0 } else { 0.0 };
                        DVec3::new(i as f64, j as f64, z)
                    })
                    .collect()
            })
            .collect();
        EditableGeometry::from_grid(&ParameterSet::default(), grid).expect("Fläche gültig")
    }

    #[test]
    fn test_closest_parameter_hits_surface_point() {
        let geom = bumped_surface();
        let target = geom.evaluate(0.37, 0.62);
        let origin = target + DVec3::new(0.0, 0.0, 5.0);
        let hit = find_closest_parameter(&geom, origin, DVec3::NEG_Z, 16, 12).expect("Treffer");
        assert!(hit.distance < 1e-8, "Abstand {}", hit.distance);
        let found = geom.evaluate(hit.u, hit.v);
        assert!((found.truncate() - target.truncate()).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_geometry_returns_none() {
        let grid = vec![vec![DVec3::ONE; 4]; 4];
        let geom = EditableGeometry::from_grid(&ParameterSet::default(), grid).expect("Fläche");
        assert!(find_closest_parameter(&geom, DVec3::ZERO, DVec3::Z, 16, 12).is_none());
    }

    #[test]
    fn test_zero_direction_returns_none() {
        let geom = bumped_surface();
        assert!(find_closest_parameter(&geom, DVec3::ZERO, DVec3::ZERO, 16, 12).is_none());
        assert!(find_closest_control_point(&geom, DVec3::ZERO, DVec3::ZERO).is_none());
    }

    #[test]
    fn test_periodic_parameter_stays_in_domain() {
        let params = ParameterSet {
            u_order: 3,
            u_end: EndCondition::Periodic,
            ..ParameterSet::default()
        };
        let ring = vec![(0..6)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / 6.0;
                DVec3::new(a.cos(), a.sin(), 0.0)
            })
            .collect()];
        let geom = EditableGeometry::from_grid(&params, ring).expect("Kreis");
        let (a, b) = geom.domain(Axis::U);
        let start = geom.evaluate(a, 0.0);
        let hit = find_closest_parameter(&geom, start + DVec3::Z, DVec3::NEG_Z, 16, 12)
            .expect("Treffer");
        assert!(hit.u >= a && hit.u <= b);
        assert!((geom.evaluate(hit.u, 0.0) - start).length() < 1e-6);
    }

    #[test]
    fn test_control_point_tie_prefers_smallest_index() {
        let geom = bumped_surface();
        // Strahl entlang x trifft die ganze erste Reihe gleich weit
        let hit = find_closest_control_point(&geom, DVec3::new(-10.0, 0.0, 0.0), DVec3::X)
            .expect("Treffer");
        assert_eq!(hit.index, 0);
        let again = find_closest_control_point(&geom, DVec3::new(-10.0, 0.0, 0.0), DVec3::X)
            .expect("Treffer");
        assert_eq!(again, hit);
    }

    #[test]
    fn test_control_point_on_single_row_curve() {
        let line = vec![(0..4).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect()];
        let geom = EditableGeometry::from_grid(&ParameterSet::default(), line).expect("Linie");
        let hit = find_closest_control_point(&geom, DVec3::new(2.1, 0.0, 3.0), DVec3::NEG_Z)
            .expect("Treffer");
        assert_eq!(hit.index, 2);
        assert!(!hit.rational);
    }
}
