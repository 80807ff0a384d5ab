//! Startformen für den Primitives-Zustand (Ebene, Zylinder, Linie, Kreis).

use super::error::EditError;
use super::geometry::EditableGeometry;
use super::params::{Axis, EndCondition, GeomType, ParameterSet};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Art der Startform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Plane,
    Cylinder,
    Line,
    Circle,
}

impl PrimitiveKind {
    /// Popup-Index (0 Ebene, 1 Zylinder, 2 Linie, 3 Kreis) → Form.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Plane),
            1 => Some(Self::Cylinder),
            2 => Some(Self::Line),
            3 => Some(Self::Circle),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Plane => "Ebene",
            Self::Cylinder => "Zylinder",
            Self::Line => "Linie",
            Self::Circle => "Kreis",
        }
    }
}

/// Baut die Startform aus dem aktuellen Parametersatz.
///
/// Pro Richtung entstehen `control_count` Kontrollpunkte, mindestens aber die
/// Ordnung; Bezier nutzt genau die Ordnung und offene Enden.
pub fn build(
    kind: PrimitiveKind,
    params: &ParameterSet,
    control_count: usize,
) -> Result<EditableGeometry, EditError> {
    let mut params = *params;
    if params.geom_type == GeomType::Bezier {
        params.u_end = EndCondition::Open;
        params.v_end = EndCondition::Open;
    }
    let count = |axis: Axis| match params.geom_type {
        GeomType::Bezier => params.order(axis),
        GeomType::Bspline => control_count.max(params.order(axis)),
    };
    let nu = count(Axis::U);
    let nv = count(Axis::V);
    let lin = |i: usize, n: usize| -1.0 + 2.0 * i as f64 / (n - 1).max(1) as f64;
    // Ringe: periodisch ohne Wiederholung (die Abwicklung übernimmt from_grid)
    let ring_angle = |i: usize, n: usize, end: EndCondition| match end {
        EndCondition::Periodic => i as f64 * TAU / n as f64,
        _ => i as f64 * TAU / (n - 1).max(1) as f64,
    };

    let grid: Vec<Vec<DVec3>> = match kind {
        PrimitiveKind::Plane => (0..nv)
            .map(|j| (0..nu).map(|i| DVec3::new(lin(i, nu), lin(j, nv), 0.0)).collect())
            .collect(),
        PrimitiveKind::Cylinder => (0..nv)
            .map(|j| {
                (0..nu)
                    .map(|i| {
                        let a = ring_angle(i, nu, params.u_end);
                        DVec3::new(a.cos(), a.sin(), lin(j, nv))
                    })
                    .collect()
            })
            .collect(),
        PrimitiveKind::Line => vec![(0..nu).map(|i| DVec3::new(lin(i, nu), 0.0, 0.0)).collect()],
        PrimitiveKind::Circle => vec![(0..nu)
            .map(|i| {
                let a = ring_angle(i, nu, params.u_end);
                DVec3::new(a.cos(), a.sin(), 0.0)
            })
            .collect()],
    };

    log::debug!("Startform {} mit {}×{} Kontrollpunkten", kind.label(), nu, grid.len());
    EditableGeometry::from_grid(&params, grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_uses_control_count() {
        let geom = build(PrimitiveKind::Plane, &ParameterSet::default(), 6).expect("Ebene");
        assert_eq!(geom.len(Axis::U), 6);
        assert_eq!(geom.len(Axis::V), 6);
    }

    #[test]
    fn test_count_is_at_least_order() {
        let geom = build(PrimitiveKind::Line, &ParameterSet::default(), 2).expect("Linie");
        assert!(!geom.is_surface());
        assert_eq!(geom.len(Axis::U), 4);
    }

    #[test]
    fn test_bezier_uses_exact_order() {
        let params = ParameterSet {
            geom_type: GeomType::Bezier,
            u_order: 3,
            v_order: 5,
            u_end: EndCondition::Float,
            ..ParameterSet::default()
        };
        let geom = build(PrimitiveKind::Plane, &params, 8).expect("Ebene");
        assert_eq!(geom.len(Axis::U), 3);
        assert_eq!(geom.len(Axis::V), 5);
        assert_eq!(geom.axis(Axis::U).map(|a| a.end), Some(EndCondition::Open));
    }

    #[test]
    fn test_periodic_cylinder_is_closed() {
        let params = ParameterSet {
            u_end: EndCondition::Periodic,
            ..ParameterSet::default()
        };
        let geom = build(PrimitiveKind::Cylinder, &params, 6).expect("Zylinder");
        assert_eq!(geom.len(Axis::U), 9);
        let (a, b) = geom.domain(Axis::U);
        let start = geom.evaluate(a, 0.3);
        let end = geom.evaluate(b, 0.3);
        assert!((start - end).length() < 1e-12);
    }
}
