//! TrimEngine: Anhängen und Prüfen von Trim-Schleifen im Parameterraum.
//!
//! Eine Trim-Schleife ist eine Kurve, deren Kontrollpunkte (x, y) als
//! (u, v)-Parameter der Fläche gelesen werden. z wird ignoriert.

use super::error::EditError;
use super::geometry::{dehomogenize, CurveGeom, EditableGeometry};
use super::params::Axis;
use serde::{Deserialize, Serialize};

/// Geschlossene Begrenzungskurve im Parameterraum einer Fläche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimLoop {
    pub curve: CurveGeom,
    /// Primäre (äußere) Schleife; es gibt höchstens eine
    pub primary: bool,
}

impl TrimLoop {
    /// Liegen alle Kontrollpunkte innerhalb des Rechtecks (mit Toleranz)?
    ///
    /// Wegen der Konvexe-Hülle-Eigenschaft liegt dann auch die Kurve darin.
    pub fn inside(&self, u_domain: (f64, f64), v_domain: (f64, f64), tolerance: f64) -> bool {
        self.curve.points.iter().all(|p| {
            let e = dehomogenize(*p);
            e.x >= u_domain.0 - tolerance
                && e.x <= u_domain.1 + tolerance
                && e.y >= v_domain.0 - tolerance
                && e.y <= v_domain.1 + tolerance
        })
    }

    /// Abstand zwischen Anfangs- und Endpunkt der Schleife (im Parameterraum).
    pub fn closure_gap(&self) -> f64 {
        let (a, b) = self.curve.domain();
        let start = self.curve.evaluate(a).truncate();
        let end = self.curve.evaluate(b).truncate();
        start.distance(end)
    }
}

/// Hängt `boundary` als Trim-Schleife an eine Kopie von `geom` an.
///
/// Offene Kurven und Kurven außerhalb der Domäne werden abgewiesen. Eine
/// primäre Schleife ersetzt die bisherige primäre, sekundäre werden angehängt.
pub fn trim_srf(
    geom: &EditableGeometry,
    boundary: &EditableGeometry,
    primary: bool,
    tolerance: f64,
) -> Result<EditableGeometry, EditError> {
    if !geom.is_surface() {
        return Err(EditError::precondition("Nur Flächen können getrimmt werden"));
    }
    let EditableGeometry::Curve(curve) = boundary else {
        return Err(EditError::precondition("Trim-Schleife muss eine Kurve sein"));
    };

    let trim = TrimLoop {
        curve: curve.clone(),
        primary,
    };
    let gap = trim.closure_gap();
    if gap > tolerance {
        return Err(EditError::precondition(format!(
            "Trim-Kurve ist nicht geschlossen (Abstand {gap:.3e})"
        )));
    }
    if !trim.inside(geom.domain(Axis::U), geom.domain(Axis::V), tolerance) {
        return Err(EditError::precondition(
            "Trim-Kurve liegt außerhalb der Flächendomäne",
        ));
    }

    let mut result = geom.try_clone()?;
    if let Some(trims) = result.trims_mut() {
        trims.try_reserve(1)?;
        if primary {
            trims.retain(|t| !t.primary);
            trims.insert(0, trim);
        } else {
            trims.push(trim);
        }
    }
    log::info!(
        "Trim-Schleife angehängt ({}, {} Schleifen)",
        if primary { "primär" } else { "sekundär" },
        result.trims().len()
    );
    Ok(result)
}

/// Entfernt Schleifen, die nicht mehr in der (neuen) Domäne liegen.
pub fn retain_inside_domain(geom: &mut EditableGeometry, tolerance: f64) {
    let u_domain = geom.domain(Axis::U);
    let v_domain = geom.domain(Axis::V);
    if let Some(trims) = geom.trims_mut() {
        let before = trims.len();
        trims.retain(|t| t.inside(u_domain, v_domain, tolerance));
        if trims.len() != before {
            log::debug!("{} Trim-Schleifen verworfen", before - trims.len());
        }
    }
}
