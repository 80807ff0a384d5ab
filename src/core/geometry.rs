//! EditableGeometry: Kurve oder Fläche mit Kontrollnetz, Knotenvektoren und Trim-Schleifen.
//!
//! Kontrollpunkte liegen homogen vor (x·w, y·w, z·w, w). Nicht-rationale
//! Geometrie hat überall w = 1. Flächen speichern ihr Netz zeilenweise:
//! Index = v · u_len + u (U läuft am schnellsten).

use super::error::EditError;
use super::knot_vector;
use super::params::{Axis, EndCondition, GeomType, ParamType, ParameterSet};
use super::trim::TrimLoop;
use crate::shared::spline_basis::{basis_functions, eval_row, find_span, greville};
use glam::{DVec3, DVec4};
use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;

/// Spline-Daten einer Parameterrichtung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineAxis {
    pub order: usize,
    pub knots: Vec<f64>,
    pub end: EndCondition,
    pub param: ParamType,
}

impl SplineAxis {
    /// Parameterbereich bei `count` Kontrollpunkten in dieser Richtung.
    pub fn domain(&self, count: usize) -> (f64, f64) {
        knot_vector::domain(&self.knots, self.order, count)
    }

    fn try_clone(&self) -> Result<Self, TryReserveError> {
        Ok(Self {
            order: self.order,
            knots: try_clone_slice(&self.knots)?,
            end: self.end,
            param: self.param,
        })
    }
}

/// Freiformkurve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGeom {
    pub axis: SplineAxis,
    pub points: Vec<DVec4>,
    pub rational: bool,
    pub geom_type: GeomType,
}

impl CurveGeom {
    /// Wertet die Kurve (euklidisch) aus; `t` wird auf die Domäne geklemmt.
    pub fn evaluate(&self, t: f64) -> DVec3 {
        let (a, b) = self.axis.domain(self.points.len());
        dehomogenize(eval_row(&self.points, &self.axis.knots, self.axis.order, t.clamp(a, b)))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.axis.domain(self.points.len())
    }

    fn try_clone(&self) -> Result<Self, TryReserveError> {
        Ok(Self {
            axis: self.axis.try_clone()?,
            points: try_clone_slice(&self.points)?,
            rational: self.rational,
            geom_type: self.geom_type,
        })
    }
}

/// Tensorprodukt-Fläche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeom {
    pub u: SplineAxis,
    pub v: SplineAxis,
    pub u_len: usize,
    pub v_len: usize,
    pub points: Vec<DVec4>,
    pub rational: bool,
    pub geom_type: GeomType,
    /// Trim-Schleifen im Parameterraum (Index 0 = primäre Schleife, falls vorhanden)
    #[serde(default)]
    pub trims: Vec<TrimLoop>,
}

impl SurfaceGeom {
    fn try_clone(&self) -> Result<Self, TryReserveError> {
        let mut trims = Vec::new();
        trims.try_reserve_exact(self.trims.len())?;
        for trim in &self.trims {
            trims.push(TrimLoop {
                curve: trim.curve.try_clone()?,
                primary: trim.primary,
            });
        }
        Ok(Self {
            u: self.u.try_clone()?,
            v: self.v.try_clone()?,
            u_len: self.u_len,
            v_len: self.v_len,
            points: try_clone_slice(&self.points)?,
            rational: self.rational,
            geom_type: self.geom_type,
            trims,
        })
    }
}

/// Die editierbare Geometrie einer Sitzung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditableGeometry {
    Curve(CurveGeom),
    Surface(SurfaceGeom),
}

impl EditableGeometry {
    /// Baut Geometrie aus Kontrollpunkt-Reihen entlang U (je Reihe eine V-Zeile).
    ///
    /// Eine einzelne Reihe ergibt eine Kurve. Periodische Richtungen werden
    /// abgewickelt (die ersten Ordnung − 1 Punkte am Ende wiederholt).
    pub fn from_grid(params: &ParameterSet, grid: Vec<Vec<DVec3>>) -> Result<Self, EditError> {
        let is_curve = grid.len() == 1;
        let mut rows: Vec<Vec<DVec4>> = grid
            .into_iter()
            .map(|row| row.into_iter().map(|p| p.extend(1.0)).collect())
            .collect();
        if rows.is_empty() || rows[0].is_empty() {
            return Err(EditError::precondition("Leeres Kontrollnetz"));
        }
        let u_count = rows[0].len();
        if rows.iter().any(|row| row.len() != u_count) {
            return Err(EditError::precondition("Ungleich lange Kontrollpunkt-Reihen"));
        }
        require_points_for_order(Axis::U, params.u_order, u_count)?;
        if !is_curve {
            require_points_for_order(Axis::V, params.v_order, rows.len())?;
        }

        if params.u_end == EndCondition::Periodic {
            for row in &mut rows {
                wrap_periodic(row, params.u_order);
            }
        }
        let u_len = rows[0].len();
        let u_knots = knot_vector::generate(params.u_order, u_len, params.u_end, params.u_param, &rows);
        let u_axis = SplineAxis {
            order: params.u_order,
            knots: u_knots,
            end: params.u_end,
            param: params.u_param,
        };

        let geometry = if is_curve {
            EditableGeometry::Curve(CurveGeom {
                axis: u_axis,
                points: rows.remove(0),
                rational: params.rational,
                geom_type: params.geom_type,
            })
        } else {
            let mut columns = transpose(&rows);
            if params.v_end == EndCondition::Periodic {
                for column in &mut columns {
                    wrap_periodic(column, params.v_order);
                }
            }
            let v_len = columns[0].len();
            let v_knots =
                knot_vector::generate(params.v_order, v_len, params.v_end, params.v_param, &columns);
            let rows = transpose(&columns);
            EditableGeometry::Surface(SurfaceGeom {
                u: u_axis,
                v: SplineAxis {
                    order: params.v_order,
                    knots: v_knots,
                    end: params.v_end,
                    param: params.v_param,
                },
                u_len,
                v_len,
                points: rows.into_iter().flatten().collect(),
                rational: params.rational,
                geom_type: params.geom_type,
                trims: Vec::new(),
            })
        };

        geometry.validate()?;
        Ok(geometry)
    }

    pub fn is_surface(&self) -> bool {
        matches!(self, EditableGeometry::Surface(_))
    }

    /// Bezeichnung für Meldungen.
    pub fn kind_name(&self) -> &'static str {
        match self {
            EditableGeometry::Curve(_) => "Kurve",
            EditableGeometry::Surface(_) => "Fläche",
        }
    }

    /// Spline-Daten einer Richtung (Kurven haben nur U).
    pub fn axis(&self, axis: Axis) -> Option<&SplineAxis> {
        match (self, axis) {
            (EditableGeometry::Curve(c), Axis::U) => Some(&c.axis),
            (EditableGeometry::Curve(_), Axis::V) => None,
            (EditableGeometry::Surface(s), Axis::U) => Some(&s.u),
            (EditableGeometry::Surface(s), Axis::V) => Some(&s.v),
        }
    }

    /// Wie [`Self::axis`], aber mit Fehlermeldung für Kurven ohne V-Richtung.
    pub fn require_axis(&self, axis: Axis) -> Result<&SplineAxis, EditError> {
        self.axis(axis)
            .ok_or_else(|| EditError::precondition("Kurven besitzen keine V-Richtung"))
    }

    pub(crate) fn axis_mut(&mut self, axis: Axis) -> Option<&mut SplineAxis> {
        match (self, axis) {
            (EditableGeometry::Curve(c), Axis::U) => Some(&mut c.axis),
            (EditableGeometry::Curve(_), Axis::V) => None,
            (EditableGeometry::Surface(s), Axis::U) => Some(&mut s.u),
            (EditableGeometry::Surface(s), Axis::V) => Some(&mut s.v),
        }
    }

    /// Anzahl der Kontrollpunkte entlang einer Richtung (Kurve in V: 1).
    pub fn len(&self, axis: Axis) -> usize {
        match (self, axis) {
            (EditableGeometry::Curve(c), Axis::U) => c.points.len(),
            (EditableGeometry::Curve(_), Axis::V) => 1,
            (EditableGeometry::Surface(s), Axis::U) => s.u_len,
            (EditableGeometry::Surface(s), Axis::V) => s.v_len,
        }
    }

    pub fn points(&self) -> &[DVec4] {
        match self {
            EditableGeometry::Curve(c) => &c.points,
            EditableGeometry::Surface(s) => &s.points,
        }
    }

    pub fn points_mut(&mut self) -> &mut Vec<DVec4> {
        match self {
            EditableGeometry::Curve(c) => &mut c.points,
            EditableGeometry::Surface(s) => &mut s.points,
        }
    }

    pub fn is_rational(&self) -> bool {
        match self {
            EditableGeometry::Curve(c) => c.rational,
            EditableGeometry::Surface(s) => s.rational,
        }
    }

    pub fn geom_type(&self) -> GeomType {
        match self {
            EditableGeometry::Curve(c) => c.geom_type,
            EditableGeometry::Surface(s) => s.geom_type,
        }
    }

    pub fn set_geom_type(&mut self, geom_type: GeomType) {
        match self {
            EditableGeometry::Curve(c) => c.geom_type = geom_type,
            EditableGeometry::Surface(s) => s.geom_type = geom_type,
        }
    }

    pub fn trims(&self) -> &[TrimLoop] {
        match self {
            EditableGeometry::Curve(_) => &[],
            EditableGeometry::Surface(s) => &s.trims,
        }
    }

    /// Liest den aktuellen Parametersatz aus der Geometrie.
    pub fn parameter_set(&self) -> ParameterSet {
        let mut params = ParameterSet {
            geom_type: self.geom_type(),
            rational: self.is_rational(),
            ..ParameterSet::default()
        };
        for axis in [Axis::U, Axis::V] {
            if let Some(spline) = self.axis(axis) {
                params.set_order(axis, spline.order);
                params.set_end_condition(axis, spline.end);
                params.set_param_type(axis, spline.param);
            }
        }
        params
    }

    /// Parameterbereich einer Richtung (Kurve in V: `(0, 0)`).
    pub fn domain(&self, axis: Axis) -> (f64, f64) {
        self.axis(axis)
            .map_or((0.0, 0.0), |spline| spline.domain(self.len(axis)))
    }

    /// Kontrollpunkt-Reihen entlang `axis` (jede Reihe hat `len(axis)` Punkte).
    pub fn rows(&self, axis: Axis) -> Result<Vec<Vec<DVec4>>, EditError> {
        match (self, axis) {
            (EditableGeometry::Curve(c), Axis::U) => Ok(vec![c.points.clone()]),
            (EditableGeometry::Curve(_), Axis::V) => {
                Err(EditError::precondition("Kurven besitzen keine V-Richtung"))
            }
            (EditableGeometry::Surface(s), Axis::U) => Ok(s
                .points
                .chunks(s.u_len)
                .map(<[DVec4]>::to_vec)
                .collect()),
            (EditableGeometry::Surface(s), Axis::V) => Ok((0..s.u_len)
                .map(|u| (0..s.v_len).map(|v| s.points[v * s.u_len + u]).collect())
                .collect()),
        }
    }

    /// Ersetzt alle Reihen entlang `axis` samt Spline-Daten dieser Richtung.
    ///
    /// Die Gegenrichtung bleibt unverändert; alle Reihen müssen gleich lang sein.
    pub fn with_rows(
        &self,
        axis: Axis,
        rows: Vec<Vec<DVec4>>,
        spline: SplineAxis,
    ) -> Result<Self, EditError> {
        let new_len = rows.first().map_or(0, Vec::len);
        if new_len == 0 || rows.iter().any(|row| row.len() != new_len) {
            return Err(EditError::precondition("Ungleich lange Kontrollpunkt-Reihen"));
        }

        let mut result = match (self, axis) {
            (EditableGeometry::Curve(c), Axis::U) => EditableGeometry::Curve(CurveGeom {
                axis: spline,
                points: rows.into_iter().next().unwrap_or_default(),
                rational: c.rational,
                geom_type: c.geom_type,
            }),
            (EditableGeometry::Curve(_), Axis::V) => {
                return Err(EditError::precondition("Kurven besitzen keine V-Richtung"));
            }
            (EditableGeometry::Surface(s), Axis::U) => {
                if rows.len() != s.v_len {
                    return Err(EditError::precondition("Falsche Anzahl von U-Reihen"));
                }
                EditableGeometry::Surface(SurfaceGeom {
                    u: spline,
                    v: s.v.clone(),
                    u_len: new_len,
                    v_len: s.v_len,
                    points: rows.into_iter().flatten().collect(),
                    rational: s.rational,
                    geom_type: s.geom_type,
                    trims: s.trims.clone(),
                })
            }
            (EditableGeometry::Surface(s), Axis::V) => {
                if rows.len() != s.u_len {
                    return Err(EditError::precondition("Falsche Anzahl von V-Spalten"));
                }
                EditableGeometry::Surface(SurfaceGeom {
                    u: s.u.clone(),
                    v: spline,
                    u_len: s.u_len,
                    v_len: new_len,
                    points: transpose(&rows).into_iter().flatten().collect(),
                    rational: s.rational,
                    geom_type: s.geom_type,
                    trims: s.trims.clone(),
                })
            }
        };
        result.settle_geom_type();
        result.settle_weights();
        Ok(result)
    }

    /// Nicht-rationale Gewichte nach Kollokation oder Einfügung wieder exakt auf 1 setzen.
    fn settle_weights(&mut self) {
        if self.is_rational() {
            return;
        }
        for point in self.points_mut().iter_mut() {
            point.w = 1.0;
        }
    }

    /// Bezier bleibt nur, solange alle Richtungen geklemmt sind und keine inneren Knoten haben.
    pub fn settle_geom_type(&mut self) {
        if self.geom_type() != GeomType::Bezier {
            return;
        }
        let still_bezier = [Axis::U, Axis::V].into_iter().all(|axis| {
            self.axis(axis).map_or(true, |spline| {
                knot_vector::is_clamped(&spline.knots, spline.order)
                    && knot_vector::interior(&spline.knots, spline.order).is_empty()
            })
        });
        if !still_bezier {
            self.set_geom_type(GeomType::Bspline);
        }
    }

    /// Homogene Auswertung; Parameter werden auf die Domäne geklemmt.
    pub fn evaluate_homogeneous(&self, u: f64, v: f64) -> DVec4 {
        match self {
            EditableGeometry::Curve(c) => {
                let (a, b) = c.domain();
                eval_row(&c.points, &c.axis.knots, c.axis.order, u.clamp(a, b))
            }
            EditableGeometry::Surface(s) => {
                let (ua, ub) = s.u.domain(s.u_len);
                let (va, vb) = s.v.domain(s.v_len);
                let u = u.clamp(ua, ub);
                let v = v.clamp(va, vb);
                let span = find_span(&s.v.knots, s.v.order, s.v_len, v);
                let basis = basis_functions(&s.v.knots, s.v.order, span, v);
                let first = span + 1 - s.v.order;
                basis.iter().enumerate().fold(DVec4::ZERO, |acc, (i, &b)| {
                    let row = first + i;
                    let slice = &s.points[row * s.u_len..(row + 1) * s.u_len];
                    acc + eval_row(slice, &s.u.knots, s.u.order, u) * b
                })
            }
        }
    }

    /// Euklidischer Punkt S(u, v) (bei Kurven wird `v` ignoriert).
    pub fn evaluate(&self, u: f64, v: f64) -> DVec3 {
        dehomogenize(self.evaluate_homogeneous(u, v))
    }

    /// Prüft alle Invarianten: Knotenlängen, Monotonie, Vielfachheit, Punktanzahl, Gewichte.
    pub fn validate(&self) -> Result<(), EditError> {
        for axis in [Axis::U, Axis::V] {
            if let Some(spline) = self.axis(axis) {
                let count = self.len(axis);
                if !knot_vector::is_well_formed(&spline.knots, spline.order, count) {
                    return Err(EditError::precondition(format!(
                        "Knotenvektor in {:?} ungültig (Ordnung {}, {} Punkte, {} Knoten)",
                        axis,
                        spline.order,
                        count,
                        spline.knots.len()
                    )));
                }
            }
        }
        let expected = self.len(Axis::U) * self.len(Axis::V);
        if self.points().len() != expected {
            return Err(EditError::precondition(format!(
                "Kontrollnetz hat {} statt {} Punkte",
                self.points().len(),
                expected
            )));
        }
        let rational = self.is_rational();
        let weights_ok = self.points().iter().all(|p| {
            p.is_finite() && if rational { p.w > 0.0 } else { p.w == 1.0 }
        });
        if !weights_ok {
            return Err(EditError::precondition(
                "Gewichte passen nicht zur Rationalitäts-Einstellung",
            ));
        }
        Ok(())
    }

    /// Unabhängige Tiefenkopie mit fehlbarer Speicherreservierung.
    pub fn try_clone(&self) -> Result<Self, EditError> {
        let cloned = match self {
            EditableGeometry::Curve(c) => EditableGeometry::Curve(c.try_clone()?),
            EditableGeometry::Surface(s) => EditableGeometry::Surface(s.try_clone()?),
        };
        Ok(cloned)
    }

    /// Schaltet Rationalität um; `false` de-homogenisiert alle Punkte (w → 1).
    pub fn set_rational(&mut self, rational: bool) {
        if !rational {
            for point in self.points_mut().iter_mut() {
                *point = dehomogenize(*point).extend(1.0);
            }
        }
        match self {
            EditableGeometry::Curve(c) => c.rational = rational,
            EditableGeometry::Surface(s) => s.rational = rational,
        }
    }

    /// (u-Index, v-Index) eines flachen Kontrollpunkt-Index.
    pub fn grid_index(&self, index: usize) -> (usize, usize) {
        let u_len = self.len(Axis::U);
        (index % u_len, index / u_len)
    }

    /// Euklidische Position eines Kontrollpunkts.
    pub fn control_point(&self, index: usize) -> Option<DVec3> {
        self.points().get(index).map(|p| dehomogenize(*p))
    }

    /// Setzt einen Kontrollpunkt (euklidisch, Gewicht bleibt) inklusive periodischer Zwillinge.
    pub fn set_control_point(&mut self, index: usize, position: DVec3) -> bool {
        let Some(&old) = self.points().get(index) else {
            return false;
        };
        let (iu, iv) = self.grid_index(index);
        let u_len = self.len(Axis::U);
        let us = self.periodic_twins(Axis::U, iu);
        let vs = self.periodic_twins(Axis::V, iv);
        let value = (position * old.w).extend(old.w);
        let points = self.points_mut();
        for &v in &vs {
            for &u in &us {
                points[v * u_len + u] = value;
            }
        }
        true
    }

    /// Alle Indizes entlang `axis`, die bei periodischer Abwicklung denselben Punkt tragen.
    pub fn periodic_twins(&self, axis: Axis, index: usize) -> Vec<usize> {
        let Some(spline) = self.axis(axis) else {
            return vec![index];
        };
        if spline.end != EndCondition::Periodic {
            return vec![index];
        }
        let count = self.len(axis);
        let wrap = spline.order - 1;
        let base = count - wrap;
        if index < wrap {
            vec![index, index + base]
        } else if index >= base {
            vec![index - base, index]
        } else {
            vec![index]
        }
    }

    /// Greville-Parameter (Knotenmittel) eines Kontrollpunkts.
    pub fn node_params(&self, index: usize) -> (f64, f64) {
        let (iu, iv) = self.grid_index(index);
        let node = |axis: Axis, i: usize| {
            self.axis(axis).map_or(0.0, |spline| {
                greville(&spline.knots, spline.order, self.len(axis))[i]
            })
        };
        (node(Axis::U, iu), node(Axis::V, iv))
    }

    /// Größte Ausdehnung der Bounding-Box des (euklidischen) Kontrollnetzes.
    pub fn extent(&self) -> f64 {
        let mut min = DVec3::splat(f64::INFINITY);
        let mut max = DVec3::splat(f64::NEG_INFINITY);
        for p in self.points() {
            let e = dehomogenize(*p);
            min = min.min(e);
            max = max.max(e);
        }
        if self.points().is_empty() {
            return 0.0;
        }
        (max - min).max_element()
    }

    /// Wendet eine Abbildung auf alle Trim-Schleifen (Parameterraum) an.
    pub(crate) fn map_trims(&mut self, f: impl Fn(DVec4) -> DVec4) {
        if let EditableGeometry::Surface(s) = self {
            for trim in &mut s.trims {
                for p in &mut trim.curve.points {
                    *p = f(*p);
                }
            }
        }
    }

    pub(crate) fn trims_mut(&mut self) -> Option<&mut Vec<TrimLoop>> {
        match self {
            EditableGeometry::Curve(_) => None,
            EditableGeometry::Surface(s) => Some(&mut s.trims),
        }
    }
}

/// Homogener Punkt → euklidischer Punkt.
pub fn dehomogenize(p: DVec4) -> DVec3 {
    if p.w == 0.0 {
        p.truncate()
    } else {
        p.truncate() / p.w
    }
}

/// Hängt die ersten `order - 1` Punkte hinten an (periodische Abwicklung).
pub fn wrap_periodic(row: &mut Vec<DVec4>, order: usize) {
    let wrap = (order - 1).min(row.len());
    let head: Vec<DVec4> = row[..wrap].to_vec();
    row.extend(head);
}

/// Entfernt die periodischen Wiederholungen am Ende einer Reihe.
pub fn unwrap_periodic(row: &mut Vec<DVec4>, order: usize) {
    let wrap = order - 1;
    if row.len() > wrap {
        row.truncate(row.len() - wrap);
    }
}

/// Vertauscht Reihen und Spalten (alle Reihen gleich lang).
pub fn transpose(rows: &[Vec<DVec4>]) -> Vec<Vec<DVec4>> {
    let width = rows.first().map_or(0, Vec::len);
    (0..width)
        .map(|i| rows.iter().map(|row| row[i]).collect())
        .collect()
}

fn require_points_for_order(axis: Axis, order: usize, count: usize) -> Result<(), EditError> {
    if order == 0 || count < order {
        return Err(EditError::precondition(format!(
            "Ordnung {order} in {axis:?} braucht mindestens {order} Kontrollpunkte (vorhanden: {count})"
        )));
    }
    Ok(())
}

fn try_clone_slice<T: Clone>(src: &[T]) -> Result<Vec<T>, TryReserveError> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())?;
    out.extend_from_slice(src);
    Ok(out)
}
