//! RefinementEngine: Knoteneinfügung, Unterteilung, Graderhöhung, Verschmelzen,
//! Teilbereich und Umkehrung.
//!
//! Alle Funktionen arbeiten auf einer Kopie und geben neue Geometrie zurück.
//! Bei einem Fehler bleibt die Eingabe unverändert (alles oder nichts).

use super::error::EditError;
use super::geometry::{unwrap_periodic, wrap_periodic, EditableGeometry, SplineAxis, SurfaceGeom};
use super::knot_vector;
use super::params::{Axis, EndCondition, GeomType, ParamType};
use super::trim::retain_inside_domain;
use crate::shared::spline_basis::{
    eval_row, greville, insert_knot, interpolate_row, multiplicity, KNOT_EPSILON,
};
use glam::DVec4;
use serde::{Deserialize, Serialize};

/// Stetigkeit an einer Unterteilungsstelle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuity {
    /// Volle Vielfachheit: die Fläche zerfällt in zwei unabhängige Hälften
    C0,
    /// Vielfachheit Ordnung − 1: ein Objekt mit Naht
    C1,
}

impl Continuity {
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::C0),
            1 => Some(Self::C1),
            _ => None,
        }
    }
}

/// Ergebnis von [`subdiv_srf`].
#[derive(Debug, Clone, PartialEq)]
pub enum Subdivision {
    Split {
        low: EditableGeometry,
        high: EditableGeometry,
    },
    Seamed(EditableGeometry),
}

/// Richtung einer Umkehrung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReverseMode {
    U,
    V,
    /// U und V vertauschen
    Swap,
}

impl ReverseMode {
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::U),
            1 => Some(Self::V),
            2 => Some(Self::Swap),
            _ => None,
        }
    }
}

/// Ergebnis von [`reverse_srf`]; `flips_normal` muss der Aufrufer übernehmen.
#[derive(Debug, Clone, PartialEq)]
pub struct Reversal {
    pub geometry: EditableGeometry,
    pub flips_normal: bool,
}

/// Formerhaltende Einfügung aller `params` entlang `axis`.
///
/// Scheitert, wenn ein Parameter außerhalb der Domäne liegt oder eine
/// Vielfachheit über die Ordnung steigen würde.
pub fn refine_srf(
    geom: &EditableGeometry,
    params: &[f64],
    axis: Axis,
) -> Result<EditableGeometry, EditError> {
    if params.is_empty() {
        return Err(EditError::precondition("Keine Einfügeparameter angegeben"));
    }
    let geom = unperiodize(geom, axis)?;
    let spline = geom.require_axis(axis)?;
    let (a, b) = geom.domain(axis);

    let mut sorted = params.to_vec();
    sorted.sort_by(f64::total_cmp);
    for &t in &sorted {
        if !t.is_finite() || t < a - KNOT_EPSILON || t > b + KNOT_EPSILON {
            return Err(EditError::precondition(format!(
                "Parameter {t} liegt außerhalb der Domäne [{a}, {b}]"
            )));
        }
        let requested = sorted
            .iter()
            .filter(|&&s| (s - t).abs() <= KNOT_EPSILON)
            .count();
        if multiplicity(&spline.knots, t) + requested > spline.order {
            return Err(EditError::precondition(format!(
                "Knoten {t} würde Vielfachheit {} überschreiten",
                spline.order
            )));
        }
    }

    let spline = spline.clone();
    let rows = geom.rows(axis)?;
    let (rows, knots) = insert_all(rows, &spline.knots, spline.order, &sorted);
    let refined = geom.with_rows(axis, rows, SplineAxis { knots, ..spline })?;
    log::debug!("{} Knoten in {:?} eingefügt", sorted.len(), axis);
    Ok(refined)
}

/// Fügt in die Mitte jeder nicht leeren Knotenspanne einen Knoten ein.
pub fn refine_uniform(geom: &EditableGeometry, axis: Axis) -> Result<EditableGeometry, EditError> {
    let floated = unperiodize(geom, axis)?;
    let spline = floated.require_axis(axis)?;
    let mids = knot_vector::span_midpoints(&spline.knots, spline.order, floated.len(axis));
    refine_srf(&floated, &mids, axis)
}

/// Unterteilt bei `t`; C0 trennt in zwei Hälften, C1 hinterlässt eine Naht.
pub fn subdiv_srf(
    geom: &EditableGeometry,
    t: f64,
    continuity: Continuity,
    axis: Axis,
) -> Result<Subdivision, EditError> {
    let (a, b) = geom.domain(axis);
    geom.require_axis(axis)?;
    if !(t > a + KNOT_EPSILON && t < b - KNOT_EPSILON) {
        return Err(EditError::precondition(format!(
            "Unterteilungsparameter {t} liegt nicht im Inneren von [{a}, {b}]"
        )));
    }

    let geom = unperiodize(geom, axis)?;
    let order = geom.require_axis(axis)?.order;
    let target = match continuity {
        Continuity::C0 => order,
        Continuity::C1 => order - 1,
    };
    let refined = raise_multiplicity(&geom, t, target, axis)?;

    match continuity {
        Continuity::C1 => Ok(Subdivision::Seamed(refined)),
        Continuity::C0 => {
            let spline = refined.require_axis(axis)?.clone();
            let rows = refined.rows(axis)?;
            let first = spline
                .knots
                .iter()
                .position(|k| (k - t).abs() <= KNOT_EPSILON)
                .ok_or_else(|| EditError::precondition("Unterteilungsknoten fehlt"))?;

            let low_rows: Vec<Vec<DVec4>> = rows.iter().map(|r| r[..first].to_vec()).collect();
            let high_rows: Vec<Vec<DVec4>> = rows.iter().map(|r| r[first..].to_vec()).collect();

            let mut low_knots = spline.knots[..first].to_vec();
            low_knots.extend(std::iter::repeat(t).take(order));
            let mut high_knots = vec![t; order];
            high_knots.extend_from_slice(&spline.knots[first + order..]);

            let mut low = refined.with_rows(axis, low_rows, half_axis(&spline, low_knots))?;
            let mut high = refined.with_rows(axis, high_rows, half_axis(&spline, high_knots))?;
            retain_inside_domain(&mut low, KNOT_EPSILON);
            retain_inside_domain(&mut high, KNOT_EPSILON);
            low.validate()?;
            high.validate()?;
            Ok(Subdivision::Split { low, high })
        }
    }
}

/// Ordnungserhöhung um eins entlang `axis`, formerhaltend.
///
/// Float/Periodic werden vorher auf Open geklemmt. Innere Knoten mit voller
/// Vielfachheit (Unstetigkeiten) werden abgewiesen.
pub fn degree_raise(geom: &EditableGeometry, axis: Axis) -> Result<EditableGeometry, EditError> {
    let spline = geom.require_axis(axis)?;
    let clamped = if spline.end == EndCondition::Open {
        geom.try_clone()?
    } else {
        log::debug!("{:?}-Richtung vor Graderhöhung geklemmt", axis);
        clamp_axis(geom, axis)?
    };
    let spline = clamped.require_axis(axis)?.clone();
    let order = spline.order;
    if knot_vector::interior(&spline.knots, order)
        .iter()
        .any(|&k| multiplicity(&spline.knots, k) >= order)
    {
        return Err(EditError::precondition(
            "Graderhöhung über eine Unstetigkeit ist nicht möglich",
        ));
    }

    let new_order = order + 1;
    let mut new_knots = Vec::with_capacity(spline.knots.len() * 2);
    let mut i = 0;
    while i < spline.knots.len() {
        let k = spline.knots[i];
        let run = spline.knots[i..]
            .iter()
            .take_while(|&&x| (x - k).abs() <= KNOT_EPSILON)
            .count();
        new_knots.extend(std::iter::repeat(k).take(run + 1));
        i += run;
    }
    let new_count = new_knots.len() - new_order;
    let taus = greville(&new_knots, new_order, new_count);

    let mut rows = Vec::new();
    for row in clamped.rows(axis)? {
        let values: Vec<DVec4> = taus
            .iter()
            .map(|&t| eval_row(&row, &spline.knots, order, t))
            .collect();
        let raised = interpolate_row(&new_knots, new_order, &taus, &values)
            .ok_or_else(|| EditError::precondition("Kollokationssystem singulär"))?;
        rows.push(raised);
    }

    let raised = clamped.with_rows(
        axis,
        rows,
        SplineAxis {
            order: new_order,
            knots: new_knots,
            end: EndCondition::Open,
            param: spline.param,
        },
    )?;
    raised.validate()?;
    log::debug!("Ordnung in {:?} auf {} erhöht", axis, new_order);
    Ok(raised)
}

/// Schneidet den Teilbereich `[t1, t2]` entlang `axis` heraus.
pub fn domain_from_srf(
    geom: &EditableGeometry,
    t1: f64,
    t2: f64,
    axis: Axis,
) -> Result<EditableGeometry, EditError> {
    let (t1, t2) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    let (a, b) = geom.domain(axis);
    geom.require_axis(axis)?;
    if t1 < a - KNOT_EPSILON || t2 > b + KNOT_EPSILON || t2 - t1 <= KNOT_EPSILON {
        return Err(EditError::precondition(format!(
            "Teilbereich [{t1}, {t2}] liegt nicht in [{a}, {b}]"
        )));
    }
    let t1 = t1.max(a);
    let t2 = t2.min(b);

    let geom = unperiodize(geom, axis)?;
    let order = geom.require_axis(axis)?.order;
    let degree = order - 1;
    let target = degree.max(1);
    let refined = raise_multiplicity(&geom, t1, target, axis)?;
    let refined = raise_multiplicity(&refined, t2, target, axis)?;

    let spline = refined.require_axis(axis)?.clone();
    let knots = &spline.knots;
    let last_t1 = knots
        .iter()
        .rposition(|k| (k - t1).abs() <= KNOT_EPSILON)
        .ok_or_else(|| EditError::precondition("Bereichsknoten fehlt"))?;
    let first_t2 = knots
        .iter()
        .position(|k| (k - t2).abs() <= KNOT_EPSILON)
        .ok_or_else(|| EditError::precondition("Bereichsknoten fehlt"))?;
    let start = last_t1 - degree;
    let end = first_t2 - 1;

    let rows: Vec<Vec<DVec4>> = refined
        .rows(axis)?
        .into_iter()
        .map(|row| row[start..=end].to_vec())
        .collect();
    let mut new_knots = vec![t1; order];
    new_knots.extend_from_slice(&knots[last_t1 + 1..first_t2]);
    new_knots.extend(std::iter::repeat(t2).take(order));

    let mut region = refined.with_rows(
        axis,
        rows,
        SplineAxis {
            knots: new_knots,
            end: EndCondition::Open,
            ..spline
        },
    )?;
    retain_inside_domain(&mut region, KNOT_EPSILON);
    region.validate()?;
    Ok(region)
}

/// Verschmilzt zwei Geometrien an einer gemeinsamen Randkurve (erst U, dann V).
///
/// Der gemeinsame Rand darf an beliebigen Enden liegen und gegenläufig
/// parametrisiert sein; die Eingaben werden dazu umgeordnet bzw. umgekehrt.
/// Beide Eingaben bleiben unverändert; bei Misserfolg: „Inkompatible Flächen“.
pub fn merge_srfs(
    first: &EditableGeometry,
    second: &EditableGeometry,
    tolerance: f64,
) -> Result<EditableGeometry, EditError> {
    if first.is_surface() != second.is_surface() {
        return Err(EditError::precondition(
            "Inkompatible Flächen: Kurve und Fläche lassen sich nicht verschmelzen",
        ));
    }
    let axes: &[Axis] = if first.is_surface() {
        &[Axis::U, Axis::V]
    } else {
        &[Axis::U]
    };
    let cross_flips: &[bool] = if first.is_surface() {
        &[false, true]
    } else {
        &[false]
    };

    let mut reasons = Vec::new();
    for &axis in axes {
        let mut reason = None;
        for layout in MERGE_LAYOUTS {
            for &flip_cross in cross_flips {
                let (a, b) = layout.arrange(first, second, axis, flip_cross)?;
                match merge_along(&a, &b, axis, tolerance) {
                    Ok(merged) => {
                        log::info!(
                            "Geometrien entlang {:?} verschmolzen ({:?}, quer umgekehrt: {})",
                            axis,
                            layout,
                            flip_cross
                        );
                        return Ok(merged);
                    }
                    Err(EditError::GeometricPrecondition(r)) => {
                        reason.get_or_insert(r);
                    }
                    Err(other) => return Err(other),
                }
            }
        }
        if let Some(reason) = reason {
            reasons.push(format!("{axis:?}: {reason}"));
        }
    }
    Err(EditError::precondition(format!(
        "Inkompatible Flächen ({})",
        reasons.join("; ")
    )))
}

/// Anordnung zweier Operanden, bei der das Ende des ersten am Anfang des zweiten liegt.
#[derive(Debug, Clone, Copy)]
enum MergeLayout {
    /// Ende von `first` an Anfang von `second`
    Direct,
    /// Ende von `second` an Anfang von `first`
    Swapped,
    /// Ende an Ende: `second` umgekehrt
    EndToEnd,
    /// Anfang an Anfang: `first` umgekehrt
    StartToStart,
}

const MERGE_LAYOUTS: [MergeLayout; 4] = [
    MergeLayout::Direct,
    MergeLayout::Swapped,
    MergeLayout::EndToEnd,
    MergeLayout::StartToStart,
];

impl MergeLayout {
    fn arrange(
        self,
        first: &EditableGeometry,
        second: &EditableGeometry,
        axis: Axis,
        flip_cross: bool,
    ) -> Result<(EditableGeometry, EditableGeometry), EditError> {
        let (a, b) = match self {
            Self::Direct => (first.try_clone()?, second.try_clone()?),
            Self::Swapped => (second.try_clone()?, first.try_clone()?),
            Self::EndToEnd => (first.try_clone()?, reverse_axis(second, axis)?),
            Self::StartToStart => (reverse_axis(first, axis)?, second.try_clone()?),
        };
        let b = if flip_cross {
            reverse_axis(&b, axis.other())?
        } else {
            b
        };
        Ok((a, b))
    }
}

/// Kehrt eine Parameterrichtung um oder vertauscht U und V.
pub fn reverse_srf(geom: &EditableGeometry, mode: ReverseMode) -> Result<Reversal, EditError> {
    let geometry = match mode {
        ReverseMode::U => reverse_axis(geom, Axis::U)?,
        ReverseMode::V => reverse_axis(geom, Axis::V)?,
        ReverseMode::Swap => swap_axes(geom)?,
    };
    geometry.validate()?;
    Ok(Reversal {
        geometry,
        flips_normal: true,
    })
}

/// Neuaufbau einer Richtung mit denselben Kontrollpunkten und frisch erzeugten Knoten.
///
/// Wird für Ordnungs-Verringerung, Endbedingungs- und Parametrisierungswechsel benutzt.
pub fn refit_axis(
    geom: &EditableGeometry,
    axis: Axis,
    order: usize,
    end: EndCondition,
    param: ParamType,
) -> Result<EditableGeometry, EditError> {
    let old = geom.require_axis(axis)?;
    let mut rows = geom.rows(axis)?;
    if old.end == EndCondition::Periodic {
        for row in &mut rows {
            unwrap_periodic(row, old.order);
        }
    }
    let base = rows.first().map_or(0, Vec::len);
    if order == 0 || base < order {
        return Err(EditError::precondition(format!(
            "Ordnung {order} braucht mindestens {order} Kontrollpunkte (vorhanden: {base})"
        )));
    }
    if end == EndCondition::Periodic {
        for row in &mut rows {
            wrap_periodic(row, order);
        }
    }
    let count = rows[0].len();
    let knots = knot_vector::generate(order, count, end, param, &rows);
    let refit = geom.with_rows(axis, rows, SplineAxis { order, knots, end, param })?;
    refit.validate()?;
    Ok(refit)
}

/// Wandelt auf Bezier um: Ordnung = Kontrollpunktanzahl, offene Enden.
pub fn to_bezier(geom: &EditableGeometry) -> Result<EditableGeometry, EditError> {
    let mut result = geom.try_clone()?;
    for axis in [Axis::U, Axis::V] {
        let Some(spline) = result.axis(axis).cloned() else {
            continue;
        };
        let count = match spline.end {
            EndCondition::Periodic => result.len(axis) - (spline.order - 1),
            _ => result.len(axis),
        };
        result = refit_axis(&result, axis, count, EndCondition::Open, spline.param)?;
    }
    result.set_geom_type(GeomType::Bezier);
    Ok(result)
}

/// Klemmt eine Float/Periodic-Richtung formerhaltend auf Open.
pub fn clamp_axis(geom: &EditableGeometry, axis: Axis) -> Result<EditableGeometry, EditError> {
    let (a, b) = geom.domain(axis);
    domain_from_srf(geom, a, b, axis)
}

// ---------------------------------------------------------------------------
// Interne Helfer
// ---------------------------------------------------------------------------

/// Periodische Richtung → Float mit identischer Form (Zwillinge werden unabhängig).
fn unperiodize(geom: &EditableGeometry, axis: Axis) -> Result<EditableGeometry, EditError> {
    let mut result = geom.try_clone()?;
    if let Some(spline) = result.axis_mut(axis) {
        if spline.end == EndCondition::Periodic {
            spline.end = EndCondition::Float;
            log::info!("{:?}-Richtung für die Verfeinerung von Periodic auf Float umgestellt", axis);
        }
    }
    Ok(result)
}

/// Fügt `t` ein, bis seine Vielfachheit mindestens `target` beträgt.
fn raise_multiplicity(
    geom: &EditableGeometry,
    t: f64,
    target: usize,
    axis: Axis,
) -> Result<EditableGeometry, EditError> {
    let spline = geom.require_axis(axis)?;
    let existing = multiplicity(&spline.knots, t);
    if existing >= target {
        return geom.try_clone();
    }
    let inserts = vec![t; target - existing];
    let spline = spline.clone();
    let (rows, knots) = insert_all(geom.rows(axis)?, &spline.knots, spline.order, &inserts);
    geom.with_rows(axis, rows, SplineAxis { knots, ..spline })
}

/// Fügt alle (sortierten) Parameter nacheinander in jede Reihe ein.
fn insert_all(
    rows: Vec<Vec<DVec4>>,
    knots: &[f64],
    order: usize,
    params: &[f64],
) -> (Vec<Vec<DVec4>>, Vec<f64>) {
    let mut new_knots = knots.to_vec();
    let mut new_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut pts = row;
        let mut kv = knots.to_vec();
        for &t in params {
            let (p, k) = insert_knot(&pts, &kv, order, t);
            pts = p;
            kv = k;
        }
        new_knots = kv;
        new_rows.push(pts);
    }
    (new_rows, new_knots)
}

fn half_axis(spline: &SplineAxis, knots: Vec<f64>) -> SplineAxis {
    let end = if knot_vector::is_clamped(&knots, spline.order) {
        EndCondition::Open
    } else {
        EndCondition::Float
    };
    SplineAxis {
        order: spline.order,
        knots,
        end,
        param: spline.param,
    }
}

fn reverse_axis(geom: &EditableGeometry, axis: Axis) -> Result<EditableGeometry, EditError> {
    let spline = geom.require_axis(axis)?.clone();
    let (a, b) = geom.domain(axis);
    let knots: Vec<f64> = spline.knots.iter().rev().map(|k| a + b - k).collect();
    let rows: Vec<Vec<DVec4>> = geom
        .rows(axis)?
        .into_iter()
        .map(|mut row| {
            row.reverse();
            row
        })
        .collect();
    let mut reversed = geom.with_rows(axis, rows, SplineAxis { knots, ..spline })?;
    reversed.map_trims(|p| match axis {
        Axis::U => DVec4::new((a + b) * p.w - p.x, p.y, p.z, p.w),
        Axis::V => DVec4::new(p.x, (a + b) * p.w - p.y, p.z, p.w),
    });
    Ok(reversed)
}

fn swap_axes(geom: &EditableGeometry) -> Result<EditableGeometry, EditError> {
    let EditableGeometry::Surface(surface) = geom else {
        return Err(EditError::precondition("Vertauschen von U und V nur bei Flächen"));
    };
    let columns = geom.rows(Axis::V)?;
    let mut swapped = EditableGeometry::Surface(SurfaceGeom {
        u: surface.v.clone(),
        v: surface.u.clone(),
        u_len: surface.v_len,
        v_len: surface.u_len,
        points: columns.into_iter().flatten().collect(),
        rational: surface.rational,
        geom_type: surface.geom_type,
        trims: surface.trims.clone(),
    });
    swapped.map_trims(|p| DVec4::new(p.y, p.x, p.z, p.w));
    Ok(swapped)
}

/// Verschmilzt `first` (Ende) mit `second` (Anfang) entlang `axis`.
fn merge_along(
    first: &EditableGeometry,
    second: &EditableGeometry,
    axis: Axis,
    tolerance: f64,
) -> Result<EditableGeometry, EditError> {
    let mut g1 = first.try_clone()?;
    let mut g2 = second.try_clone()?;

    // Rationalität angleichen
    if g1.is_rational() != g2.is_rational() {
        g1.set_rational(true);
        g2.set_rational(true);
    }

    // Ordnungen angleichen (Graderhöhung klemmt Float/Periodic auf Open)
    let all_axes: &[Axis] = if g1.is_surface() {
        &[Axis::U, Axis::V]
    } else {
        &[Axis::U]
    };
    for &ax in all_axes {
        let target = g1.require_axis(ax)?.order.max(g2.require_axis(ax)?.order);
        while g1.require_axis(ax)?.order < target {
            g1 = degree_raise(&g1, ax)?;
        }
        while g2.require_axis(ax)?.order < target {
            g2 = degree_raise(&g2, ax)?;
        }
    }

    // Verschmelzungsrichtung geklemmt
    for g in [&mut g1, &mut g2] {
        if g.require_axis(axis)?.end != EndCondition::Open {
            *g = clamp_axis(g, axis)?;
        }
    }

    if g1.is_surface() {
        align_cross_axis(&mut g1, &mut g2, axis.other())?;
    }

    // Gemeinsamer Rand: letzte Reihe von g1 gegen erste Reihe von g2
    let rows1 = g1.rows(axis)?;
    let rows2 = g2.rows(axis)?;
    let gap = rows1
        .iter()
        .zip(rows2.iter())
        .filter_map(|(r1, r2)| Some((*r1.last()? - r2[0]).length()))
        .fold(0.0, f64::max);
    if rows1.len() != rows2.len() || gap > tolerance {
        return Err(EditError::precondition(format!(
            "Ränder stimmen nicht überein (Abstand {gap:.3e})"
        )));
    }

    // Knoten von g2 an das Domänenende von g1 schieben und verketten
    let s1 = g1.require_axis(axis)?.clone();
    let s2 = g2.require_axis(axis)?;
    let order = s1.order;
    let shift = g1.domain(axis).1 - g2.domain(axis).0;
    let mut knots = s1.knots[..s1.knots.len() - 1].to_vec();
    knots.extend(s2.knots[order..].iter().map(|k| k + shift));

    let merged_rows: Vec<Vec<DVec4>> = rows1
        .into_iter()
        .zip(rows2)
        .map(|(r1, r2)| {
            let mut row = r1[..r1.len() - 1].to_vec();
            row.push((r1[r1.len() - 1] + r2[0]) * 0.5);
            row.extend_from_slice(&r2[1..]);
            row
        })
        .collect();

    let mut merged = g1.with_rows(
        axis,
        merged_rows,
        SplineAxis {
            knots,
            end: EndCondition::Open,
            ..s1
        },
    )?;
    if let Some(trims) = merged.trims_mut() {
        trims.clear();
    }
    merged.validate()?;
    Ok(merged)
}

/// Bringt die Querrichtung beider Geometrien auf denselben Knotenvektor.
fn align_cross_axis(
    g1: &mut EditableGeometry,
    g2: &mut EditableGeometry,
    cross: Axis,
) -> Result<(), EditError> {
    let end1 = g1.require_axis(cross)?.end;
    let end2 = g2.require_axis(cross)?.end;
    if end1 != end2 {
        return Err(EditError::precondition(
            "Endbedingungen der Querrichtung unterscheiden sich",
        ));
    }

    for g in [&mut *g1, &mut *g2] {
        let (a, b) = g.domain(cross);
        if let Some(spline) = g.axis_mut(cross) {
            for k in &mut spline.knots {
                *k = (*k - a) / (b - a);
            }
        }
    }

    let k1 = g1.require_axis(cross)?.knots.clone();
    let k2 = g2.require_axis(cross)?.knots.clone();
    if k1.len() == k2.len() && k1.iter().zip(&k2).all(|(a, b)| (a - b).abs() <= 1e-9) {
        if let Some(spline) = g2.axis_mut(cross) {
            spline.knots = k1;
        }
        return Ok(());
    }

    // Vereinigung: fehlende Knoten (inkl. Vielfachheit) jeweils einfügen
    let missing = |own: &[f64], other: &[f64]| -> Vec<f64> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < other.len() {
            let k = other[i];
            let run = other[i..].iter().take_while(|&&x| (x - k).abs() <= 1e-9).count();
            let have = own.iter().filter(|&&x| (x - k).abs() <= 1e-9).count();
            out.extend(std::iter::repeat(k).take(run.saturating_sub(have)));
            i += run;
        }
        out
    };
    let add1 = missing(&k1, &k2);
    let add2 = missing(&k2, &k1);
    if !add1.is_empty() {
        *g1 = refine_srf(g1, &add1, cross)?;
    }
    if !add2.is_empty() {
        *g2 = refine_srf(g2, &add2, cross)?;
    }
    let unified = g1.require_axis(cross)?.knots.clone();
    if g2.require_axis(cross)?.knots.len() != unified.len() {
        return Err(EditError::precondition("Knotenvereinigung der Querrichtung fehlgeschlagen"));
    }
    if let Some(spline) = g2.axis_mut(cross) {
        spline.knots = unified;
    }
    Ok(())
}
