//! MultiResolutionController: verschachtelte Knotenzerlegung und lokale Verschiebung.
//!
//! Pro Richtung wird eine Folge grob → fein von Knotenvektoren gehalten. Jede
//! gröbere Stufe behält jeden zweiten inneren Knoten der feineren. Ein
//! Schiebereglerwert in [0, 1] wählt (stetig interpoliert) die Stufe, auf der
//! eine Verschiebung verteilt wird: kleine Werte wirken breit, große lokal.

use super::error::EditError;
use super::geometry::{dehomogenize, EditableGeometry, SplineAxis};
use super::params::{Axis, EndCondition};
use crate::shared::spline_basis::{basis_row, insert_knot, multiplicity, KNOT_EPSILON};
use glam::{DVec3, DVec4};

/// Strukturmerkmale eines Knotenvektors; ändern sie sich, ist die Zerlegung veraltet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KnotSignature {
    order: usize,
    knot_count: usize,
    periodic: bool,
}

/// Zerlegung einer Richtung: behaltene innere Knotenindizes je Stufe (grob → fein).
#[derive(Debug, Clone, PartialEq)]
pub struct AxisDecomposition {
    levels: Vec<Vec<usize>>,
    signature: KnotSignature,
}

impl AxisDecomposition {
    fn build(spline: &SplineAxis, count: usize, discontinuity: bool, periodic: bool) -> Self {
        let order = spline.order;
        let fine: Vec<usize> = (order..count).collect();
        let pinned = |i: usize| {
            discontinuity && multiplicity(&spline.knots, spline.knots[i]) >= (order - 1).max(2)
        };

        let mut levels = vec![fine];
        loop {
            let current = &levels[levels.len() - 1];
            if current.is_empty() {
                break;
            }
            let coarser: Vec<usize> = current
                .iter()
                .enumerate()
                .filter(|&(pos, &i)| pos % 2 == 1 || pinned(i))
                .map(|(_, &i)| i)
                .collect();
            if coarser.len() == current.len() {
                break;
            }
            levels.push(coarser);
        }
        levels.reverse();

        Self {
            levels,
            signature: KnotSignature {
                order,
                knot_count: spline.knots.len(),
                periodic,
            },
        }
    }

    /// Anzahl der Stufen (mindestens 1).
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Gewichte aller Kontrollpunkte der Richtung für eine Einheitsverschiebung bei `t`.
    fn weights(&self, spline: &SplineAxis, count: usize, level: f64, t: f64) -> Vec<f64> {
        let top = (self.levels.len() - 1) as f64;
        let x = level.clamp(0.0, 1.0) * top;
        let lo = x.floor();
        let frac = x - lo;
        let lo_weights = self.level_weights(spline, count, lo as usize, t);
        if frac <= f64::EPSILON {
            return lo_weights;
        }
        let hi_weights = self.level_weights(spline, count, lo as usize + 1, t);
        lo_weights
            .iter()
            .zip(&hi_weights)
            .map(|(a, b)| a + (b - a) * frac)
            .collect()
    }

    /// Koeffizienten δ_j = N_j(t) / Σ N² auf Stufe `level`, auf die feine Stufe gehoben.
    fn level_weights(&self, spline: &SplineAxis, count: usize, level: usize, t: f64) -> Vec<f64> {
        let order = spline.order;
        let kept = &self.levels[level];
        let mut coarse_knots: Vec<f64> = spline.knots[..order].to_vec();
        coarse_knots.extend(kept.iter().map(|&i| spline.knots[i]));
        coarse_knots.extend_from_slice(&spline.knots[count..]);
        let coarse_count = coarse_knots.len() - order;

        let basis = basis_row(&coarse_knots, order, coarse_count, t);
        let norm: f64 = basis.iter().map(|b| b * b).sum();
        if norm < KNOT_EPSILON {
            return vec![0.0; count];
        }
        let mut coeffs: Vec<DVec4> = basis
            .iter()
            .map(|b| DVec4::new(b / norm, 0.0, 0.0, 0.0))
            .collect();

        let mut knots = coarse_knots;
        for i in order..count {
            if kept.binary_search(&i).is_err() {
                let (c, k) = insert_knot(&coeffs, &knots, order, spline.knots[i]);
                coeffs = c;
                knots = k;
            }
        }
        coeffs.into_iter().map(|c| c.x).collect()
    }
}

/// Schiebereglerwerte und zwischengespeicherte Zerlegungen beider Richtungen.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiResLevels {
    pub u_level: f64,
    pub v_level: f64,
    discontinuity: bool,
    u: Option<AxisDecomposition>,
    v: Option<AxisDecomposition>,
}

impl Default for MultiResLevels {
    fn default() -> Self {
        Self {
            u_level: 1.0,
            v_level: 1.0,
            discontinuity: true,
            u: None,
            v: None,
        }
    }
}

impl MultiResLevels {
    /// Setzt einen Schiebereglerwert (auf [0, 1] geklemmt).
    pub fn set_level(&mut self, axis: Axis, level: f64) {
        let level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 1.0 };
        match axis {
            Axis::U => self.u_level = level,
            Axis::V => self.v_level = level,
        }
    }

    pub fn level(&self, axis: Axis) -> f64 {
        match axis {
            Axis::U => self.u_level,
            Axis::V => self.v_level,
        }
    }

    pub fn decomposition(&self, axis: Axis) -> Option<&AxisDecomposition> {
        match axis {
            Axis::U => self.u.as_ref(),
            Axis::V => self.v.as_ref(),
        }
    }

    /// Passt die Zerlegung noch zur Struktur der Geometrie?
    pub fn is_stale(&self, geom: &EditableGeometry) -> bool {
        [Axis::U, Axis::V].into_iter().any(|axis| {
            let current = geom.axis(axis).map(|spline| KnotSignature {
                order: spline.order,
                knot_count: spline.knots.len(),
                periodic: spline.end == EndCondition::Periodic,
            });
            current != self.decomposition(axis).map(|d| d.signature)
        })
    }

    /// Berechnet die Zerlegung nur neu, wenn sie veraltet ist. Schiebereglerwerte bleiben.
    pub fn ensure(&mut self, geom: &EditableGeometry) {
        if !self.is_stale(geom) {
            return;
        }
        let periodic = |axis| {
            geom.axis(axis)
                .is_some_and(|s| s.end == EndCondition::Periodic)
        };
        let fresh = prep_kvs(geom, self.discontinuity, periodic(Axis::U), periodic(Axis::V));
        self.u = fresh.u;
        self.v = fresh.v;
        log::debug!("Multiresolution-Zerlegung neu berechnet");
    }
}

/// Berechnet die verschachtelte Knotenzerlegung beider Richtungen.
///
/// `discontinuity` hält Knoten mit Vielfachheit ≥ Ordnung − 1 (mindestens 2) auf allen Stufen fest.
pub fn prep_kvs(
    geom: &EditableGeometry,
    discontinuity: bool,
    u_periodic: bool,
    v_periodic: bool,
) -> MultiResLevels {
    let build = |axis: Axis, periodic: bool| {
        geom.axis(axis)
            .map(|spline| AxisDecomposition::build(spline, geom.len(axis), discontinuity, periodic))
    };
    MultiResLevels {
        discontinuity,
        u: build(Axis::U, u_periodic),
        v: build(Axis::V, v_periodic),
        ..MultiResLevels::default()
    }
}

/// Verschiebt die bei (u, v) aktiven Kontrollpunkte um `translation`.
///
/// Der Flächenpunkt S(u, v) selbst bewegt sich bei nicht-rationaler Geometrie
/// genau um `translation`. Gibt neue Geometrie zurück.
#[allow(clippy::too_many_arguments)]
pub fn modify(
    geom: &EditableGeometry,
    levels: &MultiResLevels,
    u_level: f64,
    v_level: f64,
    u_param: f64,
    v_param: f64,
    translation: DVec3,
) -> Result<EditableGeometry, EditError> {
    if levels.is_stale(geom) {
        return Err(EditError::precondition(
            "Multiresolution-Zerlegung passt nicht zur Geometrie",
        ));
    }

    let axis_weights = |axis: Axis, level: f64, t: f64| -> Vec<f64> {
        match (geom.axis(axis), levels.decomposition(axis)) {
            (Some(spline), Some(decomp)) => {
                let count = geom.len(axis);
                let (a, b) = spline.domain(count);
                let mut weights = decomp.weights(spline, count, level, t.clamp(a, b));
                if decomp.signature.periodic {
                    fold_periodic(&mut weights, spline.order);
                }
                weights
            }
            _ => vec![1.0],
        }
    };
    let wu = axis_weights(Axis::U, u_level, u_param);
    let wv = axis_weights(Axis::V, v_level, v_param);

    let mut result = geom.try_clone()?;
    let u_len = wu.len();
    for (index, point) in result.points_mut().iter_mut().enumerate() {
        let weight = wu[index % u_len] * wv[index / u_len];
        if weight == 0.0 {
            continue;
        }
        let moved = dehomogenize(*point) + translation * weight;
        *point = (moved * point.w).extend(point.w);
    }
    Ok(result)
}

/// Periodische Zwillinge erhalten die Summe ihrer Gewichte.
fn fold_periodic(weights: &mut [f64], order: usize) {
    let wrap = order - 1;
    let base = weights.len() - wrap;
    for i in 0..wrap {
        let sum = weights[i] + weights[i + base];
        weights[i] = sum;
        weights[i + base] = sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::ParameterSet;
    use crate::core::refine::refine_uniform;

    fn fine_surface(params: &ParameterSet) -> EditableGeometry {
        let grid = (0..10)
            .map(|j| (0..12).map(|i| DVec3::new(i as f64, j as f64, 0.0)).collect())
            .collect();
        EditableGeometry::from_grid(params, grid).expect("Fläche gültig")
    }

    fn moved_count(before: &EditableGeometry, after: &EditableGeometry) -> usize {
        before
            .points()
            .iter()
            .zip(after.points())
            .filter(|(a, b)| (**a - **b).length() > 1e-12)
            .count()
    }

    #[test]
    fn test_levels_are_nested_coarse_to_fine() {
        let geom = fine_surface(&ParameterSet::default());
        let levels = prep_kvs(&geom, true, false, false);
        let decomp = levels.decomposition(Axis::U).expect("U-Zerlegung");
        assert!(decomp.level_count() >= 3);
        for pair in decomp.levels.windows(2) {
            assert!(pair[0].iter().all(|i| pair[1].contains(i)));
            assert!(pair[0].len() < pair[1].len());
        }
        assert!(decomp.levels[0].is_empty());
    }

    #[test]
    fn test_drag_point_moves_by_translation() {
        let geom = fine_surface(&ParameterSet::default());
        let levels = prep_kvs(&geom, true, false, false);
        let delta = DVec3::new(0.0, 0.0, 1.5);
        for level in [0.0, 0.37, 1.0] {
            let moved = modify(&geom, &levels, level, level, 0.4, 0.6, delta).expect("Modify");
            let shift = moved.evaluate(0.4, 0.6) - geom.evaluate(0.4, 0.6);
            assert!((shift - delta).length() < 1e-9, "Stufe {level}: {shift:?}");
        }
    }

    #[test]
    fn test_low_level_affects_broader_region() {
        let geom = fine_surface(&ParameterSet::default());
        let levels = prep_kvs(&geom, true, false, false);
        let delta = DVec3::Z;
        let broad = modify(&geom, &levels, 0.0, 0.0, 0.5, 0.5, delta).expect("grob");
        let narrow = modify(&geom, &levels, 1.0, 1.0, 0.5, 0.5, delta).expect("fein");
        assert!(moved_count(&geom, &broad) > moved_count(&geom, &narrow));
    }

    #[test]
    fn test_level_changes_are_continuous() {
        let geom = fine_surface(&ParameterSet::default());
        let levels = prep_kvs(&geom, true, false, false);
        let delta = DVec3::Z;
        let mut previous = modify(&geom, &levels, 0.0, 0.5, 0.3, 0.3, delta).expect("Start");
        for step in 1..=100 {
            let level = step as f64 / 100.0;
            let current = modify(&geom, &levels, level, 0.5, 0.3, 0.3, delta).expect("Schritt");
            let jump = previous
                .points()
                .iter()
                .zip(current.points())
                .map(|(a, b)| (*a - *b).length())
                .fold(0.0, f64::max);
            assert!(jump < 0.25, "Sprung {jump} bei Stufe {level}");
            previous = current;
        }
    }

    #[test]
    fn test_refinement_makes_decomposition_stale() {
        let geom = fine_surface(&ParameterSet::default());
        let mut levels = prep_kvs(&geom, true, false, false);
        assert!(!levels.is_stale(&geom));
        let refined = refine_uniform(&geom, Axis::U).expect("Verfeinerung");
        assert!(levels.is_stale(&refined));
        assert!(modify(&refined, &levels, 0.5, 0.5, 0.5, 0.5, DVec3::Z).is_err());
        levels.ensure(&refined);
        assert!(!levels.is_stale(&refined));
    }

    #[test]
    fn test_periodic_twins_move_together() {
        let params = ParameterSet {
            u_order: 3,
            u_end: EndCondition::Periodic,
            ..ParameterSet::default()
        };
        let geom = fine_surface(&params);
        let levels = prep_kvs(&geom, true, true, false);
        let (a, _) = geom.domain(Axis::U);
        let moved = modify(&geom, &levels, 1.0, 1.0, a, 0.5, DVec3::Z).expect("Modify");
        let u_len = moved.len(Axis::U);
        for v in 0..moved.len(Axis::V) {
            for i in 0..2 {
                let first = moved.points()[v * u_len + i];
                let twin = moved.points()[v * u_len + i + u_len - 2];
                assert!((first - twin).length() < 1e-12);
            }
        }
    }

    #[test]
    fn test_pinned_knots_survive_all_levels() {
        let geom = fine_surface(&ParameterSet::default());
        let seamed = crate::core::refine::refine_srf(&geom, &[0.5, 0.5, 0.5], Axis::U)
            .expect("Naht");
        let levels = prep_kvs(&seamed, true, false, false);
        let decomp = levels.decomposition(Axis::U).expect("U-Zerlegung");
        let spline = seamed.axis(Axis::U).expect("U");
        for level in &decomp.levels {
            let pinned = level
                .iter()
                .filter(|&&i| (spline.knots[i] - 0.5).abs() < 1e-12)
                .count();
            assert_eq!(pinned, 3);
        }
    }

    #[test]
    fn test_set_level_clamps() {
        let mut levels = MultiResLevels::default();
        levels.set_level(Axis::U, 1.7);
        levels.set_level(Axis::V, -0.2);
        assert_eq!(levels.level(Axis::U), 1.0);
        assert_eq!(levels.level(Axis::V), 0.0);
    }
}
