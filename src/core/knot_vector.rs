//! Knotenvektoren: Erzeugung je Endbedingung/Parametrisierung und Wohlgeformtheit.

use super::params::{EndCondition, ParamType};
use crate::shared::spline_basis::KNOT_EPSILON;
use glam::DVec4;

/// Prüft Länge (= Ordnung + Punktanzahl), Monotonie und maximale Vielfachheit.
pub fn is_well_formed(knots: &[f64], order: usize, count: usize) -> bool {
    if order == 0 || count < order || knots.len() != order + count {
        return false;
    }
    if knots.iter().any(|k| !k.is_finite()) || knots.windows(2).any(|w| w[0] > w[1]) {
        return false;
    }
    max_multiplicity(knots) <= order
}

/// Größte Vielfachheit eines Knotenwerts.
pub fn max_multiplicity(knots: &[f64]) -> usize {
    let mut best = 0;
    let mut run = 0;
    for (i, &k) in knots.iter().enumerate() {
        if i > 0 && (k - knots[i - 1]).abs() <= KNOT_EPSILON {
            run += 1;
        } else {
            run = 1;
        }
        best = best.max(run);
    }
    best
}

/// Gültiger Parameterbereich `[knots[order-1], knots[count]]`.
pub fn domain(knots: &[f64], order: usize, count: usize) -> (f64, f64) {
    (knots[order - 1], knots[count])
}

/// Sind Anfang und Ende mit voller Vielfachheit geklemmt?
pub fn is_clamped(knots: &[f64], order: usize) -> bool {
    let len = knots.len();
    if len < 2 * order {
        return false;
    }
    let first = knots[0];
    let last = knots[len - 1];
    knots[..order].iter().all(|k| (k - first).abs() <= KNOT_EPSILON)
        && knots[len - order..].iter().all(|k| (k - last).abs() <= KNOT_EPSILON)
}

/// Innere Knoten (ohne die je `order` Randknoten).
pub fn interior(knots: &[f64], order: usize) -> &[f64] {
    if knots.len() <= 2 * order {
        return &[];
    }
    &knots[order..knots.len() - order]
}

/// Mittelpunkte aller nicht leeren Knotenspannen innerhalb der Domäne.
pub fn span_midpoints(knots: &[f64], order: usize, count: usize) -> Vec<f64> {
    (order - 1..count)
        .filter(|&k| knots[k + 1] - knots[k] > KNOT_EPSILON)
        .map(|k| 0.5 * (knots[k] + knots[k + 1]))
        .collect()
}

/// Offener, gleichmäßiger Knotenvektor auf [0, 1].
pub fn open_uniform(order: usize, count: usize) -> Vec<f64> {
    let segments = (count + 1 - order) as f64;
    let mut knots = Vec::with_capacity(order + count);
    knots.extend(std::iter::repeat(0.0).take(order));
    knots.extend((1..=count - order).map(|j| j as f64 / segments));
    knots.extend(std::iter::repeat(1.0).take(order));
    knots
}

/// Gleichmäßiger Knotenvektor ohne Randvielfachheit (Float/Periodic).
pub fn float_uniform(order: usize, count: usize) -> Vec<f64> {
    let len = order + count;
    let last = (len - 1) as f64;
    (0..len).map(|i| i as f64 / last).collect()
}

/// Normierte Parameterwerte der Kontrollpolygone (gemittelt über alle Reihen).
///
/// `exponent` 0 = gleichmäßig, ½ = zentripetal, 1 = Sehnenlänge.
pub fn polygon_parameters(rows: &[Vec<DVec4>], exponent: f64) -> Vec<f64> {
    let count = rows.first().map_or(0, Vec::len);
    if count < 2 {
        return vec![0.0; count];
    }
    let uniform = || (0..count).map(|i| i as f64 / (count - 1) as f64).collect();
    if exponent == 0.0 {
        return uniform();
    }

    let mut segments = vec![0.0; count - 1];
    for row in rows {
        for (i, pair) in row.windows(2).enumerate() {
            let a = pair[0].truncate() / pair[0].w;
            let b = pair[1].truncate() / pair[1].w;
            segments[i] += a.distance(b).powf(exponent);
        }
    }

    let total: f64 = segments.iter().sum();
    if total < KNOT_EPSILON || !total.is_finite() {
        return uniform();
    }

    let mut params = Vec::with_capacity(count);
    let mut acc = 0.0;
    params.push(0.0);
    for seg in &segments {
        acc += seg;
        params.push(acc / total);
    }
    if let Some(last) = params.last_mut() {
        *last = 1.0;
    }
    params
}

/// Erzeugt einen Knotenvektor passend zu Endbedingung und Parametrisierung.
///
/// Float und Periodic sind immer gleichmäßig; die Parametrisierung wirkt
/// nur bei offenen Knotenvektoren (Mittelung der Polygon-Parameter).
pub fn generate(
    order: usize,
    count: usize,
    end: EndCondition,
    param: ParamType,
    rows: &[Vec<DVec4>],
) -> Vec<f64> {
    match end {
        EndCondition::Float | EndCondition::Periodic => float_uniform(order, count),
        EndCondition::Open => {
            let degree = order - 1;
            if param == ParamType::Uniform || degree == 0 {
                return open_uniform(order, count);
            }
            let params = polygon_parameters(rows, param.exponent());
            let mut knots = Vec::with_capacity(order + count);
            knots.extend(std::iter::repeat(0.0).take(order));
            for j in 1..=count - order {
                let avg = params[j..j + degree].iter().sum::<f64>() / degree as f64;
                knots.push(avg);
            }
            knots.extend(std::iter::repeat(1.0).take(order));
            knots
        }
    }
}
