//! Reine B-Spline-Basisfunktionen auf homogenen Kontrollpunkten.
//!
//! Layer-neutral: wird von `core::refine`, `core::multires` und `core::pick`
//! gemeinsam genutzt. Kontrollpunkte liegen homogen vor (x·w, y·w, z·w, w),
//! alle Funktionen arbeiten auf einer einzelnen Kontrollpunkt-Reihe.

use glam::DVec4;

/// Zwei Knoten gelten innerhalb dieser Toleranz als identisch.
pub const KNOT_EPSILON: f64 = 1e-12;

/// Sucht den Knotenspann `k` mit `knots[k] <= t < knots[k + 1]`.
///
/// Das Ergebnis ist auf `[order - 1, count - 1]` geklemmt, damit auch Werte
/// auf (oder knapp außerhalb) der Domänengrenzen einen gültigen Spann liefern.
pub fn find_span(knots: &[f64], order: usize, count: usize, t: f64) -> usize {
    let low = order - 1;
    let high = count - 1;
    let mut span = low;
    for (k, &knot) in knots.iter().enumerate().take(high + 1).skip(low) {
        if knot <= t {
            span = k;
        } else {
            break;
        }
    }
    span
}

/// Berechnet die `order` nicht verschwindenden Basisfunktionen im Spann `span`.
///
/// `values[i]` gehört zur Basisfunktion `N_{span - order + 1 + i}` (Cox–de Boor).
pub fn basis_functions(knots: &[f64], order: usize, span: usize, t: f64) -> Vec<f64> {
    let degree = order - 1;
    let mut values = vec![0.0; order];
    let mut left = vec![0.0; order];
    let mut right = vec![0.0; order];
    values[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() < KNOT_EPSILON {
                0.0
            } else {
                values[r] / denom
            };
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }

    values
}

/// Liefert alle `count` Basisfunktionswerte an der Stelle `t` (dünn besetzt).
pub fn basis_row(knots: &[f64], order: usize, count: usize, t: f64) -> Vec<f64> {
    let span = find_span(knots, order, count, t);
    let local = basis_functions(knots, order, span, t);
    let mut row = vec![0.0; count];
    let first = span + 1 - order;
    for (i, value) in local.into_iter().enumerate() {
        row[first + i] = value;
    }
    row
}

/// Wertet eine Kontrollpunkt-Reihe homogen an der Stelle `t` aus.
pub fn eval_row(points: &[DVec4], knots: &[f64], order: usize, t: f64) -> DVec4 {
    let span = find_span(knots, order, points.len(), t);
    let basis = basis_functions(knots, order, span, t);
    let first = span + 1 - order;
    basis
        .iter()
        .enumerate()
        .fold(DVec4::ZERO, |acc, (i, &b)| acc + points[first + i] * b)
}

/// Anzahl der Knoten, die innerhalb von [`KNOT_EPSILON`] gleich `t` sind.
pub fn multiplicity(knots: &[f64], t: f64) -> usize {
    knots
        .iter()
        .filter(|&&k| (k - t).abs() <= KNOT_EPSILON)
        .count()
}

/// Fügt den Knoten `t` genau einmal ein (Boehm). Die Form bleibt exakt erhalten.
pub fn insert_knot(points: &[DVec4], knots: &[f64], order: usize, t: f64) -> (Vec<DVec4>, Vec<f64>) {
    let count = points.len();
    let degree = order - 1;
    let span = find_span(knots, order, count, t);

    let mut new_points = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let point = if i + degree <= span {
            points[i]
        } else if i > span {
            points[i - 1]
        } else {
            let denom = knots[i + degree] - knots[i];
            let alpha = if denom.abs() < KNOT_EPSILON {
                0.0
            } else {
                (t - knots[i]) / denom
            };
            points[i - 1] * (1.0 - alpha) + points[i] * alpha
        };
        new_points.push(point);
    }

    let mut new_knots = Vec::with_capacity(knots.len() + 1);
    new_knots.extend_from_slice(&knots[..=span]);
    new_knots.push(t);
    new_knots.extend_from_slice(&knots[span + 1..]);

    (new_points, new_knots)
}

/// Greville-Abszissen: Knotenmittel, an denen jede Basisfunktion ihr „Zentrum“ hat.
pub fn greville(knots: &[f64], order: usize, count: usize) -> Vec<f64> {
    let degree = order - 1;
    (0..count)
        .map(|i| {
            if degree == 0 {
                0.5 * (knots[i] + knots[i + 1])
            } else {
                knots[i + 1..=i + degree].iter().sum::<f64>() / degree as f64
            }
        })
        .collect()
}

/// Bestimmt Kontrollpunkte, deren Spline an den Stellen `taus` die Werte `values` annimmt.
///
/// Gauß-Elimination mit Spaltenpivotisierung auf der Kollokationsmatrix.
/// Gibt `None` zurück, wenn die Matrix (numerisch) singulär ist.
pub fn interpolate_row(
    knots: &[f64],
    order: usize,
    taus: &[f64],
    values: &[DVec4],
) -> Option<Vec<DVec4>> {
    let n = taus.len();
    if n == 0 || values.len() != n || knots.len() != n + order {
        return None;
    }

    let mut matrix: Vec<Vec<f64>> = taus
        .iter()
        .map(|&t| basis_row(knots, order, n, t))
        .collect();
    let mut rhs = values.to_vec();

    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))?;
        if matrix[pivot][col].abs() < 1e-14 {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        let pivot_row = matrix[col].clone();
        let pivot_rhs = rhs[col];
        for row in col + 1..n {
            let factor = matrix[row][col] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            for (k, value) in matrix[row].iter_mut().enumerate().skip(col) {
                *value -= factor * pivot_row[k];
            }
            rhs[row] -= pivot_rhs * factor;
        }
    }

    let mut solution = vec![DVec4::ZERO; n];
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in row + 1..n {
            acc -= solution[k] * matrix[row][k];
        }
        solution[row] = acc / matrix[row][row];
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn open_knots() -> Vec<f64> {
        vec![0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0]
    }

    fn row() -> Vec<DVec4> {
        vec![
            DVec4::new(0.0, 0.0, 0.0, 1.0),
            DVec4::new(1.0, 2.0, 0.0, 1.0),
            DVec4::new(2.0, -1.0, 0.5, 1.0),
            DVec4::new(3.0, 1.0, 0.0, 1.0),
            DVec4::new(4.0, 0.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn test_basis_is_partition_of_unity() {
        let knots = open_knots();
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let sum: f64 = basis_row(&knots, 4, 5, t).iter().sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_find_span_clamps_domain_end() {
        let knots = open_knots();
        assert_eq!(find_span(&knots, 4, 5, 1.0), 4);
        assert_eq!(find_span(&knots, 4, 5, 0.0), 3);
        assert_eq!(find_span(&knots, 4, 5, 0.5), 4);
        assert_eq!(find_span(&knots, 4, 5, -3.0), 3);
    }

    #[test]
    fn test_open_curve_interpolates_end_points() {
        let knots = open_knots();
        let points = row();
        let start = eval_row(&points, &knots, 4, 0.0);
        let end = eval_row(&points, &knots, 4, 1.0);
        assert_abs_diff_eq!(start.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(end.x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(end.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_insert_knot_preserves_shape() {
        let knots = open_knots();
        let points = row();
        let (new_points, new_knots) = insert_knot(&points, &knots, 4, 0.3);
        assert_eq!(new_points.len(), 6);
        assert_eq!(new_knots.len(), 10);
        assert!(new_knots.windows(2).all(|w| w[0] <= w[1]));
        for i in 0..=50 {
            let t = i as f64 / 50.0;
            let before = eval_row(&points, &knots, 4, t);
            let after = eval_row(&new_points, &new_knots, 4, t);
            assert!((before - after).length() < 1e-12, "Abweichung bei t={t}");
        }
    }

    #[test]
    fn test_insert_existing_knot_raises_multiplicity() {
        let knots = open_knots();
        let (_, new_knots) = insert_knot(&row(), &knots, 4, 0.5);
        assert_eq!(multiplicity(&new_knots, 0.5), 2);
    }

    #[test]
    fn test_interpolate_row_reproduces_spline() {
        let knots = open_knots();
        let points = row();
        let taus = greville(&knots, 4, 5);
        let values: Vec<DVec4> = taus.iter().map(|&t| eval_row(&points, &knots, 4, t)).collect();
        let solved = interpolate_row(&knots, 4, &taus, &values).expect("Kollokation lösbar");
        for (a, b) in solved.iter().zip(points.iter()) {
            assert!((*a - *b).length() < 1e-10);
        }
    }
}
