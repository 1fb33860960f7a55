//! Derivative-free minimization used by the ARIMA fit.

/// Tuning knobs for the simplex search
#[derive(Debug, Clone)]
pub struct SimplexOptions {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Convergence tolerance on the objective spread
    pub tolerance: f64,
    /// Relative size of the initial simplex
    pub initial_step: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.05,
        }
    }
}

/// Result of a simplex minimization
#[derive(Debug, Clone)]
pub struct SimplexOutcome {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at the best point
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the spread converged below tolerance
    pub converged: bool,
}

// Standard Nelder-Mead coefficients
const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimize `objective` with the Nelder-Mead simplex method.
///
/// `bounds` gives per-dimension (min, max) clamps applied to every
/// candidate vertex.
pub fn minimize<F>(
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    options: SimplexOptions,
) -> SimplexOutcome
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return SimplexOutcome {
            point: vec![],
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    // Simplex of n + 1 vertices around the initial point
    let mut simplex = vec![clamp(initial.to_vec(), bounds)];
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            options.initial_step * initial[i].abs()
        } else {
            options.initial_step
        };
        vertex[i] += step;
        simplex.push(clamp(vertex, bounds));
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iter {
        iterations += 1;

        sort_simplex(&mut simplex, &mut values);

        if values[n] - values[0] < options.tolerance {
            converged = true;
            break;
        }

        // Centroid of all vertices but the worst
        let mut centroid = vec![0.0; n];
        for vertex in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        for c in &mut centroid {
            *c /= n as f64;
        }

        let reflected = clamp(step_from(&centroid, &simplex[n], -REFLECT), bounds);
        let reflected_value = objective(&reflected);

        if reflected_value < values[0] {
            // Best so far: try to go further
            let expanded = clamp(step_from(&centroid, &reflected, EXPAND), bounds);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        // Contract towards the better of worst and reflected
        let anchor = if reflected_value < values[n] {
            &reflected
        } else {
            &simplex[n]
        };
        let contracted = clamp(step_from(&centroid, anchor, CONTRACT), bounds);
        let contracted_value = objective(&contracted);

        if contracted_value < values[n].min(reflected_value) {
            simplex[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        // Shrink everything towards the best vertex
        let best = simplex[0].clone();
        for i in 1..=n {
            for j in 0..n {
                simplex[i][j] = best[j] + SHRINK * (simplex[i][j] - best[j]);
            }
            simplex[i] = clamp(std::mem::take(&mut simplex[i]), bounds);
            values[i] = objective(&simplex[i]);
        }
    }

    sort_simplex(&mut simplex, &mut values);

    SimplexOutcome {
        point: simplex.swap_remove(0),
        value: values[0],
        iterations,
        converged,
    }
}

/// Order vertices from best to worst objective value
fn sort_simplex(simplex: &mut [Vec<f64>], values: &mut [f64]) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let sorted_simplex: Vec<Vec<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
    let sorted_values: Vec<f64> = order.iter().map(|&i| values[i]).collect();

    for (slot, vertex) in simplex.iter_mut().zip(sorted_simplex) {
        *slot = vertex;
    }
    values.copy_from_slice(&sorted_values);
}

/// Point at centroid + coefficient * (target - centroid)
fn step_from(centroid: &[f64], target: &[f64], coefficient: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(target)
        .map(|(c, t)| c + coefficient * (t - c))
        .collect()
}

/// Clamp each coordinate into its bounds
fn clamp(mut point: Vec<f64>, bounds: &[(f64, f64)]) -> Vec<f64> {
    for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
        *x = x.clamp(lo, hi);
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FREE: (f64, f64) = (f64::NEG_INFINITY, f64::INFINITY);

    #[test]
    fn minimizes_quadratic() {
        let outcome = minimize(
            |x| (x[0] - 2.0).powi(2) + (x[1] + 3.0).powi(2),
            &[0.0, 0.0],
            &[FREE, FREE],
            SimplexOptions::default(),
        );

        assert!(outcome.converged);
        assert_relative_eq!(outcome.point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(outcome.point[1], -3.0, epsilon = 1e-3);
    }

    #[test]
    fn respects_bounds() {
        let outcome = minimize(
            |x| (x[0] - 2.0).powi(2),
            &[0.0],
            &[(-1.0, 0.5)],
            SimplexOptions::default(),
        );

        assert!(outcome.point[0] <= 0.5);
        assert_relative_eq!(outcome.point[0], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn empty_input_is_rejected() {
        let outcome = minimize(|_| 0.0, &[], &[], SimplexOptions::default());

        assert!(!outcome.converged);
        assert!(outcome.value.is_nan());
    }

    #[test]
    fn flat_objective_converges() {
        let outcome = minimize(|_| 1.0, &[0.3, 0.7], &[FREE, FREE], SimplexOptions::default());

        assert!(outcome.converged);
        assert_eq!(outcome.value, 1.0);
    }
}
