//! Derivative-free optimization used for ARIMA/SARIMA parameter estimation.

/// Result of a Nelder-Mead minimization.
#[derive(Debug, Clone)]
pub struct MinimizeResult {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at the best point.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the simplex converged within tolerance.
    pub converged: bool,
}

/// Configuration for the Nelder-Mead simplex search.
#[derive(Debug, Clone)]
pub struct MinimizeConfig {
    /// Maximum iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the simplex value spread.
    pub tolerance: f64,
    /// Initial simplex step size relative to each coordinate.
    pub initial_step: f64,
}

impl Default for MinimizeConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.05,
        }
    }
}

// Standard Nelder-Mead coefficients.
const ALPHA: f64 = 1.0; // reflection
const GAMMA: f64 = 2.0; // expansion
const RHO: f64 = 0.5; // contraction
const SIGMA: f64 = 0.5; // shrink

/// Minimize `objective` with the Nelder-Mead simplex method.
///
/// `bounds` clamps every candidate point coordinate-wise when provided; ARIMA
/// uses this to keep AR/MA coefficients inside the stationarity box.
pub fn minimize<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &MinimizeConfig,
) -> MinimizeResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return MinimizeResult {
            point: vec![],
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: Vec<f64>| -> Vec<f64> {
        match bounds {
            None => point,
            Some(b) => point
                .into_iter()
                .enumerate()
                .map(|(i, x)| if i < b.len() { x.clamp(b[i].0, b[i].1) } else { x })
                .collect(),
        }
    };

    // Simplex of n+1 vertices around the initial point.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        simplex.push(clamp(vertex));
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        if values[worst] - values[best] < config.tolerance {
            converged = true;
            break;
        }

        // Centroid of all vertices except the worst.
        let mut centroid = vec![0.0; n];
        for (i, vertex) in simplex.iter().enumerate() {
            if i != worst {
                for (c, &x) in centroid.iter_mut().zip(vertex.iter()) {
                    *c += x;
                }
            }
        }
        for c in &mut centroid {
            *c /= n as f64;
        }

        let along = |from: &[f64], to: &[f64], coef: f64| -> Vec<f64> {
            from.iter()
                .zip(to.iter())
                .map(|(f, t)| f + coef * (t - f))
                .collect()
        };

        // Reflection.
        let reflected = clamp(
            centroid
                .iter()
                .zip(simplex[worst].iter())
                .map(|(c, w)| c + ALPHA * (c - w))
                .collect(),
        );
        let reflected_value = objective(&reflected);

        if reflected_value < values[second_worst] && reflected_value >= values[best] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        if reflected_value < values[best] {
            // Expansion.
            let expanded = clamp(along(&centroid, &reflected, GAMMA));
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        // Contraction: outside towards the reflected point, inside towards the
        // worst vertex.
        let (target, target_value) = if reflected_value < values[worst] {
            (reflected.clone(), reflected_value)
        } else {
            (simplex[worst].clone(), values[worst])
        };
        let contracted = clamp(along(&centroid, &target, RHO));
        let contracted_value = objective(&contracted);
        if contracted_value <= target_value {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        // Shrink towards the best vertex.
        let best_vertex = simplex[best].clone();
        for i in 0..=n {
            if i != best {
                simplex[i] = clamp(along(&best_vertex, &simplex[i], SIGMA));
                values[i] = objective(&simplex[i]);
            }
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    MinimizeResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn minimize_quadratic_2d() {
        let result = minimize(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            &MinimizeConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.point[0], 2.0, epsilon = 1e-4);
        assert_relative_eq!(result.point[1], 3.0, epsilon = 1e-4);
        assert_relative_eq!(result.value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn minimize_respects_bounds() {
        // Unconstrained minimum at x = 5 is outside the box.
        let result = minimize(
            |x| (x[0] - 5.0).powi(2),
            &[1.0],
            Some(&[(0.0, 3.0)]),
            &MinimizeConfig::default(),
        );

        assert_relative_eq!(result.point[0], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn minimize_rosenbrock() {
        let config = MinimizeConfig {
            max_iter: 5000,
            tolerance: 1e-10,
            ..Default::default()
        };
        let result = minimize(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2),
            &[0.0, 0.0],
            None,
            &config,
        );

        assert_relative_eq!(result.point[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.point[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn minimize_empty_initial() {
        let result = minimize(|_| 0.0, &[], None, &MinimizeConfig::default());
        assert!(!result.converged);
        assert!(result.value.is_nan());
    }

    #[test]
    fn minimize_already_optimal() {
        let result = minimize(
            |x| (x[0] - 2.0).powi(2),
            &[2.0],
            None,
            &MinimizeConfig::default(),
        );
        assert!(result.converged);
        assert_relative_eq!(result.point[0], 2.0, epsilon = 1e-4);
    }
}
