//! Bounded Nelder-Mead simplex minimization used for model estimation.

use std::cmp::Ordering;

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether a convergence criterion was met before `max_iter`.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadConfig {
    /// Iteration cap; reaching it without convergence is reported as
    /// `converged == false`.
    pub max_iter: usize,
    /// Absolute tolerance on the spread of objective values and on the
    /// simplex diameter.
    pub tolerance: f64,
    /// Relative tolerance on the spread of objective values.
    pub relative_tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Initial step, relative to the magnitude of each coordinate.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            relative_tolerance: 1e-10,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

impl NelderMeadConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Simplex vertices with their objective values, kept sorted best-first.
struct Simplex<'b> {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
    bounds: Option<&'b [(f64, f64)]>,
}

impl<'b> Simplex<'b> {
    fn around<F>(
        initial: &[f64],
        step: f64,
        bounds: Option<&'b [(f64, f64)]>,
        objective: &F,
    ) -> Self
    where
        F: Fn(&[f64]) -> f64,
    {
        let start = clamp_to(initial, bounds);
        let mut vertices = vec![start.clone()];
        for i in 0..initial.len() {
            let mut vertex = start.clone();
            let delta = if vertex[i].abs() > 1e-10 {
                step * vertex[i].abs()
            } else {
                step
            };
            vertex[i] += delta;
            let mut vertex = clamp_to(&vertex, bounds);
            // A coordinate pinned at its upper bound steps inward instead.
            if vertex[i] == start[i] {
                vertex[i] -= delta;
                vertex = clamp_to(&vertex, bounds);
            }
            vertices.push(vertex);
        }
        let values = vertices.iter().map(|v| safe_eval(objective, v)).collect();
        let mut simplex = Self {
            vertices,
            values,
            bounds,
        };
        simplex.sort();
        simplex
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| {
            self.values[a]
                .partial_cmp(&self.values[b])
                .unwrap_or(Ordering::Equal)
        });
        self.vertices = order.iter().map(|&i| self.vertices[i].clone()).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }

    fn worst(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Centroid of all vertices but the worst.
    fn centroid(&self) -> Vec<f64> {
        let dims = self.vertices[0].len();
        let count = self.worst() as f64;
        let mut centroid = vec![0.0; dims];
        for vertex in &self.vertices[..self.worst()] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= count);
        centroid
    }

    /// Point along the line from the centroid through the worst vertex.
    fn along(&self, centroid: &[f64], coefficient: f64) -> Vec<f64> {
        let worst = &self.vertices[self.worst()];
        let point: Vec<f64> = centroid
            .iter()
            .zip(worst)
            .map(|(c, w)| c + coefficient * (w - c))
            .collect();
        clamp_to(&point, self.bounds)
    }

    fn replace_worst(&mut self, vertex: Vec<f64>, value: f64) {
        let worst = self.worst();
        self.vertices[worst] = vertex;
        self.values[worst] = value;
    }

    fn shrink<F>(&mut self, sigma: f64, objective: &F)
    where
        F: Fn(&[f64]) -> f64,
    {
        let best = self.vertices[0].clone();
        for i in 1..self.vertices.len() {
            let shrunk: Vec<f64> = best
                .iter()
                .zip(&self.vertices[i])
                .map(|(b, v)| b + sigma * (v - b))
                .collect();
            self.vertices[i] = clamp_to(&shrunk, self.bounds);
            self.values[i] = safe_eval(objective, &self.vertices[i]);
        }
    }

    fn spread(&self) -> f64 {
        self.values[self.worst()] - self.values[0]
    }

    fn diameter(&self) -> f64 {
        let best = &self.vertices[0];
        self.vertices
            .iter()
            .map(|v| {
                v.iter()
                    .zip(best)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max)
    }
}

/// Minimize `objective` starting from `initial`.
///
/// Points are clamped into `bounds` (one `(min, max)` pair per coordinate)
/// whenever they are proposed. Non-finite objective values are treated as
/// `f64::MAX` so that divergent regions are simply avoided.
///
/// # Example
/// ```
/// use aurum_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::around(initial, config.initial_step, bounds, &objective);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        let spread = simplex.spread();
        let scale = simplex.values[0].abs();
        if spread < config.tolerance
            || spread <= config.relative_tolerance * scale
            || simplex.diameter() < config.tolerance
        {
            converged = true;
            break;
        }
        iterations += 1;

        let worst = simplex.worst();
        let centroid = simplex.centroid();

        let reflected = simplex.along(&centroid, -config.alpha);
        let reflected_value = safe_eval(&objective, &reflected);

        if reflected_value < simplex.values[0] {
            let expanded = simplex.along(&centroid, -config.alpha * config.gamma);
            let expanded_value = safe_eval(&objective, &expanded);
            if expanded_value < reflected_value {
                simplex.replace_worst(expanded, expanded_value);
            } else {
                simplex.replace_worst(reflected, reflected_value);
            }
        } else if reflected_value < simplex.values[worst - 1] {
            simplex.replace_worst(reflected, reflected_value);
        } else {
            let outside = reflected_value < simplex.values[worst];
            let coefficient = if outside {
                -config.alpha * config.rho
            } else {
                config.rho
            };
            let contracted = simplex.along(&centroid, coefficient);
            let contracted_value = safe_eval(&objective, &contracted);
            let threshold = if outside {
                reflected_value
            } else {
                simplex.values[worst]
            };
            if contracted_value <= threshold {
                simplex.replace_worst(contracted, contracted_value);
            } else {
                simplex.shrink(config.sigma, &objective);
            }
        }

        simplex.sort();
    }

    NelderMeadResult {
        optimal_point: simplex.vertices[0].clone(),
        optimal_value: simplex.values[0],
        iterations,
        converged,
    }
}

fn safe_eval<F>(objective: &F, point: &[f64]) -> f64
where
    F: Fn(&[f64]) -> f64,
{
    let value = objective(point);
    if value.is_finite() {
        value
    } else {
        f64::MAX
    }
}

fn clamp_to(point: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => point.to_vec(),
        Some(b) => point
            .iter()
            .enumerate()
            .map(|(i, &x)| match b.get(i) {
                Some(&(lo, hi)) => x.clamp(lo, hi),
                None => x,
            })
            .collect(),
    }
}
