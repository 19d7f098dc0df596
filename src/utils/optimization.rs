//! Bounded Nelder-Mead simplex minimization used for smoothing-parameter fits.

use std::cmp::Ordering;

/// Outcome of a simplex search.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the simplex collapsed below the tolerance before `max_iter`.
    pub converged: bool,
}

/// Tuning knobs for the simplex search.
#[derive(Debug, Clone)]
pub struct SimplexConfig {
    pub max_iter: usize,
    /// Stop when the spread of objective values (or of vertices) drops below this.
    pub tolerance: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
    /// Relative offset of the initial vertices from the starting point.
    pub initial_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Minimize `objective` starting at `start`, keeping every coordinate inside `bounds`.
///
/// Non-finite objective values are treated as `+inf` so they never win a comparison.
/// The search is fully deterministic.
pub fn minimize<F>(objective: F, start: &[f64], bounds: &[(f64, f64)], config: &SimplexConfig) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    if dim == 0 {
        return Minimum {
            point: Vec::new(),
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |p: Vec<f64>| -> Vec<f64> {
        p.into_iter()
            .enumerate()
            .map(|(i, x)| match bounds.get(i) {
                Some(&(lo, hi)) => x.clamp(lo, hi),
                None => x,
            })
            .collect()
    };
    let eval = |p: &[f64]| -> f64 {
        let v = objective(p);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let origin = clamp(start.to_vec());
    let mut vertices = vec![origin.clone()];
    for i in 0..dim {
        let mut v = origin.clone();
        let step = if v[i].abs() > 1e-10 {
            config.initial_step * v[i].abs()
        } else {
            config.initial_step
        };
        v[i] += step;
        // Step inward when the outward vertex would be clamped back onto the origin.
        if let Some(&(lo, hi)) = bounds.get(i) {
            if v[i] > hi {
                v[i] = (origin[i] - step).max(lo);
            }
        }
        vertices.push(clamp(v));
    }
    let mut scores: Vec<f64> = vertices.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        order_simplex(&mut vertices, &mut scores);

        let best = scores[0];
        let worst = scores[dim];
        let runner_up = scores[dim - 1];

        let centroid = centroid_without_last(&vertices);
        let spread = vertices
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if (worst - best).abs() < config.tolerance || spread < config.tolerance {
            converged = true;
            break;
        }

        let reflected = clamp(along(&centroid, &vertices[dim], -config.reflection));
        let reflected_score = eval(&reflected);

        if reflected_score < best {
            let expanded = clamp(along(&centroid, &vertices[dim], -config.reflection * config.expansion));
            let expanded_score = eval(&expanded);
            if expanded_score < reflected_score {
                vertices[dim] = expanded;
                scores[dim] = expanded_score;
            } else {
                vertices[dim] = reflected;
                scores[dim] = reflected_score;
            }
            continue;
        }

        if reflected_score < runner_up {
            vertices[dim] = reflected;
            scores[dim] = reflected_score;
            continue;
        }

        let (candidate, candidate_score) = if reflected_score < worst {
            let outside = clamp(along(&centroid, &reflected, config.contraction));
            let score = eval(&outside);
            (outside, score)
        } else {
            let inside = clamp(along(&centroid, &vertices[dim], config.contraction));
            let score = eval(&inside);
            (inside, score)
        };
        if candidate_score < reflected_score.min(worst) {
            vertices[dim] = candidate;
            scores[dim] = candidate_score;
            continue;
        }

        let anchor = vertices[0].clone();
        for k in 1..=dim {
            let shrunk = along(&anchor, &vertices[k], config.shrink);
            vertices[k] = clamp(shrunk);
            scores[k] = eval(&vertices[k]);
        }
    }

    order_simplex(&mut vertices, &mut scores);
    Minimum {
        point: vertices.swap_remove(0),
        value: scores[0],
        iterations,
        converged,
    }
}

/// Sort vertices by ascending objective value.
fn order_simplex(vertices: &mut Vec<Vec<f64>>, scores: &mut Vec<f64>) {
    let mut paired: Vec<(f64, Vec<f64>)> = scores
        .drain(..)
        .zip(vertices.drain(..))
        .collect();
    paired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    for (score, vertex) in paired {
        scores.push(score);
        vertices.push(vertex);
    }
}

/// Centroid of all vertices except the last (worst) one.
fn centroid_without_last(vertices: &[Vec<f64>]) -> Vec<f64> {
    let kept = &vertices[..vertices.len() - 1];
    let mut c = vec![0.0; kept[0].len()];
    for v in kept {
        for (acc, x) in c.iter_mut().zip(v) {
            *acc += x;
        }
    }
    let n = kept.len() as f64;
    c.iter_mut().for_each(|x| *x /= n);
    c
}

/// Point `from + t * (to - from)`.
fn along(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(f, x)| f + t * (x - f)).collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
