// src/services/forecast/optimizer.rs
//
// Nelder–Mead sem derivadas, suficiente para os 4 parâmetros do modelo semanal.

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct NelderMeadOptions {
    pub max_iterations: usize,
    // Passo inicial do simplex em cada eixo
    pub initial_step: f64,
    // Convergência: espalhamento relativo dos valores da função
    pub f_tolerance: f64,
    // ...ou tamanho do simplex
    pub x_tolerance: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5_000,
            initial_step: 0.1,
            f_tolerance: 1e-10,
            x_tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotConverged {
    pub iterations: usize,
}

/// Minimiza `objective` a partir de `start`. Valores não finitos contam como +inf.
pub fn minimize<F>(
    objective: F,
    start: &[f64],
    options: NelderMeadOptions,
) -> Result<Minimum, NotConverged>
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let n = start.len();
    if n == 0 {
        return Ok(Minimum {
            x: Vec::new(),
            value: eval(start),
            iterations: 0,
        });
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.to_vec());
    for axis in 0..n {
        let mut vertex = start.to_vec();
        vertex[axis] += options.initial_step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    for iteration in 0..options.max_iterations {
        // Ordena do melhor para o pior
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let best = values[0];
        let worst = values[n];
        let f_spread = (worst - best).abs();
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);

        if best.is_finite()
            && (f_spread <= options.f_tolerance * (1.0 + best.abs())
                || x_spread <= options.x_tolerance)
        {
            return Ok(Minimum {
                x: simplex[0].clone(),
                value: best,
                iterations: iteration,
            });
        }

        // Centroide de todos menos o pior
        let mut centroid = vec![0.0; n];
        for vertex in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f64;
            }
        }

        let worst_vertex = simplex[n].clone();
        let along = |coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(&worst_vertex)
                .map(|(c, w)| c + coef * (w - c))
                .collect()
        };

        let reflected = along(-REFLECTION);
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = along(-EXPANSION);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        // Contração (externa se o refletido melhorou o pior, interna caso contrário)
        let (contracted, f_contracted) = if f_reflected < values[n] {
            let c = along(-CONTRACTION);
            let f = eval(&c);
            (c, f)
        } else {
            let c = along(CONTRACTION);
            let f = eval(&c);
            (c, f)
        };

        if f_contracted < values[n].min(f_reflected) {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        // Encolhe tudo em direção ao melhor vértice
        let best_vertex = simplex[0].clone();
        for i in 1..=n {
            for (x, b) in simplex[i].iter_mut().zip(&best_vertex) {
                *x = b + SHRINK * (*x - b);
            }
            values[i] = eval(&simplex[i]);
        }
    }

    Err(NotConverged {
        iterations: options.max_iterations,
    })
}
