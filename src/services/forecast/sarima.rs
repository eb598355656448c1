// src/services/forecast/sarima.rs
//
// SARIMA (p,d,q)(P,D,Q)s ajustado por máxima verossimilhança condicional
// (soma de quadrados condicional, variância concentrada).
//
// Convenções dos polinômios no operador de defasagem B, índice = defasagem:
//   AR:  (1 - φ1 B - ... )(1 - Φ1 B^s - ...)
//   MA:  (1 + θ1 B + ... )(1 + Θ1 B^s + ...)
//   Diferenciação: (1 - B)^d (1 - B^s)^D

use super::{
    optimizer::{minimize, NelderMeadOptions},
    ForecastError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaOrder {
    /// (1,1,1)(1,1,1,7): sazonalidade semanal em dados diários
    pub const WEEKLY: SarimaOrder = SarimaOrder {
        p: 1,
        d: 1,
        q: 1,
        seasonal_p: 1,
        seasonal_d: 1,
        seasonal_q: 1,
        period: 7,
    };

    fn param_count(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    fn differencing_lags(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    fn ar_lags(&self) -> usize {
        self.p + self.seasonal_p * self.period
    }

    /// Menor série que ainda deixa mais resíduos do que parâmetros
    pub fn min_observations(&self) -> usize {
        self.differencing_lags() + self.ar_lags() + self.param_count() + 1
    }
}

#[derive(Debug, Clone)]
pub struct FittedSarima {
    pub order: SarimaOrder,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    /// Variância dos resíduos, na escala original da série
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub iterations: usize,
    // Estado necessário para projetar: série escalada e resíduos alinhados a ela
    scale: f64,
    history: Vec<f64>,
    residuals: Vec<f64>,
}

// |r| <= 0.9988: fora disso a superfície fica plana e o otimizador para
const MAX_PACF_ARG: f64 = 20.0;

// Coeficientes AR a partir de autocorrelações parciais em (-1, 1)
// (recursão de Durbin–Levinson): garante estacionariedade.
fn pacf_to_coefficients(unconstrained: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(unconstrained.len());
    for &u in unconstrained {
        let u = u.clamp(-MAX_PACF_ARG, MAX_PACF_ARG);
        let r = u / (1.0 + u * u).sqrt();
        let previous = phi.clone();
        let k = previous.len();
        for i in 0..k {
            phi[i] = previous[i] - r * previous[k - 1 - i];
        }
        phi.push(r);
    }
    phi
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

// 1 + sign·c1 B^step + sign·c2 B^(2·step) + ...
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (k, c) in coefficients.iter().enumerate() {
        poly[(k + 1) * step] = sign * c;
    }
    poly
}

fn differencing_polynomial(order: &SarimaOrder) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..order.d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    for _ in 0..order.seasonal_d {
        poly = multiply(&poly, &lag_polynomial(&[1.0], order.period, -1.0));
    }
    poly
}

// Aplica um polinômio de defasagem; a saída começa onde todas as defasagens existem
fn apply_polynomial(poly: &[f64], series: &[f64]) -> Vec<f64> {
    let lags = poly.len() - 1;
    (lags..series.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * series[t - k]).sum())
        .collect()
}

struct Coefficients {
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Coefficients {
    fn from_unconstrained(order: &SarimaOrder, params: &[f64]) -> Self {
        let (ar, rest) = params.split_at(order.p);
        let (ma, rest) = rest.split_at(order.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(order.seasonal_p);

        // MA invertível = mesmo mapeamento do AR com o sinal trocado
        let invert = |v: Vec<f64>| v.into_iter().map(|c| -c).collect::<Vec<_>>();

        Self {
            ar: pacf_to_coefficients(ar),
            ma: invert(pacf_to_coefficients(ma)),
            seasonal_ar: pacf_to_coefficients(seasonal_ar),
            seasonal_ma: invert(pacf_to_coefficients(seasonal_ma)),
        }
    }

    fn ar_polynomial(&self, period: usize) -> Vec<f64> {
        multiply(
            &lag_polynomial(&self.ar, 1, -1.0),
            &lag_polynomial(&self.seasonal_ar, period, -1.0),
        )
    }

    fn ma_polynomial(&self, period: usize) -> Vec<f64> {
        multiply(
            &lag_polynomial(&self.ma, 1, 1.0),
            &lag_polynomial(&self.seasonal_ma, period, 1.0),
        )
    }
}

// Resíduos condicionais: os primeiros `ar_lags` ficam em zero e fora da soma.
fn conditional_residuals(ar_poly: &[f64], ma_poly: &[f64], w: &[f64]) -> Vec<f64> {
    let start = ar_poly.len() - 1;
    let mut e = vec![0.0; w.len()];

    for t in start..w.len() {
        let ar_part: f64 = ar_poly.iter().enumerate().map(|(k, c)| c * w[t - k]).sum();
        let ma_part: f64 = ma_poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(j, _)| *j <= t)
            .map(|(j, c)| c * e[t - j])
            .sum();
        e[t] = ar_part - ma_part;
    }
    e
}

// -log L com a variância concentrada (σ² = SSE / n)
fn negative_log_likelihood(sse: f64, n: usize) -> f64 {
    let n = n as f64;
    let sigma2 = sse / n;
    0.5 * n * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0)
}

impl FittedSarima {
    pub fn fit(order: SarimaOrder, series: &[f64]) -> Result<Self, ForecastError> {
        let required = order.min_observations();
        if series.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: series.len(),
            });
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NumericalError(
                "a série contém valores não finitos".to_string(),
            ));
        }

        // Trabalha numa escala ~1 para o otimizador; o modelo é linear e sem constante.
        let scale = series.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if scale == 0.0 {
            return Err(ForecastError::DegenerateSeries);
        }
        let history: Vec<f64> = series.iter().map(|v| v / scale).collect();

        let diff_poly = differencing_polynomial(&order);
        let w = apply_polynomial(&diff_poly, &history);
        if w.iter().all(|v| v.abs() < 1e-12) {
            return Err(ForecastError::DegenerateSeries);
        }

        let conditioned = order.ar_lags();
        let effective = w.len() - conditioned;

        let objective = |params: &[f64]| {
            let coefs = Coefficients::from_unconstrained(&order, params);
            let e = conditional_residuals(
                &coefs.ar_polynomial(order.period),
                &coefs.ma_polynomial(order.period),
                &w,
            );
            let sse: f64 = e[conditioned..].iter().map(|x| x * x).sum();
            negative_log_likelihood(sse, effective)
        };

        let start = vec![0.0; order.param_count()];
        let minimum = minimize(objective, &start, NelderMeadOptions::default())
            .map_err(|nc| ForecastError::NotConverged {
                iterations: nc.iterations,
            })?;

        if !minimum.value.is_finite() {
            return Err(ForecastError::NumericalError(
                "verossimilhança não finita no ótimo".to_string(),
            ));
        }

        let coefs = Coefficients::from_unconstrained(&order, &minimum.x);
        let ar_poly = coefs.ar_polynomial(order.period);
        let ma_poly = coefs.ma_polynomial(order.period);
        let e_w = conditional_residuals(&ar_poly, &ma_poly, &w);
        let sse: f64 = e_w[conditioned..].iter().map(|x| x * x).sum();
        let sigma2_scaled = sse / effective as f64;

        if sigma2_scaled <= 0.0 || !sigma2_scaled.is_finite() {
            return Err(ForecastError::DegenerateSeries);
        }

        // Resíduos alinhados à série original (zeros antes da diferenciação)
        let mut residuals = vec![0.0; order.differencing_lags()];
        residuals.extend(e_w);

        Ok(Self {
            order,
            ar: coefs.ar,
            ma: coefs.ma,
            seasonal_ar: coefs.seasonal_ar,
            seasonal_ma: coefs.seasonal_ma,
            sigma2: sigma2_scaled * scale * scale,
            // Volta para a escala original: cada observação ganha um fator 1/scale
            log_likelihood: -minimum.value - effective as f64 * scale.ln(),
            iterations: minimum.iterations,
            scale,
            history,
            residuals,
        })
    }

    /// Projeção `horizon` passos à frente: (média, erro padrão) por passo.
    pub fn forecast(&self, horizon: usize) -> Vec<(f64, f64)> {
        let coefs = Coefficients {
            ar: self.ar.clone(),
            ma: self.ma.clone(),
            seasonal_ar: self.seasonal_ar.clone(),
            seasonal_ma: self.seasonal_ma.clone(),
        };
        let period = self.order.period;

        // AR completo, já com a diferenciação embutida
        let full_ar = multiply(&coefs.ar_polynomial(period), &differencing_polynomial(&self.order));
        let ma_poly = coefs.ma_polynomial(period);

        let mut y = self.history.clone();
        let mut e = self.residuals.clone();
        let n = y.len();

        for h in 0..horizon {
            let t = n + h;
            let ar_part: f64 = full_ar
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, c)| -c * y[t - k])
                .sum();
            let ma_part: f64 = ma_poly
                .iter()
                .enumerate()
                .skip(1)
                .map(|(j, c)| c * e[t - j])
                .sum();
            y.push(ar_part + ma_part);
            // Choques futuros têm esperança zero
            e.push(0.0);
        }

        // Pesos ψ da representação MA(∞) para a variância de cada passo
        let mut psi = vec![1.0];
        for j in 1..horizon {
            let ma_j = ma_poly.get(j).copied().unwrap_or(0.0);
            let ar_sum: f64 = full_ar
                .iter()
                .enumerate()
                .skip(1)
                .take_while(|(k, _)| *k <= j)
                .map(|(k, c)| c * psi[j - k])
                .sum();
            psi.push(ma_j - ar_sum);
        }

        let sigma2_scaled = self.sigma2 / (self.scale * self.scale);
        let mut cumulative = 0.0;
        y[n..]
            .iter()
            .zip(psi.iter())
            .map(|(mean, weight)| {
                cumulative += weight * weight;
                let std_err = (sigma2_scaled * cumulative).sqrt() * self.scale;
                (mean * self.scale, std_err)
            })
            .collect()
    }
}
