//! Trend summarization
//!
//! This module pivots the normalized event stream into per-date behavior
//! counts and derives the series handed to the visualization layer:
//! - Behavior counts and totals per session date
//! - Proportion of a behavior per date, paired with the date ordinal
//! - Spearman rank correlation of a proportion series over time, with a
//!   two-sided p-value from the t approximation

use crate::error::MissionError;
use crate::ethogram::Behavior;
use crate::types::{date_ordinal, AggregatedTrend, EthogramEvent, ProportionPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::debug;

/// Summarizer for behavior trends across sessions
pub struct TrendSummarizer;

impl TrendSummarizer {
    /// One trend row per distinct date, in date order
    ///
    /// Only behaviors observed on a date get a count entry.
    pub fn summarize(events: &[EthogramEvent]) -> Vec<AggregatedTrend> {
        let mut by_date: BTreeMap<NaiveDate, BTreeMap<Behavior, u32>> = BTreeMap::new();

        for event in events {
            *by_date
                .entry(event.date)
                .or_default()
                .entry(event.behavior)
                .or_insert(0) += 1;
        }

        let trends: Vec<AggregatedTrend> = by_date
            .into_iter()
            .map(|(date, counts)| AggregatedTrend {
                date,
                total: counts.values().sum(),
                date_ordinal: date_ordinal(date),
                counts,
            })
            .collect();

        debug!(events = events.len(), dates = trends.len(), "summarized trends");
        trends
    }

    /// Share of observations spent in `behavior`, per date
    ///
    /// A date where the behavior was not observed contributes a proportion of
    /// zero. A date with no observations at all is an error.
    pub fn percent_behavior(
        trends: &[AggregatedTrend],
        behavior: Behavior,
    ) -> Result<Vec<ProportionPoint>, MissionError> {
        trends
            .iter()
            .map(|trend| {
                if trend.total == 0 {
                    return Err(MissionError::DivisionUndefined { date: trend.date });
                }
                Ok(ProportionPoint {
                    date: trend.date,
                    date_ordinal: trend.date_ordinal,
                    proportion: f64::from(trend.count(behavior)) / f64::from(trend.total),
                    total: trend.total,
                })
            })
            .collect()
    }
}

/// Spearman rank correlation between date ordinal and proportion
///
/// Returns `None` for fewer than two points or when either series is
/// constant.
pub fn spearman_rho(series: &[ProportionPoint]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }

    let x: Vec<f64> = series.iter().map(|p| f64::from(p.date_ordinal)).collect();
    let y: Vec<f64> = series.iter().map(|p| p.proportion).collect();
    pearson(&average_ranks(&x), &average_ranks(&y))
}

/// Spearman correlation of a proportion series and its significance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpearmanResult {
    pub rho: f64,
    /// Two-sided; absent with fewer than three points
    pub p_value: Option<f64>,
    /// Number of dates in the series
    pub n: usize,
}

/// Spearman rho with a two-sided p-value
///
/// The p-value uses `t = rho * sqrt((n - 2) / (1 - rho^2))` against a
/// Student t distribution with `n - 2` degrees of freedom. A perfect
/// correlation has p-value 0.
pub fn spearman_test(series: &[ProportionPoint]) -> Option<SpearmanResult> {
    let rho = spearman_rho(series)?;
    let n = series.len();
    let result = SpearmanResult {
        rho,
        p_value: t_test_p_value(rho, n),
        n,
    };
    debug!(rho, p_value = ?result.p_value, n, "spearman test");
    Some(result)
}

fn t_test_p_value(rho: f64, n: usize) -> Option<f64> {
    if n < 3 {
        return None;
    }
    let df = (n - 2) as f64;
    let residual = (1.0 - rho) * (1.0 + rho);
    if residual <= 0.0 {
        return Some(0.0);
    }
    let t_squared = rho * rho * df / residual;
    // P(|T| > t) = I_x(df / 2, 1 / 2) with x = df / (df + t^2)
    Some(regularized_beta(df / (df + t_squared), df / 2.0, 0.5))
}

/// Regularized incomplete beta function I_x(a, b)
fn regularized_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b)
        + a * x.ln()
        + b * (1.0 - x).ln())
    .exp();

    // The continued fraction converges fast only below this point
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_fraction(1.0 - x, b, a) / b
    }
}

/// Continued fraction for the incomplete beta, modified Lentz evaluation
fn beta_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - (a + b) * x / (a + 1.0));
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let numerator = m * (b - m) * x / ((a - 1.0 + m2) * (a + m2));
        d = 1.0 / guard(1.0 + numerator * d);
        c = guard(1.0 + numerator / c);
        h *= d * c;

        // Odd step
        let numerator = -(a + m) * (a + b + m) * x / ((a + m2) * (a + 1.0 + m2));
        d = 1.0 / guard(1.0 + numerator * d);
        c = guard(1.0 + numerator / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

/// Natural log of the gamma function (Lanczos, g = 7), for `x >= 0.5`
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    let x = x - 1.0;
    let sum = COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEFFICIENTS[0], |acc, (i, c)| acc + c / (x + i as f64));
    let t = x + G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// 1-based ranks, ties sharing the mean of their positions
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}
