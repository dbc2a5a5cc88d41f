//! Value categorization and coloring.
//!
//! Shallow by design: the mapping core only needs a category index per
//! record plus a color and label per category. Four modes mirror the
//! caller surface: computed quantile breakpoints, caller breakpoints,
//! caller category indices, and caller-supplied colors.

use anyhow::{bail, ensure, Result};

use crate::record::DataValue;
use crate::report::{Report, Warning};

/// Sequential blue ramps, 2 through 9 classes.
const BLUES: [&[&str]; 8] = [
    &["#DEEBF7", "#3182BD"],
    &["#DEEBF7", "#9ECAE1", "#3182BD"],
    &["#EFF3FF", "#BDD7E7", "#6BAED6", "#2171B5"],
    &["#EFF3FF", "#BDD7E7", "#6BAED6", "#3182BD", "#08519C"],
    &["#EFF3FF", "#C6DBEF", "#9ECAE1", "#6BAED6", "#3182BD", "#08519C"],
    &["#EFF3FF", "#C6DBEF", "#9ECAE1", "#6BAED6", "#4292C6", "#2171B5", "#084594"],
    &["#F7FBFF", "#DEEBF7", "#C6DBEF", "#9ECAE1", "#6BAED6", "#4292C6", "#2171B5", "#084594"],
    &[
        "#F7FBFF", "#DEEBF7", "#C6DBEF", "#9ECAE1", "#6BAED6", "#4292C6", "#2171B5", "#08519C",
        "#08306B",
    ],
];

pub const MIN_CATEGORIES: usize = 2;
pub const MAX_CATEGORIES: usize = 9;
pub const DEFAULT_CATEGORIES: usize = 5;

fn palette(categories: usize) -> Vec<String> {
    BLUES[categories - MIN_CATEGORIES]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub enum CategorizeMode {
    /// Breakpoints computed from the data at the 1/k .. (k-1)/k quantiles.
    Quantiles { categories: usize },
    /// Caller-supplied ascending interior breakpoints.
    Breakpoints { breaks: Vec<f64> },
    /// Values are already 1-based category indices.
    CategoryIndex,
    /// Values are literal colors; one category per distinct color.
    Colors,
}

/// Output of categorization: a category per record, a color and a label
/// per category.
#[derive(Debug, Clone)]
pub struct Categorized {
    pub category: Vec<usize>,
    pub colors: Vec<String>,
    pub labels: Vec<String>,
}

pub fn categorize(
    values: &[DataValue],
    mode: &CategorizeMode,
    report: &mut Report,
) -> Result<Categorized> {
    ensure!(!values.is_empty(), "no values to categorize");
    match mode {
        CategorizeMode::Quantiles { categories } => {
            let k = clamp_categories(*categories, report);
            let numbers = numeric_values(values)?;
            let breaks = quantile_breaks(&numbers, k);
            Ok(apply_breaks(&numbers, &breaks))
        }
        CategorizeMode::Breakpoints { breaks } => {
            if breaks.len() + 1 > MAX_CATEGORIES || breaks.is_empty() {
                report.push(Warning::InvalidCategoryCount {
                    given: breaks.len() + 1,
                    default: DEFAULT_CATEGORIES,
                });
                let numbers = numeric_values(values)?;
                let breaks = quantile_breaks(&numbers, DEFAULT_CATEGORIES);
                return Ok(apply_breaks(&numbers, &breaks));
            }
            ensure!(
                breaks.windows(2).all(|w| w[0] < w[1]),
                "breakpoints must be strictly ascending"
            );
            let numbers = numeric_values(values)?;
            Ok(apply_breaks(&numbers, breaks))
        }
        CategorizeMode::CategoryIndex => {
            let numbers = numeric_values(values)?;
            let max = numbers.iter().fold(0usize, |acc, &v| acc.max(v as usize));
            ensure!(
                (MIN_CATEGORIES..=MAX_CATEGORIES).contains(&max),
                "category indices must lie in 1..={MAX_CATEGORIES}, found {max}"
            );
            let category: Vec<usize> = numbers
                .iter()
                .map(|&v| {
                    let idx = v as usize;
                    ensure!(idx >= 1 && idx <= max, "category index {v} out of range");
                    Ok(idx - 1)
                })
                .collect::<Result<_>>()?;
            Ok(Categorized {
                category,
                colors: palette(max),
                labels: (1..=max).map(|i| format!("category {i}")).collect(),
            })
        }
        CategorizeMode::Colors => {
            let mut colors: Vec<String> = Vec::new();
            let mut category = Vec::with_capacity(values.len());
            for value in values {
                let color = match value {
                    DataValue::Text(color) => color.clone(),
                    DataValue::Number(_) => bail!("color mode expects color strings as values"),
                };
                let idx = match colors.iter().position(|c| *c == color) {
                    Some(idx) => idx,
                    None => {
                        colors.push(color);
                        colors.len() - 1
                    }
                };
                category.push(idx);
            }
            let labels = colors.clone();
            Ok(Categorized { category, colors, labels })
        }
    }
}

fn clamp_categories(requested: usize, report: &mut Report) -> usize {
    if (MIN_CATEGORIES..=MAX_CATEGORIES).contains(&requested) {
        requested
    } else {
        report.push(Warning::InvalidCategoryCount {
            given: requested,
            default: DEFAULT_CATEGORIES,
        });
        DEFAULT_CATEGORIES
    }
}

fn numeric_values(values: &[DataValue]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|v| {
            v.as_number()
                .ok_or_else(|| anyhow::anyhow!("expected a numeric value, found {v:?}"))
        })
        .collect()
}

/// Interior breakpoints at the i/k quantiles of the sorted values.
fn quantile_breaks(numbers: &[f64], categories: usize) -> Vec<f64> {
    let mut sorted = numbers.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    (1..categories)
        .map(|i| {
            let pos = (i as f64 / categories as f64) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] * (1.0 - frac) + sorted[hi] * frac
        })
        .collect()
}

fn apply_breaks(numbers: &[f64], breaks: &[f64]) -> Categorized {
    let k = breaks.len() + 1;
    let category = numbers
        .iter()
        .map(|&v| breaks.iter().position(|&b| v <= b).unwrap_or(k - 1))
        .collect();

    let mut labels = Vec::with_capacity(k);
    for i in 0..k {
        let label = if i == 0 {
            format!("<= {:.4}", breaks[0])
        } else if i == k - 1 {
            format!("> {:.4}", breaks[k - 2])
        } else {
            format!("{:.4} - {:.4}", breaks[i - 1], breaks[i])
        };
        labels.push(label);
    }

    Categorized { category, colors: palette(k), labels }
}
