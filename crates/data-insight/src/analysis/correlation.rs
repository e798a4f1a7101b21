//! Association measures between columns.

use crate::types::CorrelationMatrix;
use std::collections::HashMap;

/// Pearson correlation over pairwise-complete observations.
///
/// Returns `None` with fewer than two complete pairs or when either side has
/// zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    Some(r.clamp(-1.0, 1.0))
}

/// Pairwise Pearson matrix over named numeric columns.
pub fn pearson_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        // Self-correlation is exactly 1 unless the column is degenerate.
        values[i][i] = pearson(&columns[i].1, &columns[i].1).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson(&columns[i].1, &columns[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}

/// Cramér's V between two categorical columns.
///
/// Rows where either value is missing are ignored. The chi-square statistic
/// is not bias-corrected.
pub fn cramers_v(x: &[Option<String>], y: &[Option<String>]) -> Option<f64> {
    let mut row_index: HashMap<&str, usize> = HashMap::new();
    let mut col_index: HashMap<&str, usize> = HashMap::new();
    let mut cells: HashMap<(usize, usize), f64> = HashMap::new();

    for (a, b) in x.iter().zip(y) {
        let (Some(a), Some(b)) = (a, b) else {
            continue;
        };
        let next_row = row_index.len();
        let r = *row_index.entry(a.as_str()).or_insert(next_row);
        let next_col = col_index.len();
        let c = *col_index.entry(b.as_str()).or_insert(next_col);
        *cells.entry((r, c)).or_insert(0.0) += 1.0;
    }

    let rows = row_index.len();
    let cols = col_index.len();
    if rows == 0 || cols == 0 {
        return None;
    }

    let mut row_sums = vec![0.0; rows];
    let mut col_sums = vec![0.0; cols];
    let mut total = 0.0;
    for (&(r, c), &count) in &cells {
        row_sums[r] += count;
        col_sums[c] += count;
        total += count;
    }

    let mut chi2 = 0.0;
    for (r, row_sum) in row_sums.iter().enumerate() {
        for (c, col_sum) in col_sums.iter().enumerate() {
            let expected = row_sum * col_sum / total;
            if expected > 0.0 {
                let observed = cells.get(&(r, c)).copied().unwrap_or(0.0);
                chi2 += (observed - expected).powi(2) / expected;
            }
        }
    }

    let denom = (rows.min(cols).saturating_sub(1)).max(1) as f64;
    let phi2 = chi2 / total;
    Some((phi2 / denom).max(0.0).sqrt())
}

/// Pairwise Cramér's V matrix; the diagonal is 1.
pub fn cramers_v_matrix(columns: &[(String, Vec<Option<String>>)]) -> CorrelationMatrix {
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let v = cramers_v(&columns[i].1, &columns[j].1);
            values[i][j] = v;
            values[j][i] = v;
        }
    }

    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}
