//! Cross-column analysis and plot-input preparation.

mod correlation;
mod sampling;

pub use correlation::{cramers_v, cramers_v_matrix, pearson, pearson_matrix};
pub use sampling::{sample_indices, take_indices};
