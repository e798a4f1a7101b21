use super::template::{TemplateSource, render_template, to_value};
use crate::analysis::{cramers_v_matrix, pearson_matrix, sample_indices, take_indices};
use crate::charts::{
    self, ColorScale, IMAGE_MIME, categorical_distribution, category_numeric_plot,
    correlation_heatmap, numeric_distribution, pair_plot, scatter_plot,
};
use crate::config::ReportConfig;
use crate::dataset::Dataset;
use crate::error::{Result, ResultExt};
use crate::ingestion::{load_csv_bytes, load_csv_path};
use crate::profiler::{DataProfiler, top_frequencies};
use crate::types::{ColumnKind, ColumnSummary, CorrelationMatrix, DatasetMetadata, SkippedRow};
use chrono::Local;
use minijinja::{Value, context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

// ============================================================================
// Report Artifacts
// ============================================================================

/// Correlation section of a report.
///
/// Matrices are `None` when the dataset has too few columns of the kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationSection {
    pub numeric_matrix: Option<CorrelationMatrix>,
    pub categorical_matrix: Option<CorrelationMatrix>,
    /// Base64 SVG heatmap of `numeric_matrix`.
    pub numeric_img: Option<String>,
    /// Base64 SVG heatmap of `categorical_matrix`.
    pub categorical_img: Option<String>,
}

/// Relationship plots (base64 SVG), each absent when not applicable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipSection {
    pub pairplot: Option<String>,
    pub scatterplot: Option<String>,
    pub cat_num: Option<String>,
}

/// Data behind one distribution chart.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DistributionInput {
    /// Sampled non-missing values of a numeric column.
    Numeric(Vec<f64>),
    /// Most frequent values among the sampled rows.
    TopValues(Vec<crate::types::FrequencyEntry>),
}

/// Everything computed for one report, ready to be rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifacts {
    pub title: String,
    pub generated_at: String,
    /// `(rows, columns)`
    pub shape: (usize, usize),
    pub metadata: DatasetMetadata,
    /// HTML table of the first rows, already escaped.
    pub dataset_head: String,
    pub column_stats: Vec<ColumnSummary>,
    pub numeric_cols: Vec<String>,
    /// Every non-numeric column (categorical, datetime and text).
    pub categorical_cols: Vec<String>,
    pub correlations: CorrelationSection,
    /// Column name to base64 SVG distribution chart.
    pub distributions: BTreeMap<String, String>,
    pub relationships: RelationshipSection,
    pub skipped_rows: Vec<SkippedRow>,
}

impl ReportArtifacts {
    /// Template context for these artifacts.
    ///
    /// `dataset_head` is passed as a safe string so auto-escaping leaves the
    /// table markup intact.
    pub fn to_context(&self) -> Value {
        context! {
            title => &self.title,
            generated_at => &self.generated_at,
            shape => to_value(&self.shape),
            metadata => to_value(&self.metadata),
            dataset_head => Value::from_safe_string(self.dataset_head.clone()),
            column_stats => to_value(&self.column_stats),
            numeric_cols => to_value(&self.numeric_cols),
            categorical_cols => to_value(&self.categorical_cols),
            correlations => to_value(&self.correlations),
            distributions => to_value(&self.distributions),
            relationships => to_value(&self.relationships),
            skipped_rows => to_value(&self.skipped_rows),
            image_mime => IMAGE_MIME,
        }
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Turns datasets into rendered HTML reports.
///
/// The generator holds only configuration, so one instance can serve many
/// concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
}

static_assertions::assert_impl_all!(ReportGenerator: Send, Sync);

impl ReportGenerator {
    /// Create a generator with a validated configuration.
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Load CSV bytes, analyze them and render the report.
    pub fn generate_report(&self, csv: &[u8], template: &TemplateSource) -> Result<String> {
        let dataset = load_csv_bytes(csv)?;
        let artifacts = self.build_artifacts(&dataset)?;
        self.render(&artifacts, template)
    }

    /// Same as [`generate_report`](Self::generate_report) for a file on disk.
    pub fn generate_report_from_path(
        &self,
        path: impl AsRef<Path>,
        template: &TemplateSource,
    ) -> Result<String> {
        let dataset = load_csv_path(path)?;
        let artifacts = self.build_artifacts(&dataset)?;
        self.render(&artifacts, template)
    }

    /// Render previously computed artifacts.
    pub fn render(&self, artifacts: &ReportArtifacts, template: &TemplateSource) -> Result<String> {
        let html = render_template(template, artifacts.to_context())?;
        info!("Rendered report ({} bytes) with {}", html.len(), template.describe());
        Ok(html)
    }

    /// Write a rendered report to disk.
    pub fn save_report(html: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)
            .map_err(crate::error::InsightError::from)
            .context(format!("Writing report to '{}'", path.display()))?;
        info!("Report saved to {}", path.display());
        Ok(())
    }

    /// Compute every artifact of the report for a loaded dataset.
    pub fn build_artifacts(&self, dataset: &Dataset) -> Result<ReportArtifacts> {
        let start = Instant::now();

        let profile = DataProfiler::profile_dataset(dataset, &self.config)
            .context("Computing column statistics")?;
        info!("Profiled {} columns", profile.columns.len());

        let numeric_cols = dataset.columns_of_kind(ColumnKind::Numeric);
        let categorical_cols: Vec<String> = dataset
            .columns()
            .into_iter()
            .filter(|(_, kind)| !kind.is_numeric())
            .map(|(name, _)| name)
            .collect();

        let correlations = self
            .correlation_section(dataset, &numeric_cols)
            .context("Computing correlations")?;
        let (distributions, plot_sample_rows) = self
            .distribution_plots(dataset)
            .context("Drawing distribution plots")?;
        let (relationships, relationship_sample_rows) = self
            .relationship_plots(dataset, &numeric_cols)
            .context("Drawing relationship plots")?;

        let mut metadata = profile.metadata;
        metadata.plot_sample_rows = plot_sample_rows;
        metadata.relationship_sample_rows = relationship_sample_rows;

        let artifacts = ReportArtifacts {
            title: self.config.title.clone(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            shape: (dataset.height(), dataset.width()),
            metadata,
            dataset_head: dataset.head_html(self.config.head_rows)?,
            column_stats: profile.columns,
            numeric_cols,
            categorical_cols,
            correlations,
            distributions,
            relationships,
            skipped_rows: dataset.skipped_rows().to_vec(),
        };

        info!(
            "Report artifacts ready in {} ms",
            start.elapsed().as_millis()
        );
        Ok(artifacts)
    }

    fn correlation_section(
        &self,
        dataset: &Dataset,
        numeric_cols: &[String],
    ) -> Result<CorrelationSection> {
        let mut section = CorrelationSection::default();

        if !numeric_cols.is_empty() {
            let columns = numeric_cols
                .iter()
                .map(|name| Ok((name.clone(), dataset.numeric_values(name)?)))
                .collect::<Result<Vec<_>>>()?;
            let matrix = pearson_matrix(&columns);
            let svg = correlation_heatmap("Numeric Correlation Matrix", &matrix, ColorScale::Diverging)?;
            section.numeric_img = Some(charts::encode_svg(&svg));
            section.numeric_matrix = Some(matrix);
        } else {
            debug!("No numeric columns; skipping numeric correlation");
        }

        let categorical = dataset.columns_of_kind(ColumnKind::Categorical);
        if categorical.len() >= 2 {
            let columns = categorical
                .iter()
                .map(|name| Ok((name.clone(), dataset.string_values(name)?)))
                .collect::<Result<Vec<_>>>()?;
            let matrix = cramers_v_matrix(&columns);
            let svg = correlation_heatmap(
                "Categorical Association (Cramér's V)",
                &matrix,
                ColorScale::Sequential,
            )?;
            section.categorical_img = Some(charts::encode_svg(&svg));
            section.categorical_matrix = Some(matrix);
        }

        Ok(section)
    }

    /// Values each distribution chart is drawn from, after downsampling.
    ///
    /// Returns the number of sampled rows with one input per column.
    pub(crate) fn distribution_inputs(
        &self,
        dataset: &Dataset,
    ) -> Result<(usize, Vec<(String, DistributionInput)>)> {
        let indices = sample_indices(
            dataset.height(),
            self.config.plot_sample_cap,
            self.config.sample_seed,
        );
        debug!("Distribution plots use {} sampled rows", indices.len());

        let mut inputs = Vec::with_capacity(dataset.width());
        for (name, kind) in dataset.columns() {
            let input = if kind.is_numeric() {
                let values = dataset.numeric_values(&name)?;
                DistributionInput::Numeric(
                    take_indices(&values, &indices).into_iter().flatten().collect(),
                )
            } else {
                let values = dataset.string_values(&name)?;
                let sampled: Vec<String> =
                    take_indices(&values, &indices).into_iter().flatten().collect();
                DistributionInput::TopValues(top_frequencies(
                    &sampled,
                    indices.len(),
                    self.config.bar_chart_categories,
                ))
            };
            inputs.push((name, input));
        }
        Ok((indices.len(), inputs))
    }

    fn distribution_plots(&self, dataset: &Dataset) -> Result<(BTreeMap<String, String>, usize)> {
        let (sample_rows, inputs) = self.distribution_inputs(dataset)?;

        let mut plots = BTreeMap::new();
        for (name, input) in inputs {
            let svg = match &input {
                DistributionInput::Numeric(values) => numeric_distribution(&name, values)?,
                DistributionInput::TopValues(top) => categorical_distribution(&name, top)?,
            };
            plots.insert(name, charts::encode_svg(&svg));
        }
        Ok((plots, sample_rows))
    }

    fn relationship_plots(
        &self,
        dataset: &Dataset,
        numeric_cols: &[String],
    ) -> Result<(RelationshipSection, usize)> {
        let mut section = RelationshipSection::default();
        let indices = sample_indices(
            dataset.height(),
            self.config.relationship_sample_cap,
            self.config.sample_seed,
        );
        debug!("Relationship plots use {} sampled rows", indices.len());

        if numeric_cols.len() >= 2 {
            let columns = numeric_cols
                .iter()
                .take(self.config.pairplot_max_columns)
                .map(|name| {
                    let values = dataset.numeric_values(name)?;
                    Ok((name.clone(), take_indices(&values, &indices)))
                })
                .collect::<Result<Vec<_>>>()?;

            section.pairplot = Some(charts::encode_svg(&pair_plot(&columns)?));
            section.scatterplot = Some(charts::encode_svg(&scatter_plot(
                &columns[0].0,
                &columns[0].1,
                &columns[1].0,
                &columns[1].1,
            )?));
        }

        let first_categorical = dataset.columns_of_kind(ColumnKind::Categorical).into_iter().next();
        if let (Some(category), Some(numeric)) = (first_categorical, numeric_cols.first()) {
            let labels = take_indices(&dataset.string_values(&category)?, &indices);
            let values = take_indices(&dataset.numeric_values(numeric)?, &indices);
            let groups = self.group_by_top_categories(&labels, &values);
            if !groups.is_empty() {
                section.cat_num = Some(charts::encode_svg(&category_numeric_plot(
                    &category, numeric, &groups,
                )?));
            }
        }

        Ok((section, indices.len()))
    }

    /// Numeric values per category for the most frequent categories.
    fn group_by_top_categories(
        &self,
        labels: &[Option<String>],
        values: &[Option<f64>],
    ) -> Vec<(String, Vec<f64>)> {
        let present: Vec<&str> = labels.iter().flatten().map(String::as_str).collect();
        let top = top_frequencies(&present, labels.len(), self.config.bar_chart_categories);

        top.into_iter()
            .map(|entry| {
                let group: Vec<f64> = labels
                    .iter()
                    .zip(values)
                    .filter(|(label, _)| label.as_deref() == Some(entry.value.as_str()))
                    .filter_map(|(_, value)| *value)
                    .collect();
                (entry.value, group)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MIXED_CSV: &str = "age,income,city,segment\n\
                             25,40000,Paris,a\n\
                             32,52000,Lyon,b\n\
                             47,61000,Paris,a\n\
                             51,58000,Nice,b\n\
                             38,,Lyon,a\n";

    fn artifacts_for(csv: &str) -> ReportArtifacts {
        let dataset = load_csv_bytes(csv.as_bytes()).unwrap();
        ReportGenerator::default().build_artifacts(&dataset).unwrap()
    }

    #[test]
    fn test_artifacts_for_mixed_dataset() {
        let artifacts = artifacts_for(MIXED_CSV);

        assert_eq!(artifacts.shape, (5, 4));
        assert_eq!(artifacts.numeric_cols, vec!["age", "income"]);
        assert_eq!(artifacts.categorical_cols, vec!["city", "segment"]);
        assert_eq!(artifacts.distributions.len(), 4);

        let numeric = artifacts.correlations.numeric_matrix.as_ref().unwrap();
        assert_eq!(numeric.columns, vec!["age", "income"]);
        assert!(artifacts.correlations.numeric_img.is_some());
        assert!(artifacts.correlations.categorical_img.is_some());

        assert!(artifacts.relationships.pairplot.is_some());
        assert!(artifacts.relationships.scatterplot.is_some());
        assert!(artifacts.relationships.cat_num.is_some());
    }

    #[test]
    fn test_no_numeric_columns_omits_correlation_and_relationships() {
        let artifacts = artifacts_for("color,shape\nred,circle\nblue,square\nred,square\n");
        assert!(artifacts.correlations.numeric_matrix.is_none());
        assert!(artifacts.correlations.numeric_img.is_none());
        assert!(artifacts.relationships.pairplot.is_none());
        assert!(artifacts.relationships.cat_num.is_none());
    }

    #[test]
    fn test_single_numeric_column_gets_one_by_one_matrix() {
        let artifacts = artifacts_for("x,label\n1,a\n2,b\n3,a\n");
        let matrix = artifacts.correlations.numeric_matrix.unwrap();
        assert_eq!(matrix.len(), 1);
        assert!(artifacts.relationships.pairplot.is_none());
        assert!(artifacts.relationships.cat_num.is_some());
    }

    #[test]
    fn test_generate_report_renders_bundled_template() {
        let html = ReportGenerator::default()
            .generate_report(MIXED_CSV.as_bytes(), &TemplateSource::Bundled)
            .unwrap();
        assert!(html.contains("Dataset Analysis Report"));
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(html.contains("<table class=\"dataframe data-table\">"));
        assert!(html.contains("Paris"));
    }

    #[test]
    fn test_custom_title_and_template() {
        let generator =
            ReportGenerator::new(ReportConfig::builder().title("Cities").build().unwrap()).unwrap();
        let template = TemplateSource::Inline(
            "{{ title }}|{{ metadata.total_rows }}|{{ numeric_cols|join(',') }}".to_string(),
        );
        let html = generator.generate_report(MIXED_CSV.as_bytes(), &template).unwrap();
        assert_eq!(html, "Cities|5|age,income");
    }

    fn numbered_csv(rows: usize) -> String {
        let mut csv = String::from("x,y,kind\n");
        for i in 0..rows {
            csv.push_str(&format!("{},{},{}\n", i, i % 13, ["a", "b"][i % 2]));
        }
        csv
    }

    #[test]
    fn test_distribution_inputs_are_capped_by_sample() {
        let dataset = load_csv_bytes(numbered_csv(1_000).as_bytes()).unwrap();
        let config = ReportConfig::builder().plot_sample_cap(50).build().unwrap();
        let generator = ReportGenerator::new(config).unwrap();

        let (sample_rows, inputs) = generator.distribution_inputs(&dataset).unwrap();
        assert_eq!(sample_rows, 50);
        match &inputs[0] {
            (name, DistributionInput::Numeric(values)) => {
                assert_eq!(name, "x");
                assert_eq!(values.len(), 50);
            }
            other => panic!("unexpected input {:?}", other),
        }
        match &inputs[2] {
            (_, DistributionInput::TopValues(top)) => {
                assert_eq!(top.iter().map(|t| t.count).sum::<usize>(), 50);
            }
            other => panic!("unexpected input {:?}", other),
        }
    }

    #[test]
    fn test_metadata_records_sampled_rows_and_stats_use_all_rows() {
        let dataset = load_csv_bytes(numbered_csv(1_000).as_bytes()).unwrap();
        let config = ReportConfig::builder()
            .plot_sample_cap(50)
            .relationship_sample_cap(20)
            .build()
            .unwrap();
        let artifacts = ReportGenerator::new(config)
            .unwrap()
            .build_artifacts(&dataset)
            .unwrap();

        assert_eq!(artifacts.metadata.total_rows, 1_000);
        assert_eq!(artifacts.metadata.plot_sample_rows, 50);
        assert_eq!(artifacts.metadata.relationship_sample_rows, 20);
        let x = artifacts.column_stats.iter().find(|c| c.name == "x").unwrap();
        assert_eq!(x.count, 1_000);
        assert_eq!(x.numeric.as_ref().unwrap().max, 999.0);
    }

    #[test]
    fn test_group_by_top_categories() {
        let generator = ReportGenerator::default();
        let labels = vec![
            Some("a".to_string()),
            Some("b".to_string()),
            None,
            Some("a".to_string()),
        ];
        let values = vec![Some(1.0), Some(2.0), Some(3.0), None];
        let groups = generator.group_by_top_categories(&labels, &values);
        assert_eq!(
            groups,
            vec![("a".to_string(), vec![1.0]), ("b".to_string(), vec![2.0])]
        );
    }

    #[test]
    fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.html");
        ReportGenerator::save_report("<html></html>", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
