//! Integration tests for the cleaning pipeline.
//!
//! These tests drive the public API end to end with small CSV datasets.

use dqi_cleaner::{
    CleaningConfig, CleaningError, CleaningPipeline, CleaningStage, ImputationMode,
    ImputationStrategy, LocalStorage, OutlierPolicy, PngPlotRenderer, ProgressUpdate,
    TableLoader, TableSource, TableStorage, TypeNormalizer, clean,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(filename: &str) -> TableSource {
    TableSource::from_path(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .expect("missing column")
        .as_materialized_series()
        .f64()
        .expect("not a float column")
        .into_iter()
        .collect()
}

fn texts(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .expect("missing column")
        .as_materialized_series()
        .str()
        .expect("not a text column")
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect()
}

fn config_with_policy(policy: OutlierPolicy) -> CleaningConfig {
    CleaningConfig::builder()
        .outlier_policy(policy)
        .build()
        .unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_a_capping_uses_iqr_bounds() {
    let result = clean(fixture("prices.csv"), CleaningConfig::default()).unwrap();

    assert_eq!(
        floats(&result.table, "price"),
        vec![Some(1.0), Some(2.0), Some(3.0), Some(628.0)]
    );
    let treatment = &result.report.outliers[0];
    assert_eq!(treatment.column, "price");
    assert_eq!(treatment.lower, -374.0);
    assert_eq!(treatment.upper, 628.0);
    assert_eq!(treatment.affected, 1);
}

#[test]
fn test_scenario_b_categories_are_normalized_and_mode_filled() {
    let result = clean(fixture("cities.csv"), CleaningConfig::default()).unwrap();

    let expected: Vec<Option<String>> = ["ny", "ny", "ny", "la", "ny"]
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    assert_eq!(texts(&result.table, "city"), expected);

    let imputation = &result.report.imputations[0];
    assert_eq!(imputation.column, "city");
    assert_eq!(imputation.strategy, ImputationStrategy::Mode);
    assert_eq!(imputation.fill_value.as_deref(), Some("ny"));
    assert_eq!(imputation.filled, 1);
}

#[test]
fn test_scenario_c_high_missing_ratio_uses_median() {
    let source = TableSource::csv("id,v\n1,1\n2,\n3,2\n4,\n5,30\n");
    let result = clean(source, CleaningConfig::default()).unwrap();

    let imputation = &result.report.imputations[0];
    assert_eq!(imputation.column, "v");
    assert_eq!(imputation.strategy, ImputationStrategy::Median);
    assert_eq!(imputation.fill_value.as_deref(), Some("2.0"));
    assert_eq!(imputation.filled, 2);
}

#[test]
fn test_scenario_d_empty_table_fails_before_scoring() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();

    let err = CleaningPipeline::builder()
        .on_progress(move |update: ProgressUpdate| stages_clone.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run(&fixture("header_only.csv"))
        .unwrap_err();

    assert!(matches!(err.root(), CleaningError::EmptyDataset));
    assert_eq!(err.error_code(), "EMPTY_DATASET");
    assert_eq!(err.to_string(), "failed during TableLoader: Dataset is empty");
    assert!(!stages.lock().unwrap().contains(&CleaningStage::ScoringBefore));
}

#[test]
fn test_scenario_e_constant_column_is_kept() {
    let source = "id,c\n1,5\n2,5\n3,5\n";

    let capped = clean(TableSource::csv(source), config_with_policy(OutlierPolicy::Cap)).unwrap();
    assert_eq!(floats(&capped.table, "c"), vec![Some(5.0); 3]);

    let removed =
        clean(TableSource::csv(source), config_with_policy(OutlierPolicy::Remove)).unwrap();
    assert_eq!(removed.table.height(), 3);
}

#[test]
fn test_scenario_e_off_point_is_capped_or_removed() {
    let source = "id,c\n1,5\n2,5\n3,5\n4,5\n5,6\n";

    let capped = clean(TableSource::csv(source), config_with_policy(OutlierPolicy::Cap)).unwrap();
    assert_eq!(floats(&capped.table, "c"), vec![Some(5.0); 5]);
    assert_eq!(capped.report.outliers[1].affected, 1);

    let removed =
        clean(TableSource::csv(source), config_with_policy(OutlierPolicy::Remove)).unwrap();
    assert_eq!(floats(&removed.table, "c"), vec![Some(5.0); 4]);
    assert_eq!(
        floats(&removed.table, "id"),
        vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
    );
}

#[test]
fn test_constant_fraction_column_is_mean_imputed() {
    // The mean of three 0.1s carries rounding error; the column is still symmetric
    let source = TableSource::csv("id,v\n1,0.1\n2,0.1\n3,0.1\n4,\n");
    let result = clean(source, CleaningConfig::default()).unwrap();

    let imputation = &result.report.imputations[0];
    assert_eq!(imputation.column, "v");
    assert_eq!(imputation.strategy, ImputationStrategy::Mean);
    assert_eq!(imputation.filled, 1);
}

#[test]
fn test_extreme_values_survive_outlier_treatment() {
    let source = "id,v\n1,-1e308\n2,1e308\n";

    for policy in [OutlierPolicy::Cap, OutlierPolicy::Remove] {
        let result = clean(TableSource::csv(source), config_with_policy(policy)).unwrap();
        assert_eq!(floats(&result.table, "v"), vec![Some(-1e308), Some(1e308)]);
    }
}

// ============================================================================
// Scoring and summary
// ============================================================================

#[test]
fn test_dqi_and_summary_for_orders() {
    let result = clean(fixture("orders.csv"), CleaningConfig::default()).unwrap();

    // Missing rate (0 + 0 + 0.5) / 3, duplicate rate 1 / 4
    assert_eq!(result.dqi_before, 58.33);
    assert_eq!(result.dqi_after, 100.0);
    assert_eq!(result.report.duplicates_removed, 1);
    assert_eq!(result.report.missing_values_resolved, 1);
    assert_eq!(result.table.height(), 3);
    assert_eq!(
        result.summary,
        "The dataset originally contained 4 records across 3 attributes. \
         1 missing values were resolved. \
         1 duplicate rows were removed. \
         The Data Quality Index moved from 58.33% to 100.00%. \
         The dataset is now structurally and statistically reliable and ready for downstream use."
    );
}

#[test]
fn test_clean_table_scores_the_same_before_and_after() {
    let result = clean(fixture("outliers.csv"), CleaningConfig::default()).unwrap();
    assert_eq!(result.dqi_before, 100.0);
    assert_eq!(result.dqi_after, 100.0);
    assert_eq!(result.report.dqi_change(), 0.0);
    assert!(!result.summary.contains("missing values were resolved"));
    assert!(!result.summary.contains("duplicate rows were removed"));
}

#[test]
fn test_runs_are_deterministic() {
    let first = clean(fixture("orders.csv"), CleaningConfig::default()).unwrap();
    let second = clean(fixture("orders.csv"), CleaningConfig::default()).unwrap();

    assert_eq!(first.table, second.table);
    assert_eq!(first.dqi_before, second.dqi_before);
    assert_eq!(first.dqi_after, second.dqi_after);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn test_no_missing_cells_after_cleaning() {
    for name in ["orders.csv", "cities.csv", "outliers.csv"] {
        let result = clean(fixture(name), CleaningConfig::default()).unwrap();
        for col in result.table.get_columns() {
            assert_eq!(col.null_count(), 0, "{} / {}", name, col.name());
        }
    }
}

// ============================================================================
// Outlier policies and imputation modes
// ============================================================================

#[test]
fn test_capping_keeps_row_count() {
    let result = clean(fixture("outliers.csv"), config_with_policy(OutlierPolicy::Cap)).unwrap();

    assert_eq!(result.table.height(), 6);
    // amount quartiles 10.25 / 12.75, upper bound 16.5
    let amounts = floats(&result.table, "amount");
    assert_eq!(amounts[5], Some(16.5));
}

#[test]
fn test_removal_drops_outlier_rows() {
    let result =
        clean(fixture("outliers.csv"), config_with_policy(OutlierPolicy::Remove)).unwrap();

    assert_eq!(result.table.height(), 5);
    assert_eq!(result.report.rows_removed(), 1);
    assert!(floats(&result.table, "amount").iter().all(|v| *v != Some(500.0)));
}

#[test]
fn test_fixed_mode_fills_unknown_for_categories() {
    let config = CleaningConfig::builder()
        .imputation_mode(ImputationMode::Fixed)
        .build()
        .unwrap();
    let result = clean(fixture("cities.csv"), config).unwrap();

    assert_eq!(texts(&result.table, "city")[4], Some("unknown".to_string()));
    assert_eq!(
        result.report.imputations[0].strategy,
        ImputationStrategy::Unknown
    );
}

// ============================================================================
// Inputs and outputs
// ============================================================================

#[test]
fn test_unsupported_extension_is_rejected() {
    let err = TableSource::from_path(fixtures_path().join("orders.xlsx")).unwrap_err();
    assert!(matches!(err, CleaningError::UnsupportedFormat(_)));
    assert!(err.is_input_error());
}

#[test]
fn test_malformed_csv_names_the_loader() {
    let err = clean(
        TableSource::csv("a,b\n1,2\n3,4,5\n"),
        CleaningConfig::default(),
    )
    .unwrap_err();

    assert_eq!(err.stage(), Some(CleaningStage::Loading));
    assert_eq!(err.error_code(), "MALFORMED_TABLE");
    assert!(err.to_string().starts_with("failed during TableLoader: Malformed table"));
}

#[test]
fn test_short_csv_row_is_malformed() {
    let err = clean(TableSource::csv("a,b\n1,2\n3\n"), CleaningConfig::default()).unwrap_err();

    assert_eq!(err.stage(), Some(CleaningStage::Loading));
    assert_eq!(err.error_code(), "MALFORMED_TABLE");
}

#[test]
fn test_duplicates_compare_raw_text() {
    let result = clean(TableSource::csv("id,label\n1,x\n1.0,x\n"), CleaningConfig::default())
        .unwrap();

    assert_eq!(result.report.duplicates_removed, 0);
    assert_eq!(result.table.height(), 2);
}

#[test]
fn test_clean_rejects_plots_without_renderer() {
    let config = CleaningConfig::builder().generate_plots(true).build().unwrap();
    let err = clean(fixture("outliers.csv"), config).unwrap_err();

    assert!(matches!(err, CleaningError::InvalidConfig(_)));
    assert_eq!(err.error_code(), "INVALID_CONFIG");
}

#[test]
fn test_saved_table_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut result = clean(fixture("prices.csv"), CleaningConfig::default()).unwrap();

    let storage = LocalStorage::new(dir.path().join("out"));
    let path = storage
        .save(&mut result.table, &LocalStorage::cleaned_file_name("prices"))
        .unwrap();
    assert!(path.ends_with("cleaned_prices.csv"));

    let bytes = storage.load_bytes(&path).unwrap();
    let reloaded = TableLoader::new().load(&TableSource::csv(bytes)).unwrap();
    let reloaded = TypeNormalizer::default().normalize(reloaded).unwrap();

    assert_eq!(reloaded.column("price").unwrap().dtype(), &DataType::Float64);
    assert_eq!(floats(&reloaded, "price"), floats(&result.table, "price"));
}

#[test]
fn test_progress_is_reported_in_order() {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = updates.clone();

    CleaningPipeline::builder()
        .on_progress(move |update| updates_clone.lock().unwrap().push(update))
        .build()
        .unwrap()
        .run(&fixture("orders.csv"))
        .unwrap();

    let updates = updates.lock().unwrap();
    assert_eq!(updates.first().map(|u| u.stage), Some(CleaningStage::Loading));
    assert_eq!(updates.last().map(|u| u.stage), Some(CleaningStage::Complete));
    assert!(updates.windows(2).all(|w| w[0].progress <= w[1].progress + 1e-6));
    assert!(updates.iter().all(|u| u.stage != CleaningStage::Plotting));
}

#[test]
fn test_plots_written_for_numeric_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = CleaningConfig::builder().generate_plots(true).build().unwrap();
    let renderer = PngPlotRenderer::new(dir.path().join("plots")).with_size(200, 120);

    let result = CleaningPipeline::builder()
        .config(config)
        .plot_renderer(Arc::new(renderer))
        .build()
        .unwrap()
        .run(&fixture("outliers.csv"))
        .unwrap();

    assert_eq!(
        result.plot_refs,
        vec![
            "plots/id.png".to_string(),
            "plots/amount.png".to_string(),
            "plots/boxplot.png".to_string(),
        ]
    );
    assert!(dir.path().join("plots/id.png").exists());
    assert!(dir.path().join("plots/amount.png").exists());
    assert!(dir.path().join("plots/boxplot.png").exists());
}

#[test]
fn test_report_serializes_to_json() {
    let result = clean(fixture("orders.csv"), CleaningConfig::default()).unwrap();
    let json = serde_json::to_value(&result.report).unwrap();

    assert_eq!(json["rows_before"], 4);
    assert_eq!(json["duplicates_removed"], 1);
    assert_eq!(json["imputations"][0]["strategy"], "median");
    assert!(json["numeric_summaries"].as_array().unwrap().len() >= 2);
}
