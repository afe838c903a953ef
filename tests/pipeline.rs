//! End-to-end runs over a fake validation output tree.

use sepval::analysis::{self, discover, export_batch, ExportKind};
use sepval::report::json::JsonFigures;
use sepval::{box_plot_report, read_in_metrics, BoxReportOptions, ModelFilter, Quantity};
use std::fs;
use std::path::{Path, PathBuf};

const EK: &str = "min.10.0.max.-1.0.units.MeV";
const TK: &str = "threshold_10.0";

/// output/{pkl,csv} with one all clear and one max flux selections table,
/// a SPHINX dataframe and the observed profile it points at
fn build_tree(root: &Path) -> (PathBuf, PathBuf) {
    let out = root.join("output");
    fs::create_dir_all(out.join("pkl")).unwrap();
    fs::create_dir_all(out.join("csv")).unwrap();

    let profile = root.join("GOES-13_integral.txt");
    fs::write(&profile, "2017-09-10 16:00:00 0.5\n2017-09-10 16:05:00 15.0\n").unwrap();

    fs::write(
        out.join("csv/SPHINX_dataframe.csv"),
        format!(
            "Energy Channel Key,Threshold Key,Observed Time Profile\n{EK},{TK},{}\n",
            profile.display()
        ),
    )
    .unwrap();

    let all_clear = out.join(format!("pkl/all_clear_selections_SAWS-ASPECS_{EK}_{TK}.json"));
    let records = serde_json::json!([
        {"Model": "SAWS-ASPECS", "Energy Channel Key": EK, "Threshold Key": TK,
         "Prediction Window Start": "2017-09-10T00:00:00Z",
         "Observed SEP All Clear": false, "Predicted SEP All Clear": true, "Mismatch Allowed": false},
        {"Model": "SAWS-ASPECS", "Energy Channel Key": EK, "Threshold Key": TK,
         "Prediction Window Start": "2017-09-11T00:00:00Z",
         "Observed SEP All Clear": true, "Predicted SEP All Clear": true, "Mismatch Allowed": false},
        {"Model": "SAWS-ASPECS", "Energy Channel Key": EK, "Threshold Key": TK,
         "Prediction Window Start": "2017-09-12T00:00:00Z",
         "Observed SEP All Clear": null, "Predicted SEP All Clear": true, "Mismatch Allowed": false}
    ]);
    fs::write(&all_clear, serde_json::to_string(&records).unwrap()).unwrap();
    // Same table in the csv tree is ignored in favour of pkl
    fs::write(out.join(format!("csv/all_clear_selections_SAWS-ASPECS_{EK}_{TK}.csv")), "Model\n").unwrap();

    let max_flux = out.join(format!("csv/max_flux_in_pred_win_selections_UMASEP-10_{EK}_{TK}.csv"));
    fs::write(
        &max_flux,
        format!(
            "Model,Energy Channel Key,Threshold Key,Prediction Window Start,Observed Max Flux in Prediction Window,\
             Predicted SEP Peak Intensity Max (Max Flux),Predicted SEP Peak Intensity Max (Max Flux) Units\n\
             UMASEP-10,{EK},{TK},2017-09-10 12:00:00,120.0,3.0,pfu\n\
             UMASEP-10,{EK},{TK},2017-09-11 12:00:00,0.4,25.0,pfu\n\
             UMASEP-10,{EK},{TK},2017-09-12 12:00:00,0.4,0.1,pfu\n"
        ),
    )
    .unwrap();

    (all_clear, max_flux)
}

#[test]
fn test_directory_export_writes_csvs_and_figures() {
    let dir = tempfile::tempdir().unwrap();
    let (all_clear, max_flux) = build_tree(dir.path());

    let files = discover(dir.path());
    assert_eq!(
        files,
        vec![
            (max_flux.clone(), ExportKind::MaxFluxInPredictionWindow),
            (all_clear.clone(), ExportKind::AllClear),
        ]
    );

    let results = export_batch(&files, 10.0, true, &JsonFigures, None);
    assert!(results.iter().all(|r| r.result.is_ok()));

    let out = dir.path().join("output");
    let csv = out.join("csv");

    // All clear: one miss, one correct negative, one skipped row
    let ac = results[1].result.as_ref().unwrap();
    assert_eq!(ac.counts.misses, 1);
    assert_eq!(ac.counts.correct_negatives, 1);
    assert_eq!(ac.counts.skipped, 1);
    let misses = csv.join(format!("all_clear_selections_SAWS-ASPECS_{EK}_{TK}_misses.csv"));
    assert_eq!(ac.written, vec![misses.clone()]);
    let text = fs::read_to_string(&misses).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().nth(1).unwrap().contains("2017-09-10T00:00:00Z"));

    // Max flux: one miss and one false alarm, exported false alarms first
    let mf = results[0].result.as_ref().unwrap();
    assert_eq!(
        mf.written,
        vec![
            csv.join(format!("max_flux_in_pred_win_selections_UMASEP-10_{EK}_{TK}_false_alarms.csv")),
            csv.join(format!("max_flux_in_pred_win_selections_UMASEP-10_{EK}_{TK}_misses.csv")),
        ]
    );

    // Figure specs land in output/plots with the observed flux attached
    let fig = out.join(format!("plots/all_clear_selections_SAWS-ASPECS_{EK}_{TK}_incorrect.json"));
    let spec: serde_json::Value = serde_json::from_str(&fs::read_to_string(fig).unwrap()).unwrap();
    assert_eq!(spec["kind"], "outcomes");
    assert_eq!(spec["title"], format!("All Clear SAWS-ASPECS ({EK}, {TK})"));
    assert_eq!(spec["series"][0]["label"], "Observed Flux");
    assert_eq!(spec["series"][0]["values"], serde_json::json!([0.5, 15.0]));
    assert_eq!(spec["series"][4]["values"], serde_json::json!([8.0]));

    let fig = out.join(format!("plots/max_flux_in_pred_win_selections_UMASEP-10_{EK}_{TK}_Outcomes.json"));
    let spec: serde_json::Value = serde_json::from_str(&fs::read_to_string(fig).unwrap()).unwrap();
    assert_eq!(spec["title"], format!("Max Flux UMASEP-10 ({EK}, {TK})"));
    assert_eq!(spec["series"][3]["values"], serde_json::json!([25.0]));
}

#[test]
fn test_output_dir_found_from_nested_table() {
    let dir = tempfile::tempdir().unwrap();
    let (all_clear, _) = build_tree(dir.path());
    assert_eq!(analysis::output_dir(&all_clear), dir.path().join("output"));
}

fn write_metrics(root: &Path) {
    let pkl = root.join("output/pkl");
    fs::create_dir_all(&pkl).unwrap();
    fs::write(
        pkl.join("all_clear_metrics.csv"),
        "Model,Energy Channel,Threshold,N (Total Number of Forecasts),Percent Correct,Bias,Hit Rate,False Alarm Rate,Frequency of Misses,Frequency of Hits\n\
         SAWS-ASPECS 0-24 hrs,ek10,tk10,120,0.9,1.1,0.5,0.1,0.5,0.6\n\
         SAWS-ASPECS 24-48 hrs,ek10,tk10,118,0.8,1.2,0.4,0.2,0.6,0.5\n\
         MAG4,ek10,tk10,40,0.7,0.9,0.3,0.3,0.7,0.4\n\
         UMASEP-10,ek10,tk10,80,0.6,1.0,0.2,0.4,0.8,0.3\n",
    )
    .unwrap();
}

#[test]
fn test_metrics_report_filters_and_isolates_groups() {
    let dir = tempfile::tempdir().unwrap();
    write_metrics(dir.path());

    let filter = ModelFilter::from_lists(
        &["ASPECS".to_string(), "MAG4".to_string()],
        &["24-48".to_string()],
    );
    let table = read_in_metrics(dir.path(), Quantity::AllClear, &filter).unwrap();
    assert_eq!(table.len(), 2);

    let summary = dir.path().join("summary");
    let percent = vec!["Percent Correct".to_string()];
    let options = BoxReportOptions {
        anonymous: true,
        highlight: "",
        percent_metrics: &percent,
        summary_dir: &summary,
    };
    let report = box_plot_report(&table, Quantity::AllClear, &options, &JsonFigures).unwrap();

    // Only group 2 has its columns in this table; the other four fail alone
    assert_eq!(report.figures, vec![summary.join("All Clear_ek10_tk10_boxes_Group2_anon")]);
    let failed: Vec<usize> = report.failures.iter().map(|f| f.group).collect();
    assert_eq!(failed, vec![1, 3, 4, 5]);

    let csv = fs::read_to_string(summary.join("All Clear_ek10_tk10_boxes_Group2_anon.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Metrics,Models,Values"));
    assert_eq!(lines.next(), Some("Percent Correct,Model 0,90.0"));
    assert_eq!(lines.next(), Some("Percent Correct,Model 1,70.0"));

    let spec: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(summary.join("All Clear_ek10_tk10_boxes_Group2_anon.json")).unwrap())
            .unwrap();
    assert_eq!(spec["kind"], "boxes");
    assert_eq!(spec["title"], "All Clear Group 2 (ek10, tk10)");
}

#[test]
fn test_metrics_highlight_buckets_other_models() {
    let dir = tempfile::tempdir().unwrap();
    write_metrics(dir.path());

    let table = read_in_metrics(dir.path(), Quantity::AllClear, &ModelFilter::default()).unwrap();
    let summary = dir.path().join("summary");
    let options = BoxReportOptions {
        anonymous: false,
        highlight: "MAG4",
        percent_metrics: &[],
        summary_dir: &summary,
    };
    let report = box_plot_report(&table, Quantity::AllClear, &options, &JsonFigures).unwrap();
    assert_eq!(report.figures, vec![summary.join("All Clear_ek10_tk10_boxes_Group2_MAG4")]);

    let csv = fs::read_to_string(summary.join("All Clear_ek10_tk10_boxes_Group2_MAG4.csv")).unwrap();
    let labels: Vec<&str> = csv.lines().skip(1).map(|l| l.split(',').nth(1).unwrap()).collect();
    assert!(labels.iter().all(|l| *l == "Models" || *l == "MAG4 (40)"));
    assert_eq!(labels.iter().filter(|l| **l == "MAG4 (40)").count(), 6);
}

#[test]
fn test_unknown_quantity_is_fatal() {
    let err = Quantity::from_name("Peak Flux").unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("All Clear"));
}
