//! Metric groups displayed together
//!
//! Each forecasted quantity has a fixed layout of metric groups; every group
//! becomes one box plot. The metric names are the column headers of the
//! `<prefix>_metrics` tables.

use crate::error::{Error, Result};
use crate::quantity::Quantity;

/// Ordered metric column names shown in one figure
pub type MetricGroup = &'static [&'static str];

pub const ALL_CLEAR_GROUPS: &[MetricGroup] = &[
    &[
        "All Clear 'True Positives' (Hits)",
        "All Clear 'False Positives' (False Alarms)",
        "All Clear 'True Negatives' (Correct Negatives)",
        "All Clear 'False Negatives' (Misses)",
    ],
    &[
        "Percent Correct",
        "Bias",
        "Hit Rate",
        "False Alarm Rate",
        "Frequency of Misses",
        "Frequency of Hits",
    ],
    &[
        "Probability of Correct Negatives",
        "Frequency of Correct Negatives",
        "False Alarm Ratio",
        "Detection Failure Ratio",
        "Threat Score",
    ],
    &[
        "Gilbert Skill Score",
        "True Skill Statistic",
        "Heidke Skill Score",
        "Odds Ratio Skill Score",
        "Symmetric Extreme Dependency Score",
    ],
    &[
        "Number SEP Events Correctly Predicted",
        "Number SEP Events Missed",
        "Odds Ratio",
    ],
];

pub const PROBABILITY_GROUPS: &[MetricGroup] = &[&[
    "Brier Score",
    "Brier Skill Score",
    "Spearman Correlation Coefficient",
    "Area Under ROC Curve",
]];

pub const FLUX_GROUPS: &[MetricGroup] = &[
    &[
        "Linear Regression Slope",
        "Pearson Correlation Coefficient (Linear)",
        "Pearson Correlation Coefficient (Log)",
        "Spearman Correlation Coefficient (Linear)",
    ],
    &["Mean Error (ME)", "Median Error (MedE)"],
    &[
        "Mean Absolute Error (MAE)",
        "Median Absolute Error (MedAE)",
        "Root Mean Square Error (RMSE)",
    ],
    &["Mean Log Error (MLE)", "Median Log Error (MedLE)"],
    &[
        "Mean Absolute Log Error (MALE)",
        "Median Absolute Log Error (MedALE)",
        "Root Mean Square Log Error (RMSLE)",
    ],
    &[
        "Mean Percent Error (MPE)",
        "Mean Symmetric Percent Error (MSPE)",
        "Mean Symmetric Absolute Percent Error (SMAPE)",
    ],
    &[
        "Mean Absolute Percent Error (MAPE)",
        "Median Symmetric Accuracy (MdSA)",
        "Mean Accuracy Ratio (MAR)",
    ],
];

/// Metric groups for a quantity. Time quantities have none; quantities
/// without a layout (Advanced Warning Time, Duration) are an error.
pub fn groups_for(quantity: Quantity) -> Result<&'static [MetricGroup]> {
    match quantity {
        Quantity::AllClear => Ok(ALL_CLEAR_GROUPS),
        Quantity::Probability => Ok(PROBABILITY_GROUPS),
        q if q.is_flux() => Ok(FLUX_GROUPS),
        q if q.is_time() => Ok(&[]),
        q => Err(Error::NoMetricGroups {
            quantity: q.name().to_string(),
        }),
    }
}

/// Same as [`groups_for`] for a quantity given by display name.
pub fn groups_for_name(name: &str) -> Result<&'static [MetricGroup]> {
    groups_for(Quantity::from_name(name)?)
}
