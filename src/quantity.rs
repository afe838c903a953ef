//! Forecasted quantities
//!
//! Every results file written by the validation run is named after the
//! quantity it scores. The mapping from display name to file prefix is fixed:
//!
//! ```text
//! Quantity                        | File prefix
//! --------------------------------|---------------------------
//! All Clear                       | all_clear
//! Advanced Warning Time           | awt
//! Probability                     | probability
//! Threshold Crossing Time         | threshold_crossing_time
//! Start Time                      | start_time
//! End Time                        | end_time
//! Onset Peak Time                 | peak_intensity_time
//! Onset Peak                      | peak_intensity
//! Max Flux Time                   | peak_intensity_max_time
//! Max Flux                        | peak_intensity_max
//! Max Flux in Prediction Window   | max_flux_in_pred_win
//! Duration                        | duration
//! Fluence                         | fluence
//! Time Profile                    | time_profile
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    AllClear,
    AdvancedWarningTime,
    Probability,
    ThresholdCrossingTime,
    StartTime,
    EndTime,
    OnsetPeakTime,
    OnsetPeak,
    MaxFluxTime,
    MaxFlux,
    MaxFluxInPredictionWindow,
    Duration,
    Fluence,
    TimeProfile,
}

impl Quantity {
    pub const ALL: [Quantity; 14] = [
        Quantity::AllClear,
        Quantity::AdvancedWarningTime,
        Quantity::Probability,
        Quantity::ThresholdCrossingTime,
        Quantity::StartTime,
        Quantity::EndTime,
        Quantity::OnsetPeakTime,
        Quantity::OnsetPeak,
        Quantity::MaxFluxTime,
        Quantity::MaxFlux,
        Quantity::MaxFluxInPredictionWindow,
        Quantity::Duration,
        Quantity::Fluence,
        Quantity::TimeProfile,
    ];

    /// Display name as it appears in results tables and figure titles
    pub fn name(self) -> &'static str {
        match self {
            Quantity::AllClear => "All Clear",
            Quantity::AdvancedWarningTime => "Advanced Warning Time",
            Quantity::Probability => "Probability",
            Quantity::ThresholdCrossingTime => "Threshold Crossing Time",
            Quantity::StartTime => "Start Time",
            Quantity::EndTime => "End Time",
            Quantity::OnsetPeakTime => "Onset Peak Time",
            Quantity::OnsetPeak => "Onset Peak",
            Quantity::MaxFluxTime => "Max Flux Time",
            Quantity::MaxFlux => "Max Flux",
            Quantity::MaxFluxInPredictionWindow => "Max Flux in Prediction Window",
            Quantity::Duration => "Duration",
            Quantity::Fluence => "Fluence",
            Quantity::TimeProfile => "Time Profile",
        }
    }

    /// Prefix of the metrics and selections files for this quantity
    pub fn file_prefix(self) -> &'static str {
        match self {
            Quantity::AllClear => "all_clear",
            Quantity::AdvancedWarningTime => "awt",
            Quantity::Probability => "probability",
            Quantity::ThresholdCrossingTime => "threshold_crossing_time",
            Quantity::StartTime => "start_time",
            Quantity::EndTime => "end_time",
            Quantity::OnsetPeakTime => "peak_intensity_time",
            Quantity::OnsetPeak => "peak_intensity",
            Quantity::MaxFluxTime => "peak_intensity_max_time",
            Quantity::MaxFlux => "peak_intensity_max",
            Quantity::MaxFluxInPredictionWindow => "max_flux_in_pred_win",
            Quantity::Duration => "duration",
            Quantity::Fluence => "fluence",
            Quantity::TimeProfile => "time_profile",
        }
    }

    /// Look up a quantity by its display name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|q| q.name() == name)
            .ok_or_else(|| Error::UnknownQuantity {
                name: name.to_string(),
                valid: Self::ALL
                    .iter()
                    .map(|q| q.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Look up a quantity by display name and return its file prefix.
    pub fn prefix_for(name: &str) -> Result<&'static str> {
        Self::from_name(name).map(Quantity::file_prefix)
    }

    pub fn is_flux(self) -> bool {
        matches!(
            self,
            Quantity::OnsetPeak
                | Quantity::MaxFlux
                | Quantity::Fluence
                | Quantity::MaxFluxInPredictionWindow
                | Quantity::TimeProfile
        )
    }

    pub fn is_time(self) -> bool {
        matches!(
            self,
            Quantity::ThresholdCrossingTime
                | Quantity::StartTime
                | Quantity::EndTime
                | Quantity::OnsetPeakTime
                | Quantity::MaxFluxTime
        )
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // FILE PREFIX LOOKUP TESTS
    // ==========================================================================
    //
    // Metrics files are located as output/pkl/<prefix>_metrics.*, so every
    // quantity must map to exactly the prefix the validation run writes.
    // ==========================================================================

    #[test]
    fn test_prefix_examples() {
        assert_eq!(Quantity::prefix_for("All Clear").unwrap(), "all_clear");
        assert_eq!(Quantity::prefix_for("Max Flux").unwrap(), "peak_intensity_max");
        assert_eq!(Quantity::prefix_for("Time Profile").unwrap(), "time_profile");
        assert_eq!(
            Quantity::prefix_for("Max Flux in Prediction Window").unwrap(),
            "max_flux_in_pred_win"
        );
    }

    #[test]
    fn test_prefixes_are_unique() {
        let mut prefixes: Vec<_> = Quantity::ALL.iter().map(|q| q.file_prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), 14);
    }

    #[test]
    fn test_name_round_trip() {
        for q in Quantity::ALL {
            assert_eq!(q.name().parse::<Quantity>().unwrap(), q);
        }
    }

    #[test]
    fn test_unknown_quantity_is_error() {
        let err = Quantity::prefix_for("Peak Flux").unwrap_err();
        match err {
            Error::UnknownQuantity { name, valid } => {
                assert_eq!(name, "Peak Flux");
                assert!(valid.contains("All Clear"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_name_lookup_is_exact() {
        // No case folding or trimming: a near miss is still a config error
        assert!(Quantity::from_name("all clear").is_err());
        assert!(Quantity::from_name(" All Clear").is_err());
    }

    #[test]
    fn test_flux_and_time_kinds_are_disjoint() {
        for q in Quantity::ALL {
            assert!(!(q.is_flux() && q.is_time()), "{q} is both flux and time");
        }
        assert!(Quantity::Fluence.is_flux());
        assert!(Quantity::MaxFluxTime.is_time());
        assert!(!Quantity::AllClear.is_flux());
    }
}
