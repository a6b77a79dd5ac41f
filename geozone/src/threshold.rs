//! Évaluation de seuils sur des mesures (vent, pluie, visibilité...)
//!
//! Une zone surveillée est active dès qu'un de ses seuils est franchi.
//! Les champs absents de l'échantillon sont ignorés.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opérateur de comparaison d'un seuil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl Condition {
    pub fn holds(self, value: f64, limit: f64) -> bool {
        match self {
            Condition::Greater => value > limit,
            Condition::GreaterOrEqual => value >= limit,
            Condition::Less => value < limit,
            Condition::LessOrEqual => value <= limit,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Greater => ">",
            Condition::GreaterOrEqual => ">=",
            Condition::Less => "<",
            Condition::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">" => Ok(Condition::Greater),
            ">=" => Ok(Condition::GreaterOrEqual),
            "<" => Ok(Condition::Less),
            "<=" => Ok(Condition::LessOrEqual),
            other => Err(format!("Unknown condition: {}", other)),
        }
    }
}

/// Seuil sur un champ de mesure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub condition: Condition,
    pub limit: f64,
}

/// Seuils indexés par nom de champ (ordre stable)
pub type Thresholds = BTreeMap<String, Threshold>;

/// Échantillon de mesures: nom de champ → valeur
pub type Sample = HashMap<String, f64>;

/// Retourne vrai si au moins un seuil est franchi.
///
/// Une valeur nulle est une mesure comme une autre: seuls les champs absents
/// ou non finis sont ignorés.
pub fn evaluate(sample: &Sample, thresholds: &Thresholds) -> bool {
    thresholds.iter().any(|(field, threshold)| {
        sample
            .get(field)
            .filter(|v| v.is_finite())
            .is_some_and(|v| threshold.condition.holds(*v, threshold.limit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        [
            (
                "wind_speed".to_string(),
                Threshold {
                    condition: Condition::Greater,
                    limit: 15.0,
                },
            ),
            (
                "distance".to_string(),
                Threshold {
                    condition: Condition::LessOrEqual,
                    limit: 1000.0,
                },
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_any_threshold_activates() {
        let sample: Sample = [("wind_speed".to_string(), 20.0)].into_iter().collect();
        assert!(evaluate(&sample, &thresholds()));

        let sample: Sample = [
            ("wind_speed".to_string(), 3.0),
            ("distance".to_string(), 800.0),
        ]
        .into_iter()
        .collect();
        assert!(evaluate(&sample, &thresholds()));
    }

    #[test]
    fn test_none_satisfied_deactivates() {
        let sample: Sample = [
            ("wind_speed".to_string(), 15.0),
            ("distance".to_string(), 5000.0),
        ]
        .into_iter()
        .collect();
        assert!(!evaluate(&sample, &thresholds()));
    }

    #[test]
    fn test_missing_and_nan_fields_skipped() {
        let sample: Sample = [
            ("precipitation".to_string(), 12.0),
            ("wind_speed".to_string(), f64::NAN),
        ]
        .into_iter()
        .collect();
        assert!(!evaluate(&sample, &thresholds()));
        assert!(!evaluate(&Sample::new(), &thresholds()));
    }

    #[test]
    fn test_zero_is_evaluated() {
        let freezing: Thresholds = [(
            "temp".to_string(),
            Threshold {
                condition: Condition::LessOrEqual,
                limit: 0.0,
            },
        )]
        .into_iter()
        .collect();

        let sample: Sample = [("temp".to_string(), 0.0)].into_iter().collect();
        assert!(evaluate(&sample, &freezing));

        let calm: Sample = [("wind_speed".to_string(), 0.0)].into_iter().collect();
        assert!(!evaluate(&calm, &thresholds()));
    }

    #[test]
    fn test_condition_parse_and_serde() {
        assert_eq!(">=".parse::<Condition>().unwrap(), Condition::GreaterOrEqual);
        assert!("==".parse::<Condition>().is_err());

        let t: Threshold = serde_json::from_str(r#"{"condition":"<","limit":2.5}"#).unwrap();
        assert_eq!(t.condition, Condition::Less);
        assert!(t.condition.holds(1.0, t.limit));
    }
}
