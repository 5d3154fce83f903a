//! Leadership potential model.
//!
//! Two-stage transform over three profile features: per-feature
//! standardization fitted on the training set, then logistic regression.
//! Predictions are deterministic and reproducible; the fitted model
//! serializes to JSON and is loaded once at startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw feature vector for one employee. `promotions` is position-history
/// rows minus one and is fed to the model unclamped so predictions match the
/// fitted pipeline; only the displayed factor text clamps at zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadershipFeatures {
    pub tenure_days: i64,
    pub promotions: i64,
    pub skill_count: i64,
}

impl LeadershipFeatures {
    fn to_vector(self) -> [f64; FEATURE_DIM] {
        [self.tenure_days as f64, self.promotions as f64, self.skill_count as f64]
    }
}

/// Labeled training row. `is_leader` derives from the job title upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub features: LeadershipFeatures,
    pub is_leader: bool,
}

/// Score plus the human-readable positive factors shown alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadershipAssessment {
    pub score: u8,
    pub factors: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot train on an empty dataset")]
    EmptyTrainingSet,
    #[error("model deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),
}

const FEATURE_DIM: usize = 3;

const LEARNING_RATE: f64 = 0.1;
const EPOCHS: usize = 1000;
const REGULARIZATION: f64 = 0.01;

/// Per-feature standardization fitted on the training set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub means: [f64; FEATURE_DIM],
    pub std_devs: [f64; FEATURE_DIM],
}

impl FeatureScaler {
    fn fit(rows: &[[f64; FEATURE_DIM]]) -> Self {
        let n = rows.len() as f64;
        let mut means = [0.0; FEATURE_DIM];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value / n;
            }
        }

        let mut std_devs = [0.0; FEATURE_DIM];
        for row in rows {
            for j in 0..FEATURE_DIM {
                std_devs[j] += (row[j] - means[j]).powi(2) / n;
            }
        }
        for std_dev in &mut std_devs {
            *std_dev = std_dev.sqrt();
            // Constant features would otherwise divide by zero.
            if *std_dev < f64::EPSILON {
                *std_dev = 1.0;
            }
        }

        Self { means, std_devs }
    }

    fn transform(&self, row: [f64; FEATURE_DIM]) -> [f64; FEATURE_DIM] {
        let mut scaled = [0.0; FEATURE_DIM];
        for j in 0..FEATURE_DIM {
            scaled[j] = (row[j] - self.means[j]) / self.std_devs[j];
        }
        scaled
    }
}

/// Fitted standardize-then-classify pipeline with version metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeadershipModel {
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub scaler: FeatureScaler,
    pub weights: [f64; FEATURE_DIM],
    pub intercept: f64,
    pub accuracy: f64,
    pub training_samples: usize,
}

impl LeadershipModel {
    fn sigmoid(z: f64) -> f64 {
        let z = z.clamp(-500.0, 500.0);
        1.0 / (1.0 + (-z).exp())
    }

    /// Class-1 ("leader") probability in [0, 1].
    pub fn predict_probability(&self, features: LeadershipFeatures) -> f64 {
        let x = self.scaler.transform(features.to_vector());
        let z: f64 =
            self.intercept + self.weights.iter().zip(x.iter()).map(|(w, xi)| w * xi).sum::<f64>();
        Self::sigmoid(z)
    }

    /// Probability scaled to an integer score in [0, 100].
    pub fn score(&self, features: LeadershipFeatures) -> u8 {
        (self.predict_probability(features) * 100.0).round().clamp(0.0, 100.0) as u8
    }

    pub fn assess(&self, features: LeadershipFeatures) -> LeadershipAssessment {
        let years = features.tenure_days / 365;
        let promotions_display = features.promotions.max(0);
        LeadershipAssessment {
            score: self.score(features),
            factors: vec![
                format!(
                    "{years} {} with the company",
                    if years == 1 { "year" } else { "years" }
                ),
                format!(
                    "{promotions_display} {}",
                    if promotions_display == 1 { "promotion" } else { "promotions" }
                ),
                format!(
                    "{} recorded {}",
                    features.skill_count,
                    if features.skill_count == 1 { "skill" } else { "skills" }
                ),
            ],
        }
    }

    /// Fit the scaler on the dataset, then train the classifier with batch
    /// gradient descent and L2 regularization. Returns training accuracy.
    pub fn train(version: impl Into<String>, samples: &[TrainingSample]) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let raw: Vec<[f64; FEATURE_DIM]> =
            samples.iter().map(|s| s.features.to_vector()).collect();
        let scaler = FeatureScaler::fit(&raw);
        let x: Vec<[f64; FEATURE_DIM]> = raw.into_iter().map(|row| scaler.transform(row)).collect();
        let y: Vec<f64> =
            samples.iter().map(|s| if s.is_leader { 1.0 } else { 0.0 }).collect();
        let n = samples.len() as f64;

        let mut weights = [0.0; FEATURE_DIM];
        let mut intercept = 0.0;

        for _ in 0..EPOCHS {
            let mut gradients = [0.0; FEATURE_DIM];
            let mut intercept_gradient = 0.0;

            for (xi, yi) in x.iter().zip(y.iter()) {
                let z: f64 =
                    intercept + weights.iter().zip(xi.iter()).map(|(w, v)| w * v).sum::<f64>();
                let error = Self::sigmoid(z) - yi;
                intercept_gradient += error;
                for j in 0..FEATURE_DIM {
                    gradients[j] += error * xi[j];
                }
            }

            intercept -= LEARNING_RATE * intercept_gradient / n;
            for j in 0..FEATURE_DIM {
                weights[j] -= LEARNING_RATE * (gradients[j] / n + REGULARIZATION * weights[j]);
            }
        }

        let mut model = Self {
            version: version.into(),
            trained_at: Utc::now(),
            scaler,
            weights,
            intercept,
            accuracy: 0.0,
            training_samples: samples.len(),
        };
        model.accuracy = model.compute_accuracy(samples);
        Ok(model)
    }

    fn compute_accuracy(&self, samples: &[TrainingSample]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let correct = samples
            .iter()
            .filter(|s| (self.predict_probability(s.features) >= 0.5) == s.is_leader)
            .count();
        correct as f64 / samples.len() as f64
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{LeadershipFeatures, LeadershipModel, ModelError, TrainingSample};

    fn separable_dataset() -> Vec<TrainingSample> {
        let mut samples = Vec::new();
        // Leaders: long tenure, several promotions, broad skill sets.
        for i in 0..30i64 {
            samples.push(TrainingSample {
                features: LeadershipFeatures {
                    tenure_days: 2500 + i * 40,
                    promotions: 2 + i % 3,
                    skill_count: 8 + i % 5,
                },
                is_leader: true,
            });
        }
        // Non-leaders: recent hires with few skills.
        for i in 0..30i64 {
            samples.push(TrainingSample {
                features: LeadershipFeatures {
                    tenure_days: 200 + i * 20,
                    promotions: i % 2,
                    skill_count: 1 + i % 3,
                },
                is_leader: false,
            });
        }
        samples
    }

    #[test]
    fn training_separates_obvious_classes() {
        let model = LeadershipModel::train("v1-test", &separable_dataset()).expect("train");
        assert!(model.accuracy >= 0.9, "accuracy {} should be >= 0.9", model.accuracy);

        let leader = LeadershipFeatures { tenure_days: 3600, promotions: 4, skill_count: 12 };
        let newcomer = LeadershipFeatures { tenure_days: 90, promotions: 0, skill_count: 1 };
        assert!(model.predict_probability(leader) > model.predict_probability(newcomer));
    }

    #[test]
    fn score_is_always_within_bounds() {
        let model = LeadershipModel::train("v1-test", &separable_dataset()).expect("train");
        let extremes = [
            LeadershipFeatures { tenure_days: 0, promotions: -1, skill_count: 0 },
            LeadershipFeatures { tenure_days: 20_000, promotions: 15, skill_count: 60 },
        ];
        for features in extremes {
            let score = model.score(features);
            assert!(score <= 100);
        }
    }

    #[test]
    fn factors_clamp_displayed_promotions_but_not_the_feature() {
        let model = LeadershipModel::train("v1-test", &separable_dataset()).expect("train");
        let single_row_history =
            LeadershipFeatures { tenure_days: 730, promotions: -1, skill_count: 4 };

        let assessment = model.assess(single_row_history);
        assert_eq!(assessment.factors[0], "2 years with the company");
        assert_eq!(assessment.factors[1], "0 promotions");
        assert_eq!(assessment.factors[2], "4 recorded skills");

        // The raw feature still reaches the classifier unclamped.
        let clamped = LeadershipFeatures { promotions: 0, ..single_row_history };
        assert_ne!(
            model.predict_probability(single_row_history),
            model.predict_probability(clamped)
        );
    }

    #[test]
    fn empty_training_set_is_rejected() {
        assert!(matches!(
            LeadershipModel::train("v1-test", &[]),
            Err(ModelError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn json_round_trip_preserves_predictions() {
        let model = LeadershipModel::train("v1-test", &separable_dataset()).expect("train");
        let restored =
            LeadershipModel::from_json(&model.to_json().expect("serialize")).expect("deserialize");

        let probe = LeadershipFeatures { tenure_days: 1500, promotions: 1, skill_count: 6 };
        assert_eq!(model.predict_probability(probe), restored.predict_probability(probe));
        assert_eq!(restored.version, "v1-test");
    }

    #[test]
    fn constant_feature_does_not_produce_nan() {
        let samples: Vec<TrainingSample> = (0..10)
            .map(|i| TrainingSample {
                features: LeadershipFeatures {
                    tenure_days: 1000,
                    promotions: i % 3,
                    skill_count: i,
                },
                is_leader: i > 4,
            })
            .collect();

        let model = LeadershipModel::train("v1-test", &samples).expect("train");
        let probability = model
            .predict_probability(LeadershipFeatures { tenure_days: 1000, promotions: 1, skill_count: 3 });
        assert!(probability.is_finite());
    }
}
