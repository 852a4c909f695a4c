//! Score-proportional target weights.
//!
//! Only strictly positive scores receive capital; each selected asset gets
//! `score / sum(selected scores)`. With no positive score the vector is all
//! zeros and the portfolio sits in cash. Entries keep the order of the
//! configured asset list and the normalising sum runs in that order, so the
//! same scores always produce bit-identical weights.

#[derive(Debug, Clone, PartialEq)]
pub struct TargetWeights {
    entries: Vec<(String, f64)>,
}

impl TargetWeights {
    pub fn zeros(codes: &[String]) -> Self {
        TargetWeights {
            entries: codes.iter().map(|c| (c.clone(), 0.0)).collect(),
        }
    }

    pub fn from_entries(entries: Vec<(String, f64)>) -> Self {
        TargetWeights { entries }
    }

    pub fn get(&self, code: &str) -> f64 {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(c, w)| (c.as_str(), *w))
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, w)| *w).collect()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_all_cash(&self) -> bool {
        self.entries.iter().all(|(_, w)| *w == 0.0)
    }
}

pub fn allocate(scores: &[(String, f64)]) -> TargetWeights {
    let total: f64 = scores
        .iter()
        .filter(|(_, s)| *s > 0.0)
        .map(|(_, s)| *s)
        .sum();

    if total <= 0.0 {
        return TargetWeights {
            entries: scores.iter().map(|(c, _)| (c.clone(), 0.0)).collect(),
        };
    }

    TargetWeights {
        entries: scores
            .iter()
            .map(|(c, s)| {
                let weight = if *s > 0.0 { s / total } else { 0.0 };
                (c.clone(), weight)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn scores(values: &[f64]) -> Vec<(String, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &s)| (format!("ETF{i}"), s))
            .collect()
    }

    #[test]
    fn proportional_to_positive_scores() {
        let weights = allocate(&scores(&[2.0, -0.5, 1.0]));
        assert_relative_eq!(weights.get("ETF0"), 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(weights.get("ETF1"), 0.0);
        assert_relative_eq!(weights.get("ETF2"), 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn all_non_positive_is_all_cash() {
        let weights = allocate(&scores(&[-0.1, -0.2, -0.05]));
        assert!(weights.is_all_cash());
        assert_eq!(weights.values(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_score_is_excluded() {
        let weights = allocate(&scores(&[0.0, 0.5]));
        assert_eq!(weights.get("ETF0"), 0.0);
        assert_relative_eq!(weights.get("ETF1"), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_score_is_excluded() {
        let weights = allocate(&scores(&[f64::NAN, 0.5]));
        assert_eq!(weights.get("ETF0"), 0.0);
        assert_relative_eq!(weights.get("ETF1"), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn keeps_input_order() {
        let weights = allocate(&scores(&[1.0, 3.0]));
        let codes: Vec<&str> = weights.iter().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["ETF0", "ETF1"]);
    }

    #[test]
    fn unknown_code_has_zero_weight() {
        let weights = allocate(&scores(&[1.0]));
        assert_eq!(weights.get("MISSING"), 0.0);
    }

    proptest! {
        #[test]
        fn weights_are_normalised(values in prop::collection::vec(-5.0..5.0_f64, 1..8)) {
            let weights = allocate(&scores(&values));
            let any_positive = values.iter().any(|&v| v > 0.0);

            for (_, w) in weights.iter() {
                prop_assert!(w >= 0.0);
                prop_assert!(w <= 1.0 + 1e-12);
            }
            if any_positive {
                prop_assert!((weights.sum() - 1.0).abs() < 1e-9);
            } else {
                prop_assert_eq!(weights.sum(), 0.0);
            }
        }

        #[test]
        fn allocation_is_deterministic(values in prop::collection::vec(-5.0..5.0_f64, 1..8)) {
            let first = allocate(&scores(&values));
            let second = allocate(&scores(&values));
            let a: Vec<u64> = first.values().iter().map(|w| w.to_bits()).collect();
            let b: Vec<u64> = second.values().iter().map(|w| w.to_bits()).collect();
            prop_assert_eq!(a, b);
        }
    }
}
