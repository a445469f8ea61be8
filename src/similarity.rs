use std::collections::HashMap;

/// Sparse term-frequency vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: HashMap<String, f64>,
}

impl TermVector {
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vector = Self::default();
        for term in terms {
            vector.add(term.as_ref(), 1.0);
        }
        vector
    }

    /// Character trigrams of a word, padded so short words still produce grams.
    pub fn from_trigrams(word: &str) -> Self {
        Self::from_terms(char_trigrams(word))
    }

    pub fn add(&mut self, term: &str, weight: f64) {
        *self.weights.entry(term.to_lowercase()).or_insert(0.0) += weight;
    }

    pub fn merge(&mut self, other: &TermVector) {
        for (term, weight) in &other.weights {
            *self.weights.entry(term.clone()).or_insert(0.0) += weight;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    pub fn cosine(&self, other: &TermVector) -> f64 {
        let (small, large) = if self.weights.len() <= other.weights.len() {
            (self, other)
        } else {
            (other, self)
        };

        let dot: f64 = small
            .weights
            .iter()
            .filter_map(|(term, w)| large.weights.get(term).map(|o| w * o))
            .sum();
        if dot == 0.0 {
            return 0.0;
        }

        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            0.0
        } else {
            (dot / denom).min(1.0)
        }
    }
}

pub fn char_trigrams(word: &str) -> Vec<String> {
    let padded: Vec<char> = format!("  {}  ", word.to_lowercase()).chars().collect();
    padded
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .filter(|g| !g.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let a = TermVector::from_terms(["gpu", "cloud", "gpu"]);
        let b = TermVector::from_terms(["GPU", "Cloud", "gpu"]);
        assert!((a.cosine(&b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_vectors() {
        let a = TermVector::from_terms(["ufc", "perth"]);
        let b = TermVector::from_terms(["gpu", "cloud"]);
        assert_eq!(a.cosine(&b), 0.0);
        assert_eq!(a.cosine(&TermVector::default()), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let a = TermVector::from_terms(["fight", "traffic", "scale"]);
        let b = TermVector::from_terms(["scale", "autoscale", "elastic"]);
        let sim = a.cosine(&b);
        assert!(sim > 0.3 && sim < 0.4, "got {sim}");
    }

    #[test]
    fn test_trigrams() {
        let grams = char_trigrams("ai");
        assert_eq!(grams, vec!["  a", " ai", "ai ", "i  "]);
        let a = TermVector::from_trigrams("inference");
        let b = TermVector::from_trigrams("inferencing");
        assert!(a.cosine(&b) > 0.6);
    }
}
