//! TF-IDF vector space over the item texts of one snapshot.

use std::collections::{BTreeMap, BTreeSet};

use super::tokenize;

/// Dense term-weight vector over a model's vocabulary, with its Euclidean norm cached.
#[derive(Debug, Clone, PartialEq)]
pub struct TermVector {
    weights: Vec<f64>,
    norm: f64,
}

impl TermVector {
    fn from_weights(weights: Vec<f64>) -> Self {
        let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        Self { weights, norm }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Cosine similarity; 0.0 when either vector has zero norm.
    pub fn cosine(&self, other: &TermVector) -> f64 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(&other.weights)
            .map(|(a, b)| a * b)
            .sum();
        (dot / (self.norm * other.norm)).clamp(0.0, 1.0)
    }
}

/// Vocabulary plus smoothed inverse document frequencies.
///
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, so a term present in every text still weighs 1.
#[derive(Debug, Clone)]
pub struct VectorSpaceModel {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl VectorSpaceModel {
    /// Derives the model from `texts`; the vocabulary is the sorted union of their tokens.
    pub fn fit<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut documents = 0usize;
        for text in texts {
            documents += 1;
            let unique: BTreeSet<String> = tokenize(text).into_iter().collect();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let n = documents as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (position, (token, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(token, position);
        }

        Self { vocabulary, idf }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vocabulary.contains_key(token)
    }

    /// Encodes `text` into this space. Tokens outside the vocabulary are ignored.
    pub fn encode(&self, text: &str) -> TermVector {
        let mut weights = vec![0.0; self.vocabulary.len()];
        for token in tokenize(text) {
            if let Some(&slot) = self.vocabulary.get(&token) {
                weights[slot] += 1.0;
            }
        }
        for (weight, idf) in weights.iter_mut().zip(&self.idf) {
            *weight *= idf;
        }
        TermVector::from_weights(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_is_union_of_tokens() {
        let model = VectorSpaceModel::fit(["red apple", "green apple", "banana"]);
        assert_eq!(model.vocabulary_len(), 4);
        assert!(model.contains("apple"));
        assert!(model.contains("banana"));
        assert!(!model.contains("cherry"));
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let model = VectorSpaceModel::fit(["red apple", "green apple", "banana"]);
        let v = model.encode("red apple");
        let red = v.weights()[model.vocabulary["red"]];
        let apple = v.weights()[model.vocabulary["apple"]];
        assert!(red > apple, "red ({red}) should outweigh apple ({apple})");
    }

    #[test]
    fn term_frequency_scales_weight() {
        let model = VectorSpaceModel::fit(["apple", "banana"]);
        let once = model.encode("apple");
        let twice = model.encode("apple apple");
        let slot = model.vocabulary["apple"];
        assert!((twice.weights()[slot] - 2.0 * once.weights()[slot]).abs() < 1e-12);
    }

    #[test]
    fn term_in_every_text_keeps_nonzero_weight() {
        let model = VectorSpaceModel::fit(["apple pie", "apple juice"]);
        let v = model.encode("apple");
        assert!((v.weights()[model.vocabulary["apple"]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_vocabulary_query_has_zero_norm() {
        let model = VectorSpaceModel::fit(["apple", "banana"]);
        let v = model.encode("zebra quokka");
        assert_eq!(v.norm(), 0.0);
        assert_eq!(v.cosine(&model.encode("apple")), 0.0);
    }

    #[test]
    fn identical_text_has_cosine_one() {
        let model = VectorSpaceModel::fit(["red apple", "green apple", "banana"]);
        let a = model.encode("green apple");
        let b = model.encode("Green, APPLE!");
        assert!((a.cosine(&b) - 1.0).abs() < 1e-9);
    }
}
