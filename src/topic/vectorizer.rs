//! TF-IDF weighting over tokenized documents.

use std::collections::{HashMap, HashSet};

/// Dense TF-IDF vectorizer with raw term counts and smoothed idf.
///
/// The vocabulary is sorted alphabetically so column order is stable across
/// runs over the same batch.
#[derive(Debug, Clone, Default)]
pub struct TfIdfVectorizer {
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the vocabulary and idf weights from `docs`.
    pub fn fit(&mut self, docs: &[Vec<String>]) {
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in docs {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(&str, usize)> = doc_freq.into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(b.0));

        let n = docs.len() as f64;
        self.vocabulary.clear();
        self.terms.clear();
        self.idf.clear();
        for (idx, (term, df)) in terms.into_iter().enumerate() {
            self.vocabulary.insert(term.to_string(), idx);
            self.terms.push(term.to_string());
            // smooth idf: ln(n / (1 + df)) + 1
            self.idf.push((n / (1.0 + df as f64)).ln() + 1.0);
        }
    }

    /// TF-IDF row for each document; terms outside the vocabulary are ignored.
    pub fn transform(&self, docs: &[Vec<String>]) -> Vec<Vec<f64>> {
        docs.iter()
            .map(|doc| {
                let mut row = vec![0.0; self.terms.len()];
                for term in doc {
                    if let Some(&idx) = self.vocabulary.get(term) {
                        row[idx] += 1.0;
                    }
                }
                for (value, idf) in row.iter_mut().zip(&self.idf) {
                    *value *= idf;
                }
                row
            })
            .collect()
    }

    pub fn fit_transform(&mut self, docs: &[Vec<String>]) -> Vec<Vec<f64>> {
        self.fit(docs);
        self.transform(docs)
    }

    pub fn term(&self, idx: usize) -> Option<&str> {
        self.terms.get(idx).map(String::as_str)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }
}

/// Cosine similarity of two equally sized vectors.
pub fn cosine_similarity(vec1: &[f64], vec2: &[f64]) -> anyhow::Result<f64> {
    if vec1.len() != vec2.len() {
        return Err(anyhow::anyhow!(
            "Vector dimensions don't match: {} vs {}",
            vec1.len(),
            vec2.len()
        ));
    }

    let mag1: f64 = vec1.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag2: f64 = vec2.iter().map(|x| x * x).sum::<f64>().sqrt();

    if mag1 < 1e-9 || mag2 < 1e-9 {
        return Err(anyhow::anyhow!("Zero magnitude vector detected"));
    }

    let dot_product: f64 = vec1.iter().zip(vec2.iter()).map(|(a, b)| a * b).sum();
    Ok(dot_product / (mag1 * mag2))
}
