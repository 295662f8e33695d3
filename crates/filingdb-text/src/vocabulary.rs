use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};

use filingdb_core::TermPolicy;

use crate::tokenize::tokenize;

/// Term to dense column mapping. Columns are `0..len()` with no gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
	terms: Vec<String>,
	columns: HashMap<String, u32>,
}

impl Vocabulary {
	/// `terms[i]` becomes column `i`.
	pub fn from_terms(terms: Vec<String>) -> Result<Self, String> {
		let mut columns = HashMap::with_capacity(terms.len());
		for (i, term) in terms.iter().enumerate() {
			let column = u32::try_from(i).map_err(|_| "vocabulary exceeds u32 columns".to_string())?;
			if columns.insert(term.clone(), column).is_some() {
				return Err(format!("duplicate vocabulary term {term:?}"));
			}
		}
		Ok(Self { terms, columns })
	}

	/// For term lists already known to be distinct, such as map keys.
	fn from_distinct(terms: Vec<String>) -> Self {
		let columns = terms.iter().cloned().zip(0u32..).collect();
		Self { terms, columns }
	}

	pub fn column(&self, term: &str) -> Option<u32> {
		self.columns.get(term).copied()
	}

	pub fn term(&self, column: u32) -> Option<&str> {
		self.terms.get(column as usize).map(String::as_str)
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}
}

// Persisted as the column-ordered term list; the lookup map is rebuilt on load.
impl Serialize for Vocabulary {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.terms.serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for Vocabulary {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let terms = Vec::<String>::deserialize(deserializer)?;
		Vocabulary::from_terms(terms).map_err(serde::de::Error::custom)
	}
}

/// Sparse weighted term vector, sorted by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
	indices: Vec<u32>,
	weights: Vec<f32>,
}

impl SparseVector {
	/// Builds a vector from column-sorted entries; zero weights are dropped.
	pub fn from_sorted(entries: impl IntoIterator<Item = (u32, f32)>) -> Self {
		let (indices, weights) = entries.into_iter().filter(|(_, w)| *w > 0.0).unzip();
		Self { indices, weights }
	}

	pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
		self.indices.iter().copied().zip(self.weights.iter().copied())
	}

	pub fn len(&self) -> usize {
		self.indices.len()
	}

	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}

	pub fn weight(&self, column: u32) -> f32 {
		self.indices.binary_search(&column).map_or(0.0, |i| self.weights[i])
	}

	pub fn norm(&self) -> f32 {
		self.weights.iter().map(|&w| f64::from(w) * f64::from(w)).sum::<f64>().sqrt() as f32
	}

	pub fn dot(&self, other: &SparseVector) -> f32 {
		let (mut i, mut j) = (0, 0);
		let mut sum = 0.0f64;
		while i < self.indices.len() && j < other.indices.len() {
			match self.indices[i].cmp(&other.indices[j]) {
				std::cmp::Ordering::Less => i += 1,
				std::cmp::Ordering::Greater => j += 1,
				std::cmp::Ordering::Equal => {
					sum += f64::from(self.weights[i]) * f64::from(other.weights[j]);
					i += 1;
					j += 1;
				}
			}
		}
		sum as f32
	}

	/// Structural check for vectors read back from disk.
	pub fn validate(&self, dimensions: usize) -> Result<(), String> {
		if self.indices.len() != self.weights.len() {
			return Err(format!("{} indices but {} weights", self.indices.len(), self.weights.len()));
		}
		if self.indices.windows(2).any(|w| w[0] >= w[1]) {
			return Err("column indices are not strictly increasing".to_string());
		}
		if let Some(&last) = self.indices.last() {
			if last as usize >= dimensions {
				return Err(format!("column {last} is outside a vocabulary of {dimensions} terms"));
			}
		}
		if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
			return Err("weights must be finite and non-negative".to_string());
		}
		Ok(())
	}
}

/// `ln((1 + n) / (1 + df)) + 1`, smoothed so no term ever weighs zero.
pub fn smoothed_idf(n_texts: usize, df: usize) -> f32 {
	(((1 + n_texts) as f64 / (1 + df) as f64).ln() + 1.0) as f32
}

/// Derives the vocabulary and per-column IDF weights from the whole corpus.
///
/// Columns follow lexicographic term order so two builds over the same corpus
/// produce identical indexes. With `max_features`, only the most frequent
/// terms (total occurrences, ties by term) are kept.
pub fn build_vocabulary<'a, I>(texts: I, policy: &TermPolicy) -> (Vocabulary, Vec<f32>)
where
	I: IntoIterator<Item = &'a str>,
{
	// term -> (document frequency, total occurrences)
	let mut stats: HashMap<String, (usize, u64)> = HashMap::new();
	let mut n_texts = 0usize;
	for text in texts {
		n_texts += 1;
		let mut seen = HashSet::new();
		for term in tokenize(text, policy) {
			let first_in_text = seen.insert(term.clone());
			let entry = stats.entry(term).or_insert((0, 0));
			entry.1 += 1;
			if first_in_text {
				entry.0 += 1;
			}
		}
	}

	let mut entries: Vec<(String, (usize, u64))> = stats.into_iter().collect();
	if let Some(max) = policy.max_features {
		if entries.len() > max {
			entries.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then_with(|| a.0.cmp(&b.0)));
			entries.truncate(max);
		}
	}
	entries.sort_by(|a, b| a.0.cmp(&b.0));

	let idf = entries.iter().map(|(_, (df, _))| smoothed_idf(n_texts, *df)).collect();
	let terms = entries.into_iter().map(|(term, _)| term).collect();
	(Vocabulary::from_distinct(terms), idf)
}

/// Raw term count times IDF for every in-vocabulary term of `text`.
/// Out-of-vocabulary terms are ignored.
pub fn vectorize(text: &str, vocabulary: &Vocabulary, idf: &[f32], policy: &TermPolicy) -> SparseVector {
	let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
	for term in tokenize(text, policy) {
		if let Some(column) = vocabulary.column(&term) {
			*counts.entry(column).or_insert(0) += 1;
		}
	}
	SparseVector::from_sorted(counts.into_iter().map(|(column, count)| {
		let weight = idf.get(column as usize).copied().unwrap_or(0.0);
		(column, count as f32 * weight)
	}))
}
