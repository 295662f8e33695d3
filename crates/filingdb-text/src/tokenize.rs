//! Term normalization shared by index build and query time.

use std::collections::HashSet;
use std::sync::OnceLock;

use filingdb_core::TermPolicy;

const STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	"i","me","my","we","our","you","your","been","being","were","into","about","over","any","all","also","each","such","other","only","own","same","too","very","s","t",
];

fn stop_words() -> &'static HashSet<&'static str> {
	static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
	SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(word: &str) -> bool {
	stop_words().contains(word)
}

/// Lowercases, splits on non-alphanumeric characters, optionally drops stop
/// words, then emits word n-grams of length `1..=policy.max_ngram` joined by
/// a single space.
pub fn tokenize(text: &str, policy: &TermPolicy) -> Vec<String> {
	let lowered = text.to_lowercase();
	let words: Vec<&str> = lowered
		.split(|c: char| !c.is_alphanumeric())
		.filter(|w| !w.is_empty())
		.filter(|w| !policy.stop_words || !is_stop_word(w))
		.collect();

	let max_ngram = policy.max_ngram.max(1);
	let mut terms: Vec<String> = words.iter().map(|w| (*w).to_string()).collect();
	for n in 2..=max_ngram {
		terms.extend(words.windows(n).map(|gram| gram.join(" ")));
	}
	terms
}
