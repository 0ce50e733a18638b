//! Dense and sparse encoders: embedding HTTP client, keyword TF, citation patterns (§4.5).

use async_trait::async_trait;
use mcb_domain::constants::DEFAULT_DENSE_BATCH_SIZE;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{CitationEncoder, CitationEncoding, CitationFlags, DenseEncoder, KeywordEncoder};
use mcb_domain::value_objects::{DenseVector, SparseVector};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    vectors: Vec<Vec<f32>>,
}

/// Calls an external embedding backend in bounded batches, L2-normalizing
/// the result and retrying a failed batch one text at a time (§4.5).
pub struct HttpDenseEncoder {
    client: Client,
    base_url: String,
    dimensions: usize,
}

impl HttpDenseEncoder {
    #[must_use]
    pub fn new(base_url: String, dimensions: usize) -> Self {
        Self {
            client: Client::new(),
            base_url,
            dimensions,
        }
    }

    async fn embed_one_batch(&self, texts: &[String]) -> Result<Vec<DenseVector>> {
        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&serde_json::json!({ "texts": texts }))
            .send()
            .await
            .map_err(|e| Error::transient_with_source("embedding request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::transient(format!("embedding backend returned status {}", response.status())));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::component_failure("dense_encoder", format!("malformed embed response: {e}")))?;

        if parsed.vectors.len() != texts.len() {
            return Err(Error::component_failure(
                "dense_encoder",
                format!("embedding backend returned {} vectors for {} texts", parsed.vectors.len(), texts.len()),
            ));
        }

        if let Some(wrong) = parsed.vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(Error::component_failure(
                "dense_encoder",
                format!("embedding backend returned a {}-dimensional vector, expected {}", wrong.len(), self.dimensions),
            ));
        }

        Ok(parsed
            .vectors
            .into_iter()
            .map(|values| {
                let mut v = DenseVector(values);
                v.normalize();
                v
            })
            .collect())
    }
}

#[async_trait]
impl DenseEncoder for HttpDenseEncoder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<DenseVector>> {
        let mut out = Vec::with_capacity(texts.len());

        for batch in texts.chunks(DEFAULT_DENSE_BATCH_SIZE) {
            match self.embed_one_batch(batch).await {
                Ok(vectors) => out.extend(vectors),
                Err(_) => {
                    for text in batch {
                        let single = self.embed_one_batch(std::slice::from_ref(text)).await?;
                        out.extend(single);
                    }
                }
            }
        }

        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn token_hash(token: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() & 0xFFFF_FFFF) as u32
}

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "of", "to", "in", "on", "at", "for", "with", "by", "is", "was", "are",
        "were", "be", "been", "being", "this", "that", "these", "those", "it", "as", "from", "than", "then", "so",
        "not", "no", "if", "into", "such", "which", "who", "whom", "its", "their", "his", "her", "he", "she", "they",
        "we", "you", "i", "do", "does", "did", "has", "have", "had", "will", "would", "shall", "should", "can",
        "could", "may", "might", "must", "about", "above", "after", "again", "all", "also", "any", "because",
    ]
    .into_iter()
    .collect()
});

/// Lowercased, stopword-filtered term-frequency keyword encoder (§4.5).
pub struct StopwordKeywordEncoder;

impl KeywordEncoder for StopwordKeywordEncoder {
    fn encode(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for raw_word in text.split(|c: char| !c.is_alphanumeric()) {
            if raw_word.is_empty() {
                continue;
            }
            let lower = raw_word.to_lowercase();
            if STOPWORDS.contains(lower.as_str()) {
                continue;
            }
            *counts.entry(token_hash(&lower)).or_insert(0.0) += 1.0;
        }
        SparseVector::capped(counts)
    }
}

struct CitationPattern {
    regex: Regex,
    label: &'static str,
    marks_citation: bool,
    marks_monetary: bool,
    marks_date: bool,
}

static CITATION_PATTERNS: LazyLock<Vec<CitationPattern>> = LazyLock::new(|| {
    vec![
        CitationPattern {
            regex: Regex::new(r"\d+\s+[A-Z][a-zA-Z.]*\s*(?:2d|3d)?\s+\d+").expect("valid regex"),
            label: "case_citation",
            marks_citation: true,
            marks_monetary: false,
            marks_date: false,
        },
        CitationPattern {
            regex: Regex::new(r"(?i)\b\d+\s+U\.S\.C\.?\s*§+\s*\d+[a-z]?\b").expect("valid regex"),
            label: "statute_section",
            marks_citation: true,
            marks_monetary: false,
            marks_date: false,
        },
        CitationPattern {
            regex: Regex::new(r"\b[A-Z]{2,6}[-_]?\d{3,8}\b").expect("valid regex"),
            label: "bates_number",
            marks_citation: true,
            marks_monetary: false,
            marks_date: false,
        },
        CitationPattern {
            regex: Regex::new(r"\$\s?\d{1,3}(?:,\d{3})*(?:\.\d{2})?").expect("valid regex"),
            label: "monetary_amount",
            marks_citation: false,
            marks_monetary: true,
            marks_date: false,
        },
        CitationPattern {
            regex: Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").expect("valid regex"),
            label: "date_slash",
            marks_citation: false,
            marks_monetary: false,
            marks_date: true,
        },
        CitationPattern {
            regex: Regex::new(r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}\b")
                .expect("valid regex"),
            label: "date_long",
            marks_citation: false,
            marks_monetary: false,
            marks_date: true,
        },
    ]
});

/// Fixed-pattern extractor for legal citations, Bates numbers, monetary
/// amounts and dates, weighted `1 + log(1 + matchCount)` (§4.5).
pub struct RegexCitationEncoder;

impl CitationEncoder for RegexCitationEncoder {
    fn encode(&self, text: &str) -> CitationEncoding {
        let mut entries = Vec::new();
        let mut flags = CitationFlags::default();

        for pattern in CITATION_PATTERNS.iter() {
            let count = pattern.regex.find_iter(text).count();
            if count == 0 {
                continue;
            }

            let weight = 1.0 + (1.0 + count as f32).ln();
            entries.push((token_hash(pattern.label), weight));

            if pattern.marks_citation {
                flags.has_citations = true;
                flags.citation_count += count as u32;
            }
            if pattern.marks_monetary {
                flags.has_monetary = true;
            }
            if pattern.marks_date {
                flags.has_dates = true;
            }
        }

        CitationEncoding {
            sparse: SparseVector::capped(entries),
            flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwords_are_dropped_from_keyword_vector() {
        let encoder = StopwordKeywordEncoder;
        let sparse = encoder.encode("the quick brown fox jumps over the lazy dog");
        assert!(!sparse.is_empty());
        assert!(!sparse.0.contains_key(&token_hash("the")));
    }

    #[test]
    fn repeated_terms_accumulate_term_frequency() {
        let encoder = StopwordKeywordEncoder;
        let sparse = encoder.encode("liability liability liability negligence");
        let liability_hash = token_hash("liability");
        assert_eq!(sparse.0.get(&liability_hash).copied(), Some(3.0));
    }

    #[test]
    fn monetary_amount_sets_monetary_flag() {
        let encoder = RegexCitationEncoder;
        let encoding = encoder.encode("Damages totaled $1,250.00 as of the incident.");
        assert!(encoding.flags.has_monetary);
        assert!(!encoding.sparse.is_empty());
    }

    #[test]
    fn bates_number_sets_citation_flags() {
        let encoder = RegexCitationEncoder;
        let encoding = encoder.encode("See document ABC-001234 for further detail.");
        assert!(encoding.flags.has_citations);
        assert!(encoding.flags.citation_count >= 1);
    }

    #[test]
    fn plain_text_has_no_flags() {
        let encoder = RegexCitationEncoder;
        let encoding = encoder.encode("nothing special is referenced in this sentence");
        assert!(!encoding.flags.has_citations);
        assert!(!encoding.flags.has_monetary);
        assert!(!encoding.flags.has_dates);
    }
}
