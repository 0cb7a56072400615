//! Relevance ranking for career retrieval.
//!
//! Blends a keyword containment score with cosine similarity over a hashed
//! character vector. The hashed vector is a cheap lexical fingerprint, not a
//! semantic embedding; the whole ranking is replaceable.

use crate::types::CareerRecord;

/// Dimensions of the hashed character vector.
pub const EMBEDDING_DIMS: usize = 256;

const VECTOR_WEIGHT: f64 = 0.7;
const KEYWORD_WEIGHT: f64 = 0.3;

/// Results at or below this blended score are dropped.
pub const MIN_SCORE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCareer {
    pub record: CareerRecord,
    pub vector_score: f64,
    pub keyword_score: f64,
    pub score: f64,
}

/// Fold the lowercase characters of `text` into a unit-length vector.
pub fn embed(text: &str) -> Vec<f64> {
    let mut vector = vec![0.0; EMBEDDING_DIMS];
    for (i, ch) in text.to_lowercase().chars().enumerate() {
        vector[i % EMBEDDING_DIMS] += f64::from(u32::from(ch)) / 256.0;
    }

    let magnitude = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        for v in &mut vector {
            *v /= magnitude;
        }
    }
    vector
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Containment score of the query against a career's fields, capped at 1.0.
pub fn keyword_score(query: &str, career: &CareerRecord) -> f64 {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return 0.0;
    }

    let title = career.title.to_lowercase();
    let description = career.description.to_lowercase();
    let skills = career.required_skills.join(" ").to_lowercase();
    let transitions = career.common_transitions.join(" ").to_lowercase();

    let mut score: f64 = 0.0;
    if title.contains(&q) {
        score += 0.8;
    }
    if description.contains(&q) {
        score += 0.4;
    }
    if skills.contains(&q) {
        score += 0.3;
    }
    if transitions.contains(&q) {
        score += 0.2;
    }

    for word in q.split_whitespace().filter(|w| w.chars().count() > 3) {
        if title.contains(word) {
            score += 0.2;
        }
        if skills.contains(word) {
            score += 0.1;
        }
    }

    score.min(1.0)
}

fn career_text(career: &CareerRecord) -> String {
    format!(
        "{} {} {}",
        career.title,
        career.description,
        career.required_skills.join(" ")
    )
}

/// Score every career against `query` and keep the best `limit` above [`MIN_SCORE`].
pub fn rank(query: &str, careers: Vec<CareerRecord>, limit: usize) -> Vec<ScoredCareer> {
    let query_vector = embed(query);

    let mut scored: Vec<ScoredCareer> = careers
        .into_iter()
        .map(|record| {
            let vector_score = cosine_similarity(&query_vector, &embed(&career_text(&record)));
            let keyword_score = keyword_score(query, &record);
            ScoredCareer {
                score: vector_score * VECTOR_WEIGHT + keyword_score * KEYWORD_WEIGHT,
                record,
                vector_score,
                keyword_score,
            }
        })
        .collect();

    // Stable sort keeps catalog order for ties.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored.retain(|s| s.score > MIN_SCORE);
    scored
}
