//! Lexical clause matching against document chunks

use super::fields::ParsedQuery;

/// Fixed answer used when no clause scores above zero
pub const CLAUSE_NOT_FOUND: &str = "Clause not found in document.";

/// Find the chunk that best matches a question and its parsed fields
///
/// Structured fields score higher than plain keyword overlap: procedure
/// counts double, age/location/duration count once, and every question
/// word present in the chunk adds a small increment.
pub fn best_matching_clause<'a>(
    chunks: impl IntoIterator<Item = &'a str>,
    question: &str,
    parsed: &ParsedQuery,
) -> Option<String> {
    let question_words: Vec<String> = question
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();

    let mut best_score = 0.0f32;
    let mut best_chunk: Option<&str> = None;

    for chunk in chunks {
        let chunk_lower = chunk.to_lowercase();
        let mut score = 0.0f32;

        if let Some(age) = &parsed.age {
            if chunk.contains(age.as_str()) {
                score += 1.0;
            }
        }
        if let Some(procedure) = &parsed.procedure {
            if chunk_lower.contains(&procedure.to_lowercase()) {
                score += 2.0;
            }
        }
        if let Some(location) = &parsed.location {
            if chunk_lower.contains(&location.to_lowercase()) {
                score += 1.0;
            }
        }
        if let Some(duration) = &parsed.policy_duration {
            if chunk_lower.contains(&duration.to_lowercase()) {
                score += 1.0;
            }
        }

        for word in &question_words {
            if chunk_lower.contains(word.as_str()) {
                score += 0.2;
            }
        }

        if score > best_score {
            best_score = score;
            best_chunk = Some(chunk);
        }
    }

    best_chunk.map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fields::parse_query;

    #[test]
    fn test_procedure_match_outweighs_keyword_overlap() {
        let chunks = [
            "General exclusions apply to all claims filed under this policy document.",
            "Knee surgery is covered after a waiting period of twenty-four months.",
        ];
        let question = "Is knee surgery covered under this policy?";
        let parsed = parse_query(question);
        let best = best_matching_clause(chunks.iter().copied(), question, &parsed).unwrap();
        assert!(best.contains("Knee surgery is covered"));
    }

    #[test]
    fn test_no_overlap_returns_none() {
        let chunks = ["Entirely unrelated text."];
        let parsed = ParsedQuery::default();
        assert_eq!(
            best_matching_clause(chunks.iter().copied(), "quantum gravity", &parsed),
            None
        );
    }

    #[test]
    fn test_location_and_duration_contribute() {
        let chunks = [
            "Hospitals in Pune are part of the network for cashless treatment.",
            "Hospitals elsewhere require reimbursement claims.",
        ];
        let question = "Is treatment in Pune cashless?";
        let parsed = parse_query(question);
        let best = best_matching_clause(chunks.iter().copied(), question, &parsed).unwrap();
        assert!(best.contains("Pune"));
    }
}
