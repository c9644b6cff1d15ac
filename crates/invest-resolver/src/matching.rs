//! Identifier normalization, Jaro-Winkler name similarity, and the
//! fuzzy-match scoring formula (§4.E).
//!
//! Jaro-Winkler is hand-rolled rather than pulled from a crate: it is a
//! one-screen, deterministic algorithm, and every `strsim`-alike crate
//! makes slightly different tie-breaking choices in the common-prefix
//! bonus that would otherwise silently pin this crate's match behavior to
//! someone else's judgment call (see DESIGN.md).

use invest_config::FuzzyMatchWeights;

/// Jaro similarity between two strings, in `[0, 1]`.
fn jaro_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let match_distance = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matches = vec![false; a.len()];
    let mut b_matches = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, &ac) in a.iter().enumerate() {
        let start = i.saturating_sub(match_distance);
        let end = (i + match_distance + 1).min(b.len());
        for j in start..end {
            if b_matches[j] || b[j] != ac {
                continue;
            }
            a_matches[i] = true;
            b_matches[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut b_index = 0usize;
    for (i, &matched) in a_matches.iter().enumerate() {
        if !matched {
            continue;
        }
        while !b_matches[b_index] {
            b_index += 1;
        }
        if a[i] != b[b_index] {
            transpositions += 1;
        }
        b_index += 1;
    }
    let transpositions = transpositions / 2;

    let m = matches as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions as f64) / m) / 3.0
}

/// Jaro-Winkler similarity: Jaro similarity boosted by a shared prefix (up
/// to 4 characters), in `[0, 1]`. `scaling_factor` is the standard 0.1.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let jaro = jaro_similarity(a, b);
    let prefix_len = a
        .chars()
        .zip(b.chars())
        .take(4)
        .take_while(|(x, y)| x == y)
        .count();
    (jaro + prefix_len as f64 * 0.1 * (1.0 - jaro)).clamp(0.0, 1.0)
}

/// Diacritic-fold and lowercase a name for comparison (§4.E step 1).
/// A small, explicit table covers the common Latin-1 accented ranges
/// without pulling in a full Unicode-normalization crate.
pub fn fold_name(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| {
            let folded = match c {
                'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
                'é' | 'è' | 'ê' | 'ë' => 'e',
                'í' | 'ì' | 'î' | 'ï' => 'i',
                'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
                'ú' | 'ù' | 'û' | 'ü' => 'u',
                'ñ' => 'n',
                'ç' => 'c',
                other => other,
            };
            Some(folded.to_ascii_lowercase())
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Inputs to the fuzzy-match formula (§4.E step 3): `last_name` × 0.4 +
/// `first_name` × 0.25 + `date_of_birth_exact` × 0.2 +
/// `address_similarity` × 0.15.
#[derive(Debug, Clone, Default)]
pub struct MatchCandidate {
    /// Folded last name.
    pub last_name: String,
    /// Folded first name.
    pub first_name: String,
    /// Date of birth, if known.
    pub date_of_birth: Option<chrono::NaiveDate>,
    /// A normalized address string, if known.
    pub address: Option<String>,
}

/// Compute the weighted fuzzy-match score between a subject and an
/// existing entity's best-known attributes (§4.E step 3).
pub fn fuzzy_score(subject: &MatchCandidate, existing: &MatchCandidate, weights: &FuzzyMatchWeights) -> f64 {
    let last_name_sim = jaro_winkler(&subject.last_name, &existing.last_name);
    let first_name_sim = jaro_winkler(&subject.first_name, &existing.first_name);
    let dob_exact = match (subject.date_of_birth, existing.date_of_birth) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    };
    let address_sim = match (&subject.address, &existing.address) {
        (Some(a), Some(b)) => jaro_winkler(a, b),
        _ => 0.0,
    };

    (weights.last_name * last_name_sim + weights.first_name * first_name_sim + weights.date_of_birth_exact * dob_exact + weights.address_similarity * address_sim).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(jaro_winkler("martha", "martha"), 1.0);
    }

    #[test]
    fn empty_strings_score_zero_unless_both_empty() {
        assert_eq!(jaro_winkler("", ""), 1.0);
        assert_eq!(jaro_winkler("martha", ""), 0.0);
    }

    #[test]
    fn known_pair_martha_marhta() {
        // Canonical Winkler (1990) example.
        let score = jaro_winkler("martha", "marhta");
        assert!((score - 0.9611).abs() < 0.001, "got {score}");
    }

    #[test]
    fn known_pair_dixon_dicksonx() {
        let score = jaro_winkler("dixon", "dicksonx");
        assert!((score - 0.8133).abs() < 0.01, "got {score}");
    }

    #[test]
    fn fold_name_strips_diacritics_and_lowercases() {
        assert_eq!(fold_name(" José "), "jose");
    }

    #[test]
    fn fuzzy_score_weights_sum_correctly_on_perfect_match() {
        let weights = FuzzyMatchWeights::defaults();
        let candidate = MatchCandidate {
            last_name: "smith".to_string(),
            first_name: "jane".to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 1, 1),
            address: Some("123 main st".to_string()),
        };
        let score = fuzzy_score(&candidate, &candidate, &weights);
        assert!((score - 1.0).abs() < 1e-9);
    }
}
