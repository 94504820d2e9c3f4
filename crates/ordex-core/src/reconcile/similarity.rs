//! Edit-distance similarity for item-name matching.
//!
//! Shipment notices truncate and re-wrap product names, so merged
//! fragments rarely agree byte-for-byte. A normalized Levenshtein
//! ratio tolerates that drift while keeping genuinely different
//! products apart.

/// Similarity ratio in `[0.0, 1.0]`: `1.0` for identical strings,
/// `0.0` for nothing in common. Computed over characters, not bytes.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let longest = a_chars.len().max(b_chars.len());
    if longest == 0 {
        return 1.0;
    }
    let distance = levenshtein(&a_chars, &b_chars);
    1.0 - distance as f64 / longest as f64
}

/// Single-row Levenshtein distance.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, &ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = if ca == cb { diagonal } else { diagonal + 1 };
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        assert_eq!(similarity("Blue Pen", "Blue Pen"), 1.0);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let ab = similarity("Steam Link", "Steam Lonk");
        let ba = similarity("Steam Lonk", "Steam Link");
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_truncated_name_scores_high() {
        let long = "Crayola Crayons 24 Count Assorted Colors";
        let truncated = "Crayola Crayons 24 Count Assorted Color";
        assert!(similarity(long, truncated) > 0.9);
    }

    #[test]
    fn test_different_products_score_low() {
        assert!(similarity("Blue Pen", "Red Notebook") < 0.5);
    }

    #[test]
    fn test_multibyte_chars() {
        // One substitution over five characters, not over byte length.
        let ratio = similarity("żółty", "żółta");
        assert!((ratio - 0.8).abs() < 1e-9);
    }
}
