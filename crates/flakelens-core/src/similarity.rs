use std::collections::BTreeSet;

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`. Two empty sets are identical (1.0).
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}

/// Mean Jaccard similarity over every unordered pair. `None` with fewer than two sets.
pub fn average_pairwise_jaccard<T: Ord>(sets: &[BTreeSet<T>]) -> Option<f64> {
    if sets.len() < 2 {
        return None;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in sets.iter().enumerate() {
        for b in &sets[i + 1..] {
            total += jaccard(a, b);
            pairs += 1;
        }
    }
    Some(total / pairs as f64)
}
