use std::collections::{HashMap, HashSet};

/// Merges ranked lists of product positions by weighted positional score
///
/// Each list contributes `(top_n - rank) / top_n * weight` to every product
/// it contains, using the first occurrence only. Scores accumulate across
/// lists. Products with equal totals keep the order in which they were first
/// seen, walking the lists in the order given.
pub fn fuse_rankings(rankings: &[(&[usize], f64)], top_n: usize) -> Vec<usize> {
    if top_n == 0 {
        return Vec::new();
    }

    let mut discovered: Vec<(usize, f64)> = Vec::new();
    let mut slots: HashMap<usize, usize> = HashMap::new();

    for &(ranking, weight) in rankings {
        let mut seen: HashSet<usize> = HashSet::new();
        for (rank, &position) in ranking.iter().enumerate() {
            if !seen.insert(position) {
                continue;
            }
            let score = (top_n as f64 - rank as f64) / top_n as f64 * weight;
            let slot = *slots.entry(position).or_insert_with(|| {
                discovered.push((position, 0.0));
                discovered.len() - 1
            });
            discovered[slot].1 += score;
        }
    }

    discovered.sort_by(|a, b| b.1.total_cmp(&a.1));
    discovered
        .into_iter()
        .take(top_n)
        .map(|(position, _)| position)
        .collect()
}
