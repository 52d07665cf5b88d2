//! Ratcliff/Obershelp string similarity
//!
//! Longest common block first, then recurse on both sides. No junk
//! heuristics: query strings are far shorter than the 200 items where they
//! would apply.

/// Similarity in `0.0..=1.0`: twice the matched characters over the total.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Up to `n` candidates whose similarity to `word` is at least `cutoff`,
/// best first. Ties keep the lexicographically larger candidate first.
pub fn close_matches<'a, I>(word: &str, candidates: I, n: usize, cutoff: f64) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(&str, f64)> = candidates
        .into_iter()
        .map(|candidate| (candidate, ratio(candidate, word)))
        .filter(|(_, score)| *score >= cutoff)
        .collect();

    scored.sort_by(|x, y| y.1.total_cmp(&x.1).then_with(|| y.0.cmp(x.0)));
    scored.truncate(n);
    scored
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common block in `a[alo..ahi]` and `b[blo..bhi]`, earliest in `a`
/// and then earliest in `b` on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run lengths ending at b[j - 1], indexed by j - blo
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut curr = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            curr[slot] = if a[i] == b[j] { prev[slot - 1] + 1 } else { 0 };
            let k = curr[slot];
            if k > best_k {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_k = k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ratio_known_values() {
        assert!(close(ratio("abcd", "bcde"), 0.75));
        assert!(close(ratio("fiserw", "fiserv"), 10.0 / 12.0));
        assert!(close(ratio("apple", "apple inc."), 10.0 / 15.0));
        assert!(close(ratio("", ""), 1.0));
        assert!(close(ratio("abc", ""), 0.0));
        assert!(close(ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_ratio_recurses_both_sides() {
        // "ab" + "d" match around the differing middle
        assert!(close(ratio("abxd", "abyd"), 6.0 / 8.0));
    }

    #[test]
    fn test_close_matches_order_and_cutoff() {
        let words = ["ape", "apple", "peach", "puppy"];
        let matches = close_matches("appel", words, 3, 0.6);
        let names: Vec<&str> = matches.iter().map(|(w, _)| *w).collect();

        assert_eq!(names, vec!["apple", "ape"]);
        assert!(close_matches("appel", words, 0, 0.0).is_empty());
    }
}
