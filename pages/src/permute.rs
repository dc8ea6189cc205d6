//! Choice-order permutation generation.
//!
//! The permutation is the only randomness in the grading core. It is drawn
//! from the thread-local generator exactly once per (page, learner-visit),
//! reified into `PageData`, and threaded explicitly through render and
//! grade; nothing is re-drawn at grade time.

use rand::seq::SliceRandom;

/// Produce a display ordering of `n` options: the identity unless `shuffle`
/// is set, in which case a uniform random permutation.
pub fn make_permutation(n: usize, shuffle: bool) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    if shuffle {
        perm.shuffle(&mut rand::rng());
    }
    perm
}

/// Check that a stored value really is a permutation of `0..n`.
pub fn is_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &i in perm {
        if i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}
