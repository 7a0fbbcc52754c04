//! Random keys: one-time passwords and thread cession tokens.

use std::collections::{BTreeSet, HashSet};

use rand::Rng;

/// Generate a random alphanumeric key of `length` characters.
pub fn keygen(length: usize) -> String {
    keygen_with(&mut rand::rng(), length)
}

/// [`keygen`] with a caller-supplied RNG.
pub fn keygen_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(&rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate `count` pairwise-distinct tokens, none of which appear in
/// `existing`.
///
/// Tokens are returned in ascending order so that assigning them to records
/// in file order is reproducible given the same RNG output.
pub fn unique_tokens<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    length: usize,
    existing: &HashSet<String>,
) -> Vec<String> {
    let mut tokens = BTreeSet::new();
    while tokens.len() < count {
        let token = keygen_with(rng, length);
        if !existing.contains(&token) {
            tokens.insert(token);
        }
    }
    tokens.into_iter().collect()
}
