//! Table name generation.
//!
//! Every upload gets a fresh table named `<prefix>_<base>`, where `<prefix>` is a short random
//! token and `<base>` is a sanitized, lowercased form of the filename. No uniqueness check is
//! made against existing tables; with a 4-symbol prefix over a 20-letter alphabet plus `_`, two
//! uploads of the same filename collide with probability about 1 in 200,000.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::{StdRng, ThreadRng};

use crate::types::{TABLE_PREFIX_LEN, TableIdentifier};

/// Symbols used for the random table prefix.
pub const TABLE_PREFIX_ALPHABET: &[u8] = b"_abcdefghijklmnopqrst";

/// Filename substituted when an upload arrives without one.
pub const DEFAULT_UPLOAD_FILENAME: &str = "uploaded_file.csv";

/// The only extension that is stripped before sanitizing (case-sensitive).
const CSV_SUFFIX: &str = ".csv";

/// Source of short random tokens.
///
/// Injected into [`generate_table_name`] so tests can make names deterministic.
pub trait TokenSource {
    /// Return `len` symbols drawn from `alphabet`.
    fn token(&mut self, alphabet: &[u8], len: usize) -> String;
}

/// Draws tokens uniformly from a [`rand`] generator.
#[derive(Debug, Clone)]
pub struct RandomTokenSource<R = ThreadRng> {
    rng: R,
}

impl RandomTokenSource<ThreadRng> {
    /// Use the thread-local generator.
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomTokenSource<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomTokenSource<StdRng> {
    /// Reproducible tokens from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> TokenSource for RandomTokenSource<R> {
    fn token(&mut self, alphabet: &[u8], len: usize) -> String {
        (0..len)
            .map(|_| char::from(alphabet[self.rng.gen_range(0..alphabet.len())]))
            .collect()
    }
}

/// Always returns the same token. Intended for tests and reproducible runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTokenSource(String);

impl FixedTokenSource {
    /// Create a fixed source.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not exactly four lowercase ASCII letters, digits or underscores.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        assert!(
            token.len() == TABLE_PREFIX_LEN
                && token
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'),
            "fixed token must be {TABLE_PREFIX_LEN} identifier-safe lowercase chars, got {token:?}"
        );
        Self(token)
    }
}

impl TokenSource for FixedTokenSource {
    fn token(&mut self, _alphabet: &[u8], _len: usize) -> String {
        self.0.clone()
    }
}

/// Derive a table name from a raw upload filename.
///
/// - A trailing `.csv` is removed (exact, case-sensitive match). Any other extension such as
///   `.CSV` or `.tsv` stays part of the base and is sanitized along with it.
/// - Every character outside `[A-Za-z0-9_]` becomes `_`, and the result is lowercased.
/// - A random prefix from `tokens` and a `_` separator are prepended.
///
/// ```
/// use table_ingest::naming::{generate_table_name, FixedTokenSource};
///
/// let mut tokens = FixedTokenSource::new("ab_c");
/// let name = generate_table_name("Sales Q1.csv", &mut tokens);
/// assert_eq!(name.as_str(), "ab_c_sales_q1");
/// ```
pub fn generate_table_name(raw_filename: &str, tokens: &mut dyn TokenSource) -> TableIdentifier {
    let base = sanitize_base(raw_filename.strip_suffix(CSV_SUFFIX).unwrap_or(raw_filename));
    let prefix = tokens.token(TABLE_PREFIX_ALPHABET, TABLE_PREFIX_LEN);
    TableIdentifier::from_parts(&prefix, &base)
}

fn sanitize_base(base: &str) -> String {
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
