//! Attribute search over collections.
//!
//! A [`Search`] holds one scorer per field. Each scorer reads a value out of
//! an item and rates it with a [`SearchFilter`]; a score of `0.0` means the
//! field did not match.
//!
//! ```ignore
//! let hits = Search::new()
//!     .field(|c: &Command| c.name.as_str(), Fuzzy::new("user"))
//!     .field(|c: &Command| c.description.as_str(), Contains::new("user"))
//!     .check_any(true)
//!     .sort(true)
//!     .run(commands);
//! ```
//!
//! # Sorting
//!
//! With one field, matches are ordered by score, best first. With several,
//! they are ordered by the score vector compared field by field, so earlier
//! fields weigh more.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use futures::{Stream, StreamExt};
use tracing::trace;

// =============================================================================
// Filters
// =============================================================================

/// Rates one field value. `0.0` excludes the item.
pub trait SearchFilter<V: ?Sized>: Send + Sync {
    fn score(&self, value: &V) -> f64;
}

/// Matches values equal to the query.
#[derive(Debug, Clone)]
pub struct Equals<Q>(pub Q);

impl<V, Q> SearchFilter<V> for Equals<Q>
where
    V: PartialEq<Q> + ?Sized,
    Q: Send + Sync,
{
    fn score(&self, value: &V) -> f64 {
        if value.eq(&self.0) { 1.0 } else { 0.0 }
    }
}

/// Matches values that contain the query as a substring.
#[derive(Debug, Clone)]
pub struct Contains {
    query: String,
}

impl Contains {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl<V: AsRef<str> + ?Sized> SearchFilter<V> for Contains {
    fn score(&self, value: &V) -> f64 {
        if value.as_ref().contains(self.query.as_str()) {
            1.0
        } else {
            0.0
        }
    }
}

/// Matches values similar to the query.
///
/// The score is the similarity ratio between query and value, plus `0.5`
/// when the value contains the query verbatim. Values below the cutoff that
/// do not contain the query score `0.0`.
#[derive(Debug, Clone)]
pub struct Fuzzy {
    query: String,
    cutoff: f64,
    quick: bool,
}

impl Fuzzy {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            cutoff: 0.6,
            quick: true,
        }
    }

    /// Minimum ratio for a match. Defaults to `0.6`.
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Use the cheaper [`quick_ratio`] (default) or the exact [`ratio`].
    pub fn quick(mut self, quick: bool) -> Self {
        self.quick = quick;
        self
    }

    pub fn ratio(&self, value: &str) -> f64 {
        let ratio = if self.quick {
            quick_ratio(&self.query, value)
        } else {
            ratio(&self.query, value)
        };
        let contains = value.contains(self.query.as_str());
        if ratio >= self.cutoff || contains {
            ratio + if contains { 0.5 } else { 0.0 }
        } else {
            0.0
        }
    }
}

impl<V: AsRef<str> + ?Sized> SearchFilter<V> for Fuzzy {
    fn score(&self, value: &V) -> f64 {
        self.ratio(value.as_ref())
    }
}

// =============================================================================
// Similarity ratios
// =============================================================================

fn similarity(matches: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matches as f64 / total as f64
    }
}

/// Upper bound on [`ratio`] computed from character counts only.
pub fn quick_ratio(a: &str, b: &str) -> f64 {
    let mut available: HashMap<char, isize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }

    let mut matches = 0;
    let mut len_a = 0;
    for c in a.chars() {
        len_a += 1;
        let count = available.entry(c).or_default();
        if *count > 0 {
            matches += 1;
        }
        *count -= 1;
    }
    similarity(matches, len_a + b.chars().count())
}

/// Ratcliff/Obershelp similarity: twice the number of matching characters
/// over the total length, where matches are found by repeatedly taking the
/// longest common block.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    similarity(matching_chars(&a, &b), a.len() + b.len())
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Longest common contiguous block as `(start_a, start_b, len)`.
fn longest_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut row = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let len = previous[j] + 1;
                row[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        previous = row;
    }
    best
}

// =============================================================================
// Search
// =============================================================================

type Scorer<T> = Box<dyn Fn(&T) -> f64 + Send + Sync>;

/// A reusable multi-field search.
pub struct Search<T> {
    fields: Vec<Scorer<T>>,
    check_any: bool,
    sort: bool,
}

impl<T> Default for Search<T> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            check_any: false,
            sort: false,
        }
    }
}

impl<T> Search<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field: `accessor` picks the value, `filter` rates it.
    pub fn field<F, V, S>(mut self, accessor: F, filter: S) -> Self
    where
        T: 'static,
        F: Fn(&T) -> &V + Send + Sync + 'static,
        V: ?Sized + 'static,
        S: SearchFilter<V> + 'static,
    {
        self.fields
            .push(Box::new(move |item: &T| filter.score(accessor(item))));
        self
    }

    /// Adds a field matched by equality.
    pub fn field_eq<F, V, Q>(self, accessor: F, query: Q) -> Self
    where
        T: 'static,
        F: Fn(&T) -> &V + Send + Sync + 'static,
        V: PartialEq<Q> + ?Sized + 'static,
        Q: Send + Sync + 'static,
    {
        self.field(accessor, Equals(query))
    }

    /// Match if any field matches, instead of all of them.
    pub fn check_any(mut self, check_any: bool) -> Self {
        self.check_any = check_any;
        self
    }

    /// Order results by score.
    pub fn sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Scores an item, or `None` if it does not match.
    ///
    /// In all-fields mode scoring stops at the first field that misses.
    pub fn scores(&self, item: &T) -> Option<Vec<f64>> {
        let mut scores = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let score = field(item);
            if score <= 0.0 && !self.check_any {
                return None;
            }
            scores.push(score);
        }

        let matched = if self.check_any {
            scores.iter().any(|s| *s > 0.0)
        } else {
            true
        };
        matched.then_some(scores)
    }

    fn collect(&self, scored: Vec<(T, Vec<f64>)>) -> Vec<T> {
        let mut scored = scored;
        if self.sort {
            scored.sort_by(|(_, a), (_, b)| compare_scores(b, a));
        }
        trace!(matches = scored.len(), "Search finished");
        scored.into_iter().map(|(item, _)| item).collect()
    }

    /// Returns the matching items.
    pub fn run<I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let scored = items
            .into_iter()
            .filter_map(|item| self.scores(&item).map(|scores| (item, scores)))
            .collect();
        self.collect(scored)
    }

    /// Returns the matching items of an async stream.
    pub async fn run_stream<S>(&self, items: S) -> Vec<T>
    where
        S: Stream<Item = T>,
    {
        let scored = items
            .filter_map(|item| {
                let hit = self.scores(&item).map(|scores| (item, scores));
                async move { hit }
            })
            .collect::<Vec<_>>()
            .await;
        self.collect(scored)
    }
}

fn compare_scores(a: &[f64], b: &[f64]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

impl<T> fmt::Debug for Search<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("fields", &self.fields.len())
            .field("check_any", &self.check_any)
            .field("sort", &self.sort)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Command {
        name: &'static str,
        description: &'static str,
        hidden: bool,
    }

    fn commands() -> Vec<Command> {
        vec![
            Command { name: "ban", description: "Ban a member", hidden: false },
            Command { name: "userinfo", description: "Show a user", hidden: false },
            Command { name: "user", description: "Look up someone", hidden: true },
            Command { name: "ping", description: "Latency check", hidden: false },
        ]
    }

    #[test]
    fn test_ratios() {
        assert_eq!(ratio("abcd", "bcde"), 0.75);
        assert_eq!(quick_ratio("abcd", "bcde"), 0.75);
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert!(quick_ratio("abc", "cba") > ratio("abc", "cba"));
    }

    #[test]
    fn test_fuzzy_bonus_and_cutoff() {
        let fuzzy = Fuzzy::new("user");
        assert!(fuzzy.ratio("user") > 1.0);
        assert!(fuzzy.ratio("userinfo") > 1.0);
        assert_eq!(fuzzy.ratio("ping"), 0.0);
        assert!(fuzzy.ratio("usr") > 0.0);
    }

    #[test]
    fn test_single_field_sorted() {
        let hits = Search::new()
            .field(|c: &Command| c.name, Fuzzy::new("user"))
            .sort(true)
            .run(commands());

        let names: Vec<_> = hits.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["user", "userinfo"]);
    }

    #[test]
    fn test_all_fields_must_match() {
        let hits = Search::new()
            .field(|c: &Command| c.name, Contains::new("user"))
            .field_eq(|c: &Command| &c.hidden, false)
            .run(commands());

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "userinfo");
    }

    #[test]
    fn test_any_field_matches() {
        let hits = Search::new()
            .field(|c: &Command| &c.name, Equals("ping"))
            .field(|c: &Command| c.description, Contains::new("Ban"))
            .check_any(true)
            .run(commands());

        let names: Vec<_> = hits.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["ban", "ping"]);
    }

    #[test]
    fn test_no_fields() {
        assert_eq!(Search::<u8>::new().run(vec![1, 2]), vec![1, 2]);
        assert!(Search::<u8>::new().check_any(true).run(vec![1, 2]).is_empty());
    }

    #[test]
    fn test_multi_field_sort_weights_first_field() {
        let hits = Search::new()
            .field(|c: &Command| c.name, Fuzzy::new("user"))
            .field(|c: &Command| c.description, Contains::new("o"))
            .check_any(true)
            .sort(true)
            .run(commands());

        assert_eq!(hits[0].name, "user");
        assert_eq!(hits[1].name, "userinfo");
    }

    #[tokio::test]
    async fn test_run_stream() {
        let search = Search::new().field(|n: &String| n.as_str(), Contains::new("a"));
        let stream = futures::stream::iter(vec!["abc".to_string(), "xyz".into(), "bar".into()]);

        let hits = search.run_stream(stream).await;
        assert_eq!(hits, vec!["abc".to_string(), "bar".to_string()]);
    }
}
