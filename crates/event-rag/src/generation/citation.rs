//! Citation extraction and canonical renumbering
//!
//! The generator cites sources as `[n]`, where `n` is the position id it was
//! shown in the prompt. It may cite out of order, repeat markers, skip sources
//! or invent numbers. Canonicalization keeps only resolvable sources and
//! renumbers them `1..=N` in order of first appearance in the answer, so the
//! sources list reads in the same order as the narrative.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};

use crate::types::{Citation, RetrievedDocument};

/// `[` + ASCII digits + `]`, no whitespace
static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9]+)\]").expect("Invalid citation marker regex"));

/// Run of adjacent markers plus one optional leading space; a run that loses
/// every marker takes the space with it
static MARKER_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"( ?)((?:\[[0-9]+\])+)").expect("Invalid citation marker regex")
});

/// Marker numbers in order of appearance; `None` for numbers too large to represent
fn marker_numbers(text: &str) -> impl Iterator<Item = Option<usize>> + '_ {
    MARKER
        .captures_iter(text)
        .map(|cap| cap[1].parse::<usize>().ok())
}

/// Resolve the markers of `answer` against the retrieved sources.
///
/// Returns one citation per distinct referenced number, keyed and ordered by
/// that number. Numbers outside `1..=retrieved.len()` are ignored.
pub fn extract_citations(
    answer: &str,
    retrieved: &[RetrievedDocument],
) -> BTreeMap<usize, Citation> {
    let mut citations = BTreeMap::new();

    for number in marker_numbers(answer).flatten() {
        if number == 0 || number > retrieved.len() || citations.contains_key(&number) {
            continue;
        }
        let doc = &retrieved[number - 1];
        citations.insert(number, Citation::from_retrieved(doc).renumbered(number));
    }

    citations
}

/// Old marker number to canonical number, assigned by first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenumberMap {
    old_to_new: HashMap<usize, usize>,
    first_seen: Vec<usize>,
}

impl RenumberMap {
    /// Canonical number for an old marker number
    pub fn get(&self, old: usize) -> Option<usize> {
        self.old_to_new.get(&old).copied()
    }

    /// `(old, new)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.first_seen
            .iter()
            .enumerate()
            .map(|(i, &old)| (old, i + 1))
    }

    /// Number of distinct markers
    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    /// True when the answer had no markers
    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    fn insert(&mut self, old: usize) {
        if !self.old_to_new.contains_key(&old) {
            self.first_seen.push(old);
            self.old_to_new.insert(old, self.first_seen.len());
        }
    }
}

/// Number every distinct marker of `answer` by order of first appearance
pub fn build_renumber_map(answer: &str) -> RenumberMap {
    let mut map = RenumberMap::default();
    for old in marker_numbers(answer).flatten() {
        map.insert(old);
    }
    map
}

/// Answer text and citations after renumbering
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalAnswer {
    /// Answer with markers `[1]..[N]`
    pub text: String,
    /// `citations[k - 1]` backs marker `[k]`
    pub citations: Vec<Citation>,
}

/// Rewrite markers to canonical numbers and order the citations to match.
///
/// Walks `map` in canonical order and gives each old number that has an
/// extracted citation the next free number. Old numbers without a citation are
/// skipped without consuming a number, and their markers are removed from the
/// text, so every remaining marker resolves and no citation is orphaned.
pub fn rewrite_and_reorder(
    answer: &str,
    map: &RenumberMap,
    citations: &BTreeMap<usize, Citation>,
) -> CanonicalAnswer {
    let mut resolved: HashMap<usize, usize> = HashMap::with_capacity(map.len());
    let mut canonical: Vec<Citation> = Vec::with_capacity(map.len());

    for (old, _) in map.iter() {
        match citations.get(&old) {
            Some(citation) => {
                let new = canonical.len() + 1;
                resolved.insert(old, new);
                canonical.push(citation.renumbered(new));
            }
            None => tracing::debug!("Dropping unresolved citation marker [{}]", old),
        }
    }

    let text = MARKER_RUN
        .replace_all(answer, |run: &Captures| {
            let markers = MARKER.replace_all(&run[2], |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|old| resolved.get(&old))
                    .map(|new| format!("[{}]", new))
                    .unwrap_or_default()
            });
            if markers.is_empty() {
                String::new()
            } else {
                format!("{}{}", &run[1], markers)
            }
        })
        .into_owned();

    CanonicalAnswer {
        text,
        citations: canonical,
    }
}

/// Extract, then renumber: the full canonicalization of a generated answer
pub fn canonicalize(answer: &str, retrieved: &[RetrievedDocument]) -> CanonicalAnswer {
    let extracted = extract_citations(answer, retrieved);
    let map = build_renumber_map(answer);

    if extracted.len() < map.len() {
        tracing::warn!(
            "Generator cited {} unknown source number(s); {} source(s) retrieved",
            map.len() - extracted.len(),
            retrieved.len()
        );
    }

    rewrite_and_reorder(answer, &map, &extracted)
}
