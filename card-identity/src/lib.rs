//! Canonical identity for cards, and merge-by-identity for collections.
//!
//! The card-data API does not guarantee a stable printing id across
//! re-fetches of logically the same card, so equality goes through a
//! folded form of the display name instead. The folding is a heuristic:
//! two genuinely different names that fold to the same string collide,
//! and that is accepted.

use std::collections::HashMap;

use icu::casemap::CaseMapper;
use icu::normalizer::DecomposingNormalizer;
use icu::properties::props::GeneralCategory;
use icu::properties::CodePointMapData;

use card_model::{Card, CollectedCard};

/// Canonical identity key for a card.
///
/// Dash-like characters (en dash, em dash, minus sign) become a plain
/// hyphen, the name is case-folded and stripped of diacritics, and
/// whitespace runs collapse to a single space. Total over any name,
/// including the empty string.
pub fn identity_key(card: &Card) -> String {
    fold_name(&card.name)
}

/// Identity-key equality.
pub fn same_card(a: &Card, b: &Card) -> bool {
    identity_key(a) == identity_key(b)
}

/// The folding behind [`identity_key`], usable directly on names
/// (the sort tiebreak in `card-collection` goes through it too).
pub fn fold_name(name: &str) -> String {
    let dashed: String = name
        .chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            other => other,
        })
        .collect();

    // NFKD pulls combining marks out of precomposed letters so they
    // can be dropped; full case folding handles case and sharp s.
    let decomposed = DecomposingNormalizer::new_nfkd().normalize(&dashed);
    let category = CodePointMapData::<GeneralCategory>::new();
    let stripped: String = decomposed
        .chars()
        .filter(|c| category.get(*c) != GeneralCategory::NonspacingMark)
        .collect();
    let folded = CaseMapper::new().fold_string(&stripped);

    // Latin ligature letters have no NFKD decomposition.
    let expanded: String = folded
        .chars()
        .flat_map(|c| match c {
            'æ' => vec!['a', 'e'],
            'œ' => vec!['o', 'e'],
            other => vec![other],
        })
        .collect();

    expanded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Merge entries that share an identity key, summing counts.
///
/// The surviving entry per key keeps the payload and entry id of the
/// first entry encountered for that key; output order is first-encounter
/// order, so the result is deterministic given the input order. Counts
/// are conserved per key, and no zero-count entry is produced that was
/// not already present in the input.
pub fn normalize(entries: Vec<CollectedCard>) -> Vec<CollectedCard> {
    let mut merged: Vec<CollectedCard> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = identity_key(&entry.card);
        match index.get(&key) {
            // Saturating: a persisted bucket may carry arbitrary counts,
            // and the merge must stay total over any decodable input.
            Some(&at) => merged[at].count = merged[at].count.saturating_add(entry.count),
            None => {
                index.insert(key, merged.len());
                merged.push(entry);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    use super::*;

    fn card(name: &str) -> Card {
        Card {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            faces: None,
            image_uris: None,
            rarity: "common".to_string(),
        }
    }

    fn entry(name: &str, count: u32) -> CollectedCard {
        let mut e = CollectedCard::new(card(name));
        e.count = count;
        e
    }

    #[test]
    fn folds_case_and_diacritics() {
        let plain = card("Aether Vial");
        let lower = card("aether vial");
        let ligature = card("ÆTHER VIAL");
        assert_eq!(identity_key(&plain), identity_key(&lower));
        assert_eq!(identity_key(&plain), identity_key(&ligature));
        assert_eq!(identity_key(&card("Séance")), identity_key(&card("seance")));
    }

    #[test]
    fn folds_dash_variants() {
        let en_dash = card("Worn\u{2013}Worry");
        let em_dash = card("Worn\u{2014}Worry");
        let minus = card("Worn\u{2212}Worry");
        let hyphen = card("Worn-Worry");
        assert_eq!(identity_key(&en_dash), identity_key(&hyphen));
        assert_eq!(identity_key(&em_dash), identity_key(&hyphen));
        assert_eq!(identity_key(&minus), identity_key(&hyphen));
    }

    #[test]
    fn folds_whitespace_runs() {
        assert_eq!(fold_name("  Llanowar \t Elves \n"), "llanowar elves");
        assert_eq!(fold_name(""), "");
    }

    #[test]
    fn distinct_names_keep_distinct_keys() {
        assert_ne!(
            identity_key(&card("Goblin Guide")),
            identity_key(&card("Goblin King"))
        );
    }

    #[test]
    fn normalize_keeps_first_payload_and_sums_counts() {
        let first = entry("Aether Vial", 2);
        let first_id = first.id.clone();
        let merged = normalize(vec![first, entry("ÆTHER VIAL", 3), entry("Goblin Guide", 1)]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, first_id);
        assert_eq!(merged[0].card.name, "Aether Vial");
        assert_eq!(merged[0].count, 5);
        assert_eq!(merged[1].count, 1);
    }

    #[test]
    fn normalize_saturates_merged_counts() {
        let merged = normalize(vec![entry("Aether Vial", u32::MAX), entry("ÆTHER VIAL", 7)]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].count, u32::MAX);
    }

    // The generator leans on names that collide under folding so the
    // properties actually exercise the merge path.
    const NAME_POOL: &[&str] = &[
        "Aether Vial",
        "aether vial",
        "ÆTHER VIAL",
        "Worn\u{2013}Worry",
        "Worn-Worry",
        "Llanowar  Elves",
        "llanowar elves",
        "Goblin Guide",
        "Góblin Guide",
        "Séance",
    ];

    #[derive(Clone, Debug)]
    struct Entries(Vec<CollectedCard>);

    impl Arbitrary for Entries {
        fn arbitrary(g: &mut Gen) -> Self {
            let len = usize::arbitrary(g) % 12;
            let entries = (0..len)
                .map(|_| {
                    let name = g.choose(NAME_POOL).unwrap();
                    entry(name, u32::arbitrary(g) % 5 + 1)
                })
                .collect();
            Entries(entries)
        }
    }

    fn totals(entries: &[CollectedCard]) -> BTreeMap<String, u64> {
        let mut acc = BTreeMap::new();
        for e in entries {
            *acc.entry(identity_key(&e.card)).or_insert(0) += u64::from(e.count);
        }
        acc
    }

    #[quickcheck]
    fn normalize_is_idempotent(input: Entries) -> bool {
        let once = normalize(input.0);
        let twice = normalize(once.clone());
        totals(&once) == totals(&twice)
    }

    #[quickcheck]
    fn normalize_conserves_counts(input: Entries) -> bool {
        let before = totals(&input.0);
        let after = totals(&normalize(input.0));
        before == after
    }

    #[quickcheck]
    fn normalize_yields_unique_keys(input: Entries) -> bool {
        let merged = normalize(input.0);
        let keys: Vec<String> = merged.iter().map(|e| identity_key(&e.card)).collect();
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        deduped.len() == keys.len()
    }
}
