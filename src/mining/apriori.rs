use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::MiningError;
use crate::vocabulary::VocabularySnapshot;

/// One basket of items, e.g. the symptom profile of a disease.
pub type Transaction = BTreeSet<String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentItemset {
    /// Sorted ascending.
    pub items: Vec<String>,
    /// Transactions containing every item.
    pub count: usize,
    /// `count / transactions`, in (0, 1].
    pub support: f64,
}

/// One transaction per disease holding its symptom profile names.
/// Diseases without associations are skipped.
pub fn transactions_from_snapshot(snapshot: &VocabularySnapshot) -> Vec<Transaction> {
    snapshot
        .diseases()
        .iter()
        .map(|d| {
            snapshot
                .profile_names(&d.disease_id)
                .into_iter()
                .map(str::to_string)
                .collect::<Transaction>()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Level-wise frequent itemset mining.
///
/// Output is ordered by itemset size, then lexicographically by items.
pub fn apriori(
    transactions: &[Transaction],
    min_support: f64,
) -> Result<Vec<FrequentItemset>, MiningError> {
    if !(min_support > 0.0 && min_support <= 1.0) {
        return Err(MiningError::InvalidSupport(min_support));
    }
    if transactions.is_empty() {
        return Err(MiningError::EmptyTransactions);
    }

    let total = transactions.len();
    let is_frequent = |count: usize| count as f64 / total as f64 >= min_support;

    let mut singles: BTreeMap<Vec<String>, usize> = BTreeMap::new();
    for transaction in transactions {
        for item in transaction {
            *singles.entry(vec![item.clone()]).or_default() += 1;
        }
    }
    let mut level: BTreeMap<Vec<String>, usize> = singles
        .into_iter()
        .filter(|(_, count)| is_frequent(*count))
        .collect();

    let mut out = Vec::new();
    let mut k = 1;
    while !level.is_empty() {
        tracing::debug!(size = k, frequent = level.len(), "Itemset level mined");
        out.extend(level.iter().map(|(items, &count)| FrequentItemset {
            items: items.clone(),
            count,
            support: count as f64 / total as f64,
        }));

        let candidates = generate_candidates(&level);
        level = candidates
            .into_iter()
            .map(|items| {
                let count = transactions
                    .iter()
                    .filter(|t| items.iter().all(|i| t.contains(i)))
                    .count();
                (items, count)
            })
            .filter(|(_, count)| is_frequent(*count))
            .collect();
        k += 1;
    }

    tracing::info!(
        transactions = total,
        min_support,
        itemsets = out.len(),
        "Frequent itemset mining complete"
    );
    Ok(out)
}

/// Join frequent k-itemsets sharing their first k-1 items, then drop any
/// candidate with an infrequent k-subset.
fn generate_candidates(level: &BTreeMap<Vec<String>, usize>) -> Vec<Vec<String>> {
    let itemsets: Vec<&Vec<String>> = level.keys().collect();
    let mut candidates = Vec::new();

    for (i, a) in itemsets.iter().enumerate() {
        let prefix = &a[..a.len() - 1];
        for b in &itemsets[i + 1..] {
            // Sorted keys: once the prefix differs, no later set shares it.
            if &b[..b.len() - 1] != prefix {
                break;
            }
            let mut candidate = (*a).clone();
            candidate.push(b[b.len() - 1].clone());

            let all_subsets_frequent = (0..candidate.len()).all(|skip| {
                let subset: Vec<String> = candidate
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != skip)
                    .map(|(_, item)| item.clone())
                    .collect();
                level.contains_key(&subset)
            });
            if all_subsets_frequent {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(items: &[&str]) -> Transaction {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn find<'a>(found: &'a [FrequentItemset], items: &[&str]) -> Option<&'a FrequentItemset> {
        found.iter().find(|f| f.items == items)
    }

    fn baskets() -> Vec<Transaction> {
        vec![
            tx(&["fever", "cough", "headache"]),
            tx(&["fever", "cough"]),
            tx(&["fever", "rash"]),
            tx(&["cough", "headache"]),
        ]
    }

    #[test]
    fn counts_singles_and_pairs() {
        let found = apriori(&baskets(), 0.5).unwrap();

        assert_eq!(find(&found, &["fever"]).unwrap().count, 3);
        assert_eq!(find(&found, &["cough"]).unwrap().count, 3);
        assert_eq!(find(&found, &["headache"]).unwrap().count, 2);
        assert!(find(&found, &["rash"]).is_none());

        let pair = find(&found, &["cough", "fever"]).unwrap();
        assert_eq!(pair.count, 2);
        assert_eq!(pair.support, 0.5);
        assert!(find(&found, &["cough", "headache"]).is_some());
        assert!(find(&found, &["fever", "headache"]).is_none());
        assert!(find(&found, &["cough", "fever", "headache"]).is_none());
    }

    #[test]
    fn output_is_sorted_by_size_then_items() {
        let found = apriori(&baskets(), 0.5).unwrap();
        let items: Vec<Vec<String>> = found.into_iter().map(|f| f.items).collect();
        let mut sorted = items.clone();
        sorted.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        assert_eq!(items, sorted);
    }

    #[test]
    fn full_support_keeps_only_universal_items() {
        let transactions = vec![tx(&["a", "b", "c"]), tx(&["a", "b"]), tx(&["a", "b", "d"])];
        let found = apriori(&transactions, 1.0).unwrap();
        let items: Vec<Vec<String>> = found.into_iter().map(|f| f.items).collect();
        assert_eq!(
            items,
            vec![vec!["a".to_string()], vec!["b".to_string()], vec!["a".to_string(), "b".to_string()]]
        );
    }

    #[test]
    fn finds_triples() {
        let transactions = vec![
            tx(&["a", "b", "c"]),
            tx(&["a", "b", "c", "d"]),
            tx(&["a", "b", "c"]),
            tx(&["d"]),
        ];
        let found = apriori(&transactions, 0.75).unwrap();
        let triple = find(&found, &["a", "b", "c"]).unwrap();
        assert_eq!(triple.count, 3);
        assert!(find(&found, &["d"]).is_none());
    }

    #[test]
    fn rejects_bad_support_and_empty_input() {
        assert_eq!(
            apriori(&baskets(), 0.0).unwrap_err(),
            MiningError::InvalidSupport(0.0)
        );
        assert!(apriori(&baskets(), 1.5).is_err());
        assert_eq!(apriori(&[], 0.5).unwrap_err(), MiningError::EmptyTransactions);
    }

    #[test]
    fn snapshot_transactions_are_disease_profiles() {
        let snapshot = VocabularySnapshot::load_test();
        let transactions = transactions_from_snapshot(&snapshot);
        assert_eq!(transactions.len(), 6);
        assert!(transactions[0].contains("lethargy"));

        // Fever sits in four of six profiles, above a one-half threshold.
        let found = apriori(&transactions, 0.5).unwrap();
        let fever = find(&found, &["fever"]).unwrap();
        assert_eq!(fever.count, 4);
        assert!(find(&found, &["rash"]).is_none());
    }
}
