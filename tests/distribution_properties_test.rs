//! Property-based tests for the even-split distribution.

use lead_splitter::core::distribution::{allocate, split_sizes};
use lead_splitter::domain::model::{Agent, LeadRecord};
use lead_splitter::domain::ports::ListStore;
use lead_splitter::{DistributionEngine, LeadError, MemoryStore};
use proptest::prelude::*;

fn agents(count: usize) -> Vec<Agent> {
    (0..count)
        .map(|i| Agent {
            id: format!("agent-{}", i),
            name: format!("Agent {}", i),
            email: format!("agent{}@example.com", i),
            mobile: format!("+1555{:04}", i),
        })
        .collect()
}

fn leads(count: usize) -> Vec<LeadRecord> {
    (0..count)
        .map(|i| LeadRecord {
            first_name: format!("Lead{}", i),
            phone: format!("{}", 5_550_000 + i),
            notes: format!("row {}", i),
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_sizes_sum_to_item_count(n in 0usize..1000, m in 1usize..50) {
        let sizes = split_sizes(n, m).unwrap();
        prop_assert_eq!(sizes.len(), m);
        prop_assert_eq!(sizes.iter().sum::<usize>(), n);
    }

    #[test]
    fn prop_first_remainder_agents_get_one_extra(n in 0usize..1000, m in 1usize..50) {
        let sizes = split_sizes(n, m).unwrap();
        let base = n / m;
        let remainder = n % m;
        for (i, size) in sizes.iter().enumerate() {
            let expected = if i < remainder { base + 1 } else { base };
            prop_assert_eq!(*size, expected);
        }
    }

    #[test]
    fn prop_non_empty_allocations_differ_by_at_most_one(n in 1usize..500, m in 1usize..40) {
        let items = leads(n);
        let roster = agents(m);
        let allocations = allocate(&items, &roster).unwrap();

        let counts: Vec<usize> = allocations.iter().map(|a| a.items.len()).collect();
        let max = *counts.iter().max().unwrap();
        let min = *counts.iter().min().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(counts.iter().all(|c| *c > 0));
        prop_assert_eq!(allocations.len(), n.min(m));
    }

    #[test]
    fn prop_concatenation_reproduces_input(n in 0usize..300, m in 1usize..30) {
        let items = leads(n);
        let roster = agents(m);
        let allocations = allocate(&items, &roster).unwrap();

        let rebuilt: Vec<LeadRecord> = allocations
            .iter()
            .flat_map(|a| a.items.iter().cloned())
            .collect();
        prop_assert_eq!(rebuilt, items);
    }

    #[test]
    fn prop_allocation_is_deterministic(n in 0usize..200, m in 1usize..20) {
        let items = leads(n);
        let roster = agents(m);
        let first = allocate(&items, &roster).unwrap();
        let second = allocate(&items, &roster).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_engine_stores_exactly_what_it_reports(n in 0usize..60, m in 1usize..8) {
        tokio_test::block_on(async {
            let store = MemoryStore::with_agents(agents(m));
            let engine = DistributionEngine::new(store.clone(), store.clone());
            let items = leads(n);

            let results = engine.distribute(&items, "admin").await.unwrap();
            let stored = store.all_lists().await.unwrap();

            assert_eq!(results.len(), stored.len());
            assert_eq!(results.iter().map(|r| r.item_count).sum::<usize>(), n);
            for (result, list) in results.iter().zip(&stored) {
                assert_eq!(result.list_id, list.id);
                assert_eq!(result.agent_id, list.agent_id);
                assert_eq!(result.item_count, list.items.len());
            }

            let rebuilt: Vec<LeadRecord> = stored.into_iter().flat_map(|l| l.items).collect();
            assert_eq!(rebuilt, items);
        });
    }
}

#[tokio::test]
async fn test_ten_leads_three_agents() {
    let store = MemoryStore::with_agents(agents(3));
    let engine = DistributionEngine::new(store.clone(), store.clone());

    let results = engine.distribute(&leads(10), "admin").await.unwrap();

    let shape: Vec<(&str, usize)> = results
        .iter()
        .map(|r| (r.agent_id.as_str(), r.item_count))
        .collect();
    assert_eq!(shape, vec![("agent-0", 4), ("agent-1", 3), ("agent-2", 3)]);
}

#[tokio::test]
async fn test_two_leads_five_agents() {
    let store = MemoryStore::with_agents(agents(5));
    let engine = DistributionEngine::new(store.clone(), store.clone());

    let results = engine.distribute(&leads(2), "admin").await.unwrap();

    let shape: Vec<(&str, usize)> = results
        .iter()
        .map(|r| (r.agent_id.as_str(), r.item_count))
        .collect();
    assert_eq!(shape, vec![("agent-0", 1), ("agent-1", 1)]);
    for idle in ["agent-2", "agent-3", "agent-4"] {
        assert!(store.lists_for_agent(idle).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_no_agents_fails_and_stores_nothing() {
    let store = MemoryStore::default();
    let engine = DistributionEngine::new(store.clone(), store.clone());

    let err = engine.distribute(&leads(5), "admin").await.unwrap_err();

    assert!(matches!(err, LeadError::NoAgents));
    assert!(store.all_lists().await.unwrap().is_empty());
}
