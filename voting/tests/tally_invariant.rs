//! Property tests for the ledger's tally bookkeeping.

use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use proptest::prelude::*;
use tally_nullables::NullProjectStore;
use tally_store::ProjectStore;
use tally_types::{Participant, ParticipantId, Project, ProjectId, Timestamp, TokenAmount, WalletAddress};
use tally_voting::{StoreAccess, VoteLedger};

/// A weight with up to 30 fractional digits, rendered as a plain decimal.
fn weight() -> impl Strategy<Value = TokenAmount> {
    (any::<u64>(), 0u32..30).prop_map(|(digits, scale)| {
        TokenAmount::parse(&format!("{digits}e-{scale}")).unwrap()
    })
}

fn seeded_store() -> Arc<NullProjectStore> {
    let store = Arc::new(NullProjectStore::new());
    let mut project = Project::new(
        "p1",
        "Round",
        Timestamp::from_millis(1000),
        Timestamp::from_millis(2000),
        vec![
            Participant::new("a", "Alice"),
            Participant::new("b", "Bob"),
            Participant::new("c", "Carol"),
        ],
    );
    store.save(&mut project).unwrap();
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Each participant's tally equals the exact sum of the weights recorded
    /// for it, whatever the order and size of the votes.
    #[test]
    fn tally_equals_sum_of_recorded_weights(
        votes in prop::collection::vec((0usize..3, weight()), 1..24)
    ) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let store = seeded_store();
        let ledger = VoteLedger::new(StoreAccess::new(store.clone(), Duration::from_secs(5)), 3);
        let ids = ["a", "b", "c"];

        let mut expected = vec![BigDecimal::from(0u32); 3];
        rt.block_on(async {
            for (i, (target, amount)) in votes.iter().enumerate() {
                let mut bytes = [0u8; 20];
                bytes[..8].copy_from_slice(&(i as u64 + 1).to_be_bytes());
                ledger
                    .record_vote(
                        &ProjectId::new("p1"),
                        &ParticipantId::new(ids[*target]),
                        &WalletAddress::from_bytes(bytes),
                        amount.clone(),
                        Timestamp::from_millis(1500),
                    )
                    .await
                    .unwrap();
                expected[*target] += amount.as_decimal();
            }
        });

        let project = store.find_by_id(&ProjectId::new("p1")).unwrap().unwrap();
        prop_assert_eq!(project.vote_history.len(), votes.len());
        for (idx, id) in ids.iter().enumerate() {
            let participant = project.participant(&ParticipantId::new(*id)).unwrap();
            prop_assert_eq!(participant.vote_count.as_decimal(), &expected[idx]);
            prop_assert_eq!(
                project.recorded_weight_for(&ParticipantId::new(*id)),
                participant.vote_count.clone()
            );
        }
    }
}
