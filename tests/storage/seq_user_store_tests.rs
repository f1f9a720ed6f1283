//! SeqUserStore interface tests.
//!
//! These tests verify the contract of the SeqUserStore trait.
//! Each storage implementation should run these tests.
//!
//! All user and conversation ids start with `test_` so backends with
//! persistent state can clean up between runs.

use std::collections::HashMap;

use seqstore::storage::{SeqField, SeqUserStore};

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Point reads
// =============================================================================

pub async fn test_unwritten_key_reads_zero<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_unwritten";
    let user = "test_user_unwritten";

    assert_eq!(store.get_max_seq(conversation, user).await.unwrap(), 0);
    assert_eq!(store.get_min_seq(conversation, user).await.unwrap(), 0);
    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 0);
}

// =============================================================================
// Unconditional setters
// =============================================================================

pub async fn test_set_max_seq_leaves_other_counters<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_set_max";
    let user = "test_user_set_max";

    store.set_max_seq(conversation, user, 20).await.unwrap();

    assert_eq!(store.get_max_seq(conversation, user).await.unwrap(), 20);
    assert_eq!(store.get_min_seq(conversation, user).await.unwrap(), 0);
    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 0);
}

pub async fn test_set_min_seq_leaves_other_counters<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_set_min";
    let user = "test_user_set_min";

    store.set_min_seq(conversation, user, 10).await.unwrap();

    assert_eq!(store.get_min_seq(conversation, user).await.unwrap(), 10);
    assert_eq!(store.get_max_seq(conversation, user).await.unwrap(), 0);
    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 0);
}

pub async fn test_setters_accept_decreasing_and_negative<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_unchecked";
    let user = "test_user_unchecked";

    store.set_max_seq(conversation, user, 50).await.unwrap();
    store.set_max_seq(conversation, user, 5).await.unwrap();
    assert_eq!(store.get_max_seq(conversation, user).await.unwrap(), 5);

    store.set_min_seq(conversation, user, -3).await.unwrap();
    assert_eq!(store.get_min_seq(conversation, user).await.unwrap(), -3);
}

pub async fn test_update_does_not_reset_other_counters<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_no_reset";
    let user = "test_user_no_reset";

    store.set_min_seq(conversation, user, 3).await.unwrap();
    store.set_read_seq(conversation, user, 4).await.unwrap();
    store.set_max_seq(conversation, user, 9).await.unwrap();

    assert_eq!(store.get_min_seq(conversation, user).await.unwrap(), 3);
    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 4);
    assert_eq!(store.get_max_seq(conversation, user).await.unwrap(), 9);
}

pub async fn test_field_generic_primitives<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_generic";
    let user = "test_user_generic";

    for (i, field) in SeqField::ALL.into_iter().enumerate() {
        store
            .set_seq(conversation, user, field, (i as i64 + 1) * 100)
            .await
            .unwrap();
    }

    assert_eq!(store.get_min_seq(conversation, user).await.unwrap(), 100);
    assert_eq!(store.get_max_seq(conversation, user).await.unwrap(), 200);
    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 300);
}

// =============================================================================
// Read position monotonicity
// =============================================================================

pub async fn test_read_seq_never_moves_backward<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_read_mono";
    let user = "test_user_read_mono";

    store.set_read_seq(conversation, user, 10).await.unwrap();
    store.set_read_seq(conversation, user, 4).await.unwrap();
    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 10);

    store.set_read_seq(conversation, user, 12).await.unwrap();
    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 12);
}

pub async fn test_read_seq_idempotent<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_read_idem";
    let user = "test_user_read_idem";

    store.set_read_seq(conversation, user, 8).await.unwrap();
    store.set_read_seq(conversation, user, 8).await.unwrap();

    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 8);
}

pub async fn test_read_seq_zero_materializes_record<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_read_zero";
    let user = "test_user_read_zero";

    // Equal to the implicit current value, so the write still happens.
    store.set_read_seq(conversation, user, 0).await.unwrap();

    let request = HashMap::from([(conversation.to_string(), ids(&[user]))]);
    let seqs = store.get_conversations_read_seqs(&request).await.unwrap();
    assert_eq!(seqs[conversation][user], 0);
}

pub async fn test_negative_read_seq_on_unwritten_key_is_noop<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_read_negative";
    let user = "test_user_read_negative";

    store.set_read_seq(conversation, user, -5).await.unwrap();

    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 0);
    let request = HashMap::from([(conversation.to_string(), ids(&[user]))]);
    let seqs = store.get_conversations_read_seqs(&request).await.unwrap();
    assert!(seqs.is_empty(), "no record should have been written");
}

pub async fn test_read_seq_regression_scenario<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_scenario";
    let user = "test_user_scenario";

    store.set_min_seq(conversation, user, 10).await.unwrap();
    store.set_max_seq(conversation, user, 20).await.unwrap();
    store.set_read_seq(conversation, user, 15).await.unwrap();
    store.set_read_seq(conversation, user, 12).await.unwrap();

    assert_eq!(store.get_min_seq(conversation, user).await.unwrap(), 10);
    assert_eq!(store.get_max_seq(conversation, user).await.unwrap(), 20);
    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 15);
}

pub async fn test_concurrent_read_seq_writers_keep_maximum<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_read_concurrent";
    let user = "test_user_read_concurrent";

    // Backends keyed by a non-unique index may race on the first insert.
    store.set_read_seq(conversation, user, 1).await.unwrap();

    let seqs = [7_i64, 3, 42, 19, 41, 0, 28];
    futures::future::try_join_all(
        seqs.iter()
            .map(|seq| store.set_read_seq(conversation, user, *seq)),
    )
    .await
    .unwrap();

    assert_eq!(store.get_read_seq(conversation, user).await.unwrap(), 42);
}

// =============================================================================
// Isolation
// =============================================================================

pub async fn test_key_isolation<S: SeqUserStore>(store: &S) {
    let user_a = "test_user_iso_a";
    let user_b = "test_user_iso_b";
    let conversation_x = "test_conv_iso_x";
    let conversation_y = "test_conv_iso_y";

    store.set_max_seq(conversation_x, user_a, 1).await.unwrap();
    store.set_max_seq(conversation_x, user_b, 2).await.unwrap();
    store.set_max_seq(conversation_y, user_a, 3).await.unwrap();

    assert_eq!(store.get_max_seq(conversation_x, user_a).await.unwrap(), 1);
    assert_eq!(store.get_max_seq(conversation_x, user_b).await.unwrap(), 2);
    assert_eq!(store.get_max_seq(conversation_y, user_a).await.unwrap(), 3);
    assert_eq!(store.get_max_seq(conversation_y, user_b).await.unwrap(), 0);
}

// =============================================================================
// Single-user batch
// =============================================================================

pub async fn test_get_read_seqs_empty_input<S: SeqUserStore>(store: &S) {
    let seqs = store.get_read_seqs("test_user_batch_empty", &[]).await.unwrap();
    assert!(seqs.is_empty());
}

pub async fn test_get_read_seqs_backfills_zero<S: SeqUserStore>(store: &S) {
    let user = "test_user_batch_fill";

    store.set_read_seq("test_conv_batch_c1", user, 5).await.unwrap();

    let seqs = store
        .get_read_seqs(user, &ids(&["test_conv_batch_c1", "test_conv_batch_c2"]))
        .await
        .unwrap();

    assert_eq!(
        seqs,
        HashMap::from([
            ("test_conv_batch_c1".to_string(), 5),
            ("test_conv_batch_c2".to_string(), 0),
        ])
    );
}

pub async fn test_get_read_seqs_scoped_to_user<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_batch_scope";

    store
        .set_read_seq(conversation, "test_user_batch_other", 99)
        .await
        .unwrap();

    let seqs = store
        .get_read_seqs("test_user_batch_self", &ids(&[conversation]))
        .await
        .unwrap();

    assert_eq!(seqs, HashMap::from([(conversation.to_string(), 0)]));
}

pub async fn test_get_read_seqs_ignores_other_counters<S: SeqUserStore>(store: &S) {
    let user = "test_user_batch_counters";
    let conversation = "test_conv_batch_counters";

    store.set_max_seq(conversation, user, 70).await.unwrap();
    store.set_read_seq(conversation, user, 60).await.unwrap();

    let seqs = store.get_read_seqs(user, &ids(&[conversation])).await.unwrap();
    assert_eq!(seqs[conversation], 60);
}

// =============================================================================
// Multi-conversation batch
// =============================================================================

pub async fn test_conversations_read_seqs_empty_input<S: SeqUserStore>(store: &S) {
    let seqs = store
        .get_conversations_read_seqs(&HashMap::new())
        .await
        .unwrap();
    assert!(seqs.is_empty());
}

pub async fn test_conversations_read_seqs_filters_users<S: SeqUserStore>(store: &S) {
    let conversation = "test_conv_multi_filter";

    store
        .set_read_seq(conversation, "test_user_multi_u1", 7)
        .await
        .unwrap();
    store
        .set_read_seq(conversation, "test_user_multi_u3", 9)
        .await
        .unwrap();

    let request = HashMap::from([(
        conversation.to_string(),
        ids(&["test_user_multi_u1", "test_user_multi_u2"]),
    )]);
    let seqs = store.get_conversations_read_seqs(&request).await.unwrap();

    // u2 has no record, u3 was not requested
    assert_eq!(
        seqs,
        HashMap::from([(
            conversation.to_string(),
            HashMap::from([("test_user_multi_u1".to_string(), 7)]),
        )])
    );
}

pub async fn test_conversations_read_seqs_per_conversation_users<S: SeqUserStore>(store: &S) {
    let conversation_a = "test_conv_multi_a";
    let conversation_b = "test_conv_multi_b";
    let conversation_c = "test_conv_multi_c";
    let user_1 = "test_user_multi_p1";
    let user_2 = "test_user_multi_p2";

    store.set_read_seq(conversation_a, user_1, 1).await.unwrap();
    store.set_read_seq(conversation_a, user_2, 2).await.unwrap();
    store.set_read_seq(conversation_b, user_1, 3).await.unwrap();
    store.set_read_seq(conversation_b, user_2, 4).await.unwrap();

    let request = HashMap::from([
        (conversation_a.to_string(), ids(&[user_1])),
        (conversation_b.to_string(), ids(&[user_2])),
        (conversation_c.to_string(), ids(&[user_1, user_2])),
    ]);
    let seqs = store.get_conversations_read_seqs(&request).await.unwrap();

    assert_eq!(seqs.len(), 2, "conversation without records is absent");
    assert_eq!(
        seqs[conversation_a],
        HashMap::from([(user_1.to_string(), 1)])
    );
    assert_eq!(
        seqs[conversation_b],
        HashMap::from([(user_2.to_string(), 4)])
    );
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all SeqUserStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_seq_user_store_tests {
    ($store:expr) => {
        use $crate::storage::seq_user_store_tests::*;

        // point reads
        test_unwritten_key_reads_zero($store).await;
        println!("  test_unwritten_key_reads_zero: PASSED");

        // unconditional setters
        test_set_max_seq_leaves_other_counters($store).await;
        println!("  test_set_max_seq_leaves_other_counters: PASSED");

        test_set_min_seq_leaves_other_counters($store).await;
        println!("  test_set_min_seq_leaves_other_counters: PASSED");

        test_setters_accept_decreasing_and_negative($store).await;
        println!("  test_setters_accept_decreasing_and_negative: PASSED");

        test_update_does_not_reset_other_counters($store).await;
        println!("  test_update_does_not_reset_other_counters: PASSED");

        test_field_generic_primitives($store).await;
        println!("  test_field_generic_primitives: PASSED");

        // read position
        test_read_seq_never_moves_backward($store).await;
        println!("  test_read_seq_never_moves_backward: PASSED");

        test_read_seq_idempotent($store).await;
        println!("  test_read_seq_idempotent: PASSED");

        test_read_seq_zero_materializes_record($store).await;
        println!("  test_read_seq_zero_materializes_record: PASSED");

        test_negative_read_seq_on_unwritten_key_is_noop($store).await;
        println!("  test_negative_read_seq_on_unwritten_key_is_noop: PASSED");

        test_read_seq_regression_scenario($store).await;
        println!("  test_read_seq_regression_scenario: PASSED");

        test_concurrent_read_seq_writers_keep_maximum($store).await;
        println!("  test_concurrent_read_seq_writers_keep_maximum: PASSED");

        // isolation
        test_key_isolation($store).await;
        println!("  test_key_isolation: PASSED");

        // single-user batch
        test_get_read_seqs_empty_input($store).await;
        println!("  test_get_read_seqs_empty_input: PASSED");

        test_get_read_seqs_backfills_zero($store).await;
        println!("  test_get_read_seqs_backfills_zero: PASSED");

        test_get_read_seqs_scoped_to_user($store).await;
        println!("  test_get_read_seqs_scoped_to_user: PASSED");

        test_get_read_seqs_ignores_other_counters($store).await;
        println!("  test_get_read_seqs_ignores_other_counters: PASSED");

        // multi-conversation batch
        test_conversations_read_seqs_empty_input($store).await;
        println!("  test_conversations_read_seqs_empty_input: PASSED");

        test_conversations_read_seqs_filters_users($store).await;
        println!("  test_conversations_read_seqs_filters_users: PASSED");

        test_conversations_read_seqs_per_conversation_users($store).await;
        println!("  test_conversations_read_seqs_per_conversation_users: PASSED");
    };
}
