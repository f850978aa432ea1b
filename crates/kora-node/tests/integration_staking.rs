//! End-to-end staking flow over the wired node context

use kora_chain::{LocalSigner, MockStakingClient, MockTx, WalletSigner};
use kora_core::KoraError;
use kora_economics::ONE_TOKEN;
use kora_node::{KoraConfig, KoraNode};
use kora_storage::{Profile, Role};
use std::sync::Arc;

fn node_with_mock() -> (KoraNode, Arc<MockStakingClient>) {
    let client = Arc::new(MockStakingClient::new());
    let node = KoraNode::with_client(KoraConfig::default(), client.clone()).unwrap();
    (node, client)
}

#[tokio::test]
async fn delegation_persists_stake_and_reloads_list() {
    let (node, client) = node_with_mock();
    let ctx = node.context();

    let profile = Profile::new("ada".to_string(), Role::Talent, "NGN".to_string());
    let user_id = profile.user_id;
    ctx.profiles.upsert(profile);

    let signer = LocalSigner::from_label("ada-wallet");
    client.set_balance(signer.address(), 100_000 * ONE_TOKEN);

    let orchestrator = ctx.directory.list(1).remove(0);
    let receipt = ctx
        .submitter
        .delegate(&signer, user_id, &orchestrator, 50_000.0, "NGN")
        .await
        .unwrap();

    // the receipt's stake list is the store's full reload
    assert_eq!(receipt.stakes.len(), 1);
    assert_eq!(ctx.stakes.list_by_user(&user_id).len(), 1);
    assert_eq!(receipt.stake.orchestrator_name, orchestrator.name);
    assert_eq!(receipt.stake.apy, orchestrator.apy);

    // approve then delegate hit the chain, in that order
    let txs = client.transactions();
    assert!(matches!(txs[0], MockTx::Approve { .. }));
    assert!(matches!(txs[1], MockTx::Delegate { .. }));
}

#[tokio::test]
async fn insufficient_balance_issues_no_transactions() {
    let (node, client) = node_with_mock();
    let ctx = node.context();

    let profile = Profile::new("broke".to_string(), Role::Talent, "USD".to_string());
    let user_id = profile.user_id;
    ctx.profiles.upsert(profile);

    let signer = LocalSigner::from_label("broke-wallet");
    let orchestrator = ctx.directory.list(1).remove(0);

    let result = ctx
        .submitter
        .delegate(&signer, user_id, &orchestrator, 100.0, "USD")
        .await;

    assert!(matches!(
        result,
        Err(KoraError::InsufficientBalance { .. })
    ));
    assert_eq!(client.transaction_count(), 0);
    assert!(ctx.stakes.list_by_user(&user_id).is_empty());
}

#[tokio::test]
async fn retry_after_delegate_failure_skips_second_approve() {
    let (node, client) = node_with_mock();
    let ctx = node.context();

    let profile = Profile::new("retry".to_string(), Role::Talent, "USD".to_string());
    let user_id = profile.user_id;
    ctx.profiles.upsert(profile);

    let signer = LocalSigner::from_label("retry-wallet");
    client.set_balance(signer.address(), 10_000 * ONE_TOKEN);
    client.fail_next_delegate();

    let orchestrator = ctx.directory.list(1).remove(0);
    assert!(ctx
        .submitter
        .delegate(&signer, user_id, &orchestrator, 100.0, "USD")
        .await
        .is_err());

    ctx.submitter
        .delegate(&signer, user_id, &orchestrator, 100.0, "USD")
        .await
        .unwrap();

    // one approve total across both attempts
    let approvals = client
        .transactions()
        .iter()
        .filter(|tx| matches!(tx, MockTx::Approve { .. }))
        .count();
    assert_eq!(approvals, 1);
}

#[tokio::test]
async fn fee_withdrawal_requires_pending_fees() {
    let (node, client) = node_with_mock();
    let ctx = node.context();

    let signer = LocalSigner::from_label("fees-wallet");
    assert!(ctx.submitter.withdraw_fees(&signer).await.is_err());

    client.set_pending_fees(signer.address(), 5 * ONE_TOKEN);
    ctx.submitter.withdraw_fees(&signer).await.unwrap();
}
