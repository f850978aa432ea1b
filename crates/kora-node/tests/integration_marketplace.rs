//! Marketplace flow over the wired node context

use kora_chain::MockStakingClient;
use kora_core::{KoraError, OpportunityKind, SubmissionStatus, UserId};
use kora_node::{KoraConfig, KoraNode, NodeContext};
use kora_storage::{Profile, Role};
use std::sync::Arc;

fn context() -> Arc<NodeContext> {
    KoraNode::with_client(KoraConfig::default(), Arc::new(MockStakingClient::new()))
        .unwrap()
        .context()
}

fn user(ctx: &NodeContext, name: &str, role: Role) -> UserId {
    let profile = Profile::new(name.to_string(), role, "USD".to_string());
    let id = profile.user_id;
    ctx.profiles.upsert(profile);
    id
}

#[tokio::test]
async fn post_submit_review_notifies_talent() {
    let ctx = context();
    let sponsor = user(&ctx, "sponsor", Role::Sponsor);
    let talent = user(&ctx, "talent", Role::Talent);

    let opportunity = ctx
        .opportunities
        .create(
            sponsor,
            "Translate docs",
            OpportunityKind::Bounty { reward: 400.0 },
            "Translate the product docs",
            "writing",
        )
        .unwrap();

    let submission = ctx
        .submissions
        .submit(
            talent,
            opportunity.id,
            "Docs translation",
            "https://example.com/work",
            "done",
        )
        .unwrap();

    ctx.submissions
        .review(&sponsor, &submission.id, SubmissionStatus::Approved)
        .unwrap();

    let notes = ctx.notifications.list_for_user(&talent);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, "submission_reviewed");
    assert_eq!(ctx.notifications.unread_count(&talent), 1);
}

#[tokio::test]
async fn duplicate_submission_is_a_conflict() {
    let ctx = context();
    let sponsor = user(&ctx, "sponsor", Role::Sponsor);
    let talent = user(&ctx, "talent", Role::Talent);

    let opportunity = ctx
        .opportunities
        .create(
            sponsor,
            "Build a dashboard",
            OpportunityKind::Rfp { budget: 12_000.0 },
            "desc",
            "development",
        )
        .unwrap();

    ctx.submissions
        .submit(talent, opportunity.id, "v1", "https://a", "")
        .unwrap();
    let result = ctx
        .submissions
        .submit(talent, opportunity.id, "v2", "https://b", "");

    assert!(matches!(result, Err(KoraError::Conflict(_))));
    assert_eq!(ctx.submissions.list_for_user(&talent).len(), 1);
}

#[tokio::test]
async fn role_upgrade_unlocks_posting() {
    let ctx = context();
    let admin = user(&ctx, "admin", Role::Admin);
    let talent = user(&ctx, "aspiring", Role::Talent);

    // talent cannot post yet
    let denied = ctx.opportunities.create(
        talent,
        "Early",
        OpportunityKind::Grant { max_amount: 1_000.0 },
        "d",
        "c",
    );
    assert!(matches!(denied, Err(KoraError::Forbidden(_))));

    let request = ctx.roles.request_sponsor(talent).unwrap();
    ctx.roles.approve(&admin, &request.id).unwrap();

    ctx.opportunities
        .create(
            talent,
            "First grant",
            OpportunityKind::Grant { max_amount: 1_000.0 },
            "d",
            "c",
        )
        .unwrap();
}

#[tokio::test]
async fn referral_points_accumulate_through_service() {
    let ctx = context();
    let referrer = user(&ctx, "ref", Role::Talent);
    let a = user(&ctx, "a", Role::Talent);
    let b = user(&ctx, "b", Role::Talent);

    ctx.referrals.record(referrer, a).unwrap();
    ctx.referrals.record(referrer, b).unwrap();

    assert_eq!(ctx.referrals.points(&referrer), 200);
    assert_eq!(ctx.referrals.history(&referrer).len(), 2);
}
