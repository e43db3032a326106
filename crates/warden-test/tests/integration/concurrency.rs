//! Decisions running alongside mutations.

use futures::future::join_all;

use super::helpers::*;

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn readers_never_see_half_replaced_acl() {
    let unit = TestUnit::new().await;
    let editor = unit.role("editor").await;
    let other = unit.role("other").await;
    let col = unit.collection(unit.box_id, "col").await;

    let full = vec![AceDocument::href(
        unit.href(&editor),
        &[Privilege::Read, Privilege::Write],
    )];
    let none = vec![AceDocument::href(unit.href(&other), &[Privilege::Read])];
    unit.set_aces(col, full.clone()).await;

    let writer = {
        let warden = unit.warden.clone();
        tokio::spawn(async move {
            for round in 0..50 {
                let aces = if round % 2 == 0 { none.clone() } else { full.clone() };
                warden
                    .set_acl(col, &AclDocument { base: None, aces })
                    .await
                    .expect("Failed to set ACL");
                tokio::task::yield_now().await;
            }
        })
    };

    let readers = (0..8).map(|_| {
        let warden = unit.warden.clone();
        let who = caller(&editor);
        tokio::spawn(async move {
            for _ in 0..50 {
                let granted = warden
                    .current_user_privileges(&who, col)
                    .await
                    .expect("Failed to list privileges");
                assert_eq!(
                    granted.contains(Privilege::Read),
                    granted.contains(Privilege::Write),
                    "observed a partial ACL"
                );
                tokio::task::yield_now().await;
            }
        })
    });

    for result in join_all(readers).await {
        result.expect("Reader task panicked");
    }
    writer.await.expect("Writer task panicked");
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_creates_respect_child_limit() {
    let unit = TestUnit::with_limits(TreeLimits {
        max_collection_depth: 5,
        max_child_resource_count: 5,
    })
    .await;
    let col = unit.collection(unit.box_id, "col").await;

    let attempts = (0..20).map(|index| {
        let warden = unit.warden.clone();
        tokio::spawn(async move {
            warden
                .create_node(col, &format!("f{index}"), NodeType::File)
                .await
        })
    });

    let mut created = 0;
    for result in join_all(attempts).await {
        match result.expect("Create task panicked") {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err.code(), codes::COLLECTION_CHILDRESOURCE_ERROR),
        }
    }
    assert_eq!(created, 5);

    let node = unit.warden.node(col).await.expect("Failed to load node");
    assert_eq!(node.child_count(), 5);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn role_deletion_is_atomic_for_readers() {
    let unit = TestUnit::new().await;
    let editor = unit.role("editor").await;
    let mut cols = Vec::new();
    for index in 0..5 {
        let col = unit.collection(unit.box_id, &format!("c{index}")).await;
        unit.grant(col, &editor, &[Privilege::Read]).await;
        cols.push(col);
    }

    let readers = cols.iter().map(|col| {
        let warden = unit.warden.clone();
        let who = caller(&editor);
        let col = *col;
        tokio::spawn(async move {
            let mut seen_denied = false;
            for _ in 0..50 {
                let allowed = warden
                    .authorize(&who, &AuthzRequest::new(Operation::Read, col))
                    .await
                    .expect("Failed to authorize")
                    .is_allowed();
                // once the role is gone it stays gone
                assert!(!(seen_denied && allowed), "grant reappeared");
                seen_denied |= !allowed;
                tokio::task::yield_now().await;
            }
        })
    });
    let readers: Vec<_> = readers.collect();

    let touched = unit
        .warden
        .delete_role(&editor)
        .await
        .expect("Failed to delete role");
    assert_eq!(touched, cols.len());

    for result in join_all(readers).await {
        result.expect("Reader task panicked");
    }
    for col in &cols {
        assert!(!unit.allowed(&caller(&editor), Operation::Read, *col).await);
    }
}
