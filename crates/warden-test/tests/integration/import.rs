//! Bulk import jobs: all items or none.

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn import_installs_nodes_and_acls() {
    let unit = TestUnit::new().await;
    let editor = unit.role("editor").await;

    let items = vec![
        ImportItem::new("docs", NodeType::WebDavCollection).with_acl(AclDocument {
            base: None,
            aces: vec![AceDocument::href(unit.href(&editor), &[Privilege::Write])],
        }),
        ImportItem::new("docs/readme.txt", NodeType::File),
        ImportItem::new("svc", NodeType::ServiceCollection),
        ImportItem::new("svc/__src/main.js", NodeType::File),
    ];
    let job = unit
        .warden
        .start_import(unit.box_id, items)
        .await
        .expect("Failed to start import");

    let finished = unit.wait_for_import(job).await;
    assert_eq!(finished.status, ImportStatus::Ready);
    assert_eq!(finished.items, 4);
    assert!(finished.finished_at.is_some());

    let readme = unit
        .warden
        .resolve_path(CELL, "box1/docs/readme.txt")
        .await
        .expect("Imported file missing");
    unit.warden
        .resolve_path(CELL, "box1/svc/__src/main.js")
        .await
        .expect("Imported script missing");
    assert!(unit.allowed(&caller(&editor), Operation::Delete, readme).await);
}

#[test_log::test(tokio::test)]
async fn import_failure_leaves_tree_untouched() {
    let unit = TestUnit::with_limits(TreeLimits {
        max_collection_depth: 2,
        max_child_resource_count: 10,
    })
    .await;

    let items = vec![
        ImportItem::new("a", NodeType::WebDavCollection),
        ImportItem::new("a/b", NodeType::WebDavCollection),
        ImportItem::new("a/b/c", NodeType::WebDavCollection),
    ];
    let job = unit
        .warden
        .start_import(unit.box_id, items)
        .await
        .expect("Failed to start import");

    let finished = unit.wait_for_import(job).await;
    match finished.status {
        ImportStatus::Failed { code, .. } => assert_eq!(code, codes::COLLECTION_DEPTH_ERROR),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(unit.warden.resolve_path(CELL, "box1/a").await.is_err());
}

#[test_log::test(tokio::test)]
async fn invalid_acl_fails_the_whole_import() {
    let unit = TestUnit::new().await;
    let ghost = RoleRef::new(CELL, None, "ghost");

    let items = vec![
        ImportItem::new("docs", NodeType::WebDavCollection),
        ImportItem::new("docs/secret.txt", NodeType::File).with_acl(AclDocument {
            base: None,
            aces: vec![AceDocument::href(unit.href(&ghost), &[Privilege::Read])],
        }),
    ];
    let job = unit
        .warden
        .start_import(unit.box_id, items)
        .await
        .expect("Failed to start import");

    let finished = unit.wait_for_import(job).await;
    assert!(matches!(
        finished.status,
        ImportStatus::Failed { ref code, .. } if code == codes::ROLE_NOT_FOUND
    ));
    assert!(unit.warden.resolve_path(CELL, "box1/docs").await.is_err());
}

#[test_log::test(tokio::test)]
async fn import_targets_boxes_only() {
    let unit = TestUnit::new().await;
    let col = unit.collection(unit.box_id, "col").await;

    assert!(matches!(
        unit.warden.start_import(col, Vec::new()).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(unit.warden.import_status(JobId::new()).await.is_none());
}

#[test_log::test(tokio::test)]
async fn import_items_parse_from_json() {
    let unit = TestUnit::new().await;
    let items: Vec<ImportItem> = serde_json::from_str(
        r#"[
            {"path": "data", "node_type": "col.odata"},
            {"path": "data/Order", "node_type": "odata.schema"},
            {"path": "public", "node_type": "col.webdav", "acl": {"aces": [{"principal": ["all"], "grant": ["read"]}]}}
        ]"#,
    )
    .expect("Failed to parse import items");

    let job = unit
        .warden
        .start_import(unit.box_id, items)
        .await
        .expect("Failed to start import");
    assert_eq!(unit.wait_for_import(job).await.status, ImportStatus::Ready);

    let public = unit
        .warden
        .resolve_path(CELL, "box1/public")
        .await
        .expect("Imported collection missing");
    assert!(unit.allowed(&CallerIdentity::Anonymous, Operation::Read, public).await);
}
