//! Decisions for same-node operations, callers and the method mapping.

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn grant_on_ancestor_covers_descendants() {
    let unit = TestUnit::new().await;
    let reader = unit.role("reader").await;
    let other = unit.role("other").await;
    let chain = unit.chain(3).await;
    let file = unit.file(chain[2], "a.txt").await;

    unit.grant(unit.box_id, &reader, &[Privilege::Read]).await;

    assert!(unit.allowed(&caller(&reader), Operation::Read, file).await);
    assert!(unit.allowed(&caller(&reader), Operation::Read, chain[0]).await);
    assert!(!unit.allowed(&caller(&other), Operation::Read, file).await);
    assert!(!unit.allowed(&caller(&reader), Operation::Write, file).await);
}

#[test_log::test(tokio::test)]
async fn grant_below_target_does_not_leak_upwards() {
    let unit = TestUnit::new().await;
    let reader = unit.role("reader").await;
    let chain = unit.chain(2).await;

    unit.grant(chain[1], &reader, &[Privilege::Read]).await;

    assert!(unit.allowed(&caller(&reader), Operation::Read, chain[1]).await);
    assert!(!unit.allowed(&caller(&reader), Operation::Read, chain[0]).await);
    assert!(!unit.allowed(&caller(&reader), Operation::Read, unit.box_id).await);
}

#[test_log::test(tokio::test)]
async fn grants_from_several_ancestors_combine() {
    let unit = TestUnit::new().await;
    let editor = unit.role("editor").await;
    let chain = unit.chain(2).await;

    unit.grant(unit.box_id, &editor, &[Privilege::Read]).await;
    unit.grant(chain[0], &editor, &[Privilege::WriteProperties]).await;

    let privileges = unit
        .warden
        .current_user_privileges(&caller(&editor), chain[1])
        .await
        .expect("Failed to list privileges");
    assert!(privileges.contains(Privilege::Read));
    assert!(privileges.contains(Privilege::WriteProperties));
    assert!(!privileges.contains(Privilege::Write));
}

#[test_log::test(tokio::test)]
async fn all_on_cell_satisfies_every_operation() {
    let unit = TestUnit::new().await;
    let admin = unit.cell_role("admin").await;
    let col = unit.collection(unit.box_id, "col").await;
    let file = unit.file(col, "a.txt").await;

    unit.grant(unit.cell, &admin, &[Privilege::All]).await;

    let who = caller(&admin);
    for operation in [
        Operation::Read,
        Operation::Write,
        Operation::ReadProperties,
        Operation::WriteProperties,
        Operation::ReadAcl,
        Operation::WriteAcl,
        Operation::SchemaRead,
        Operation::SchemaWrite,
        Operation::Exec,
    ] {
        assert!(unit.allowed(&who, operation, file).await, "{operation} denied");
    }
    assert!(unit.allowed(&who, Operation::Delete, file).await);
    assert!(unit.allowed(&who, Operation::CreateChild, col).await);
    assert!(unit.move_allowed(&who, file, unit.box_id).await);
}

#[test_log::test(tokio::test)]
async fn write_does_not_imply_acl_or_property_access() {
    let unit = TestUnit::new().await;
    let writer = unit.role("writer").await;
    let col = unit.collection(unit.box_id, "col").await;

    unit.grant(col, &writer, &[Privilege::Write]).await;

    let who = caller(&writer);
    assert!(unit.allowed(&who, Operation::Write, col).await);
    assert!(!unit.allowed(&who, Operation::Read, col).await);
    assert!(!unit.allowed(&who, Operation::ReadAcl, col).await);
    assert!(!unit.allowed(&who, Operation::WriteAcl, col).await);
    assert!(!unit.allowed(&who, Operation::WriteProperties, col).await);
}

#[test_log::test(tokio::test)]
async fn write_on_collection_allows_creating_members() {
    let unit = TestUnit::new().await;
    let writer = unit.role("writer").await;
    let binder = unit.role("binder").await;
    let reader = unit.role("reader").await;
    let col = unit.collection(unit.box_id, "col").await;

    unit.set_aces(
        col,
        vec![
            AceDocument::href(unit.href(&writer), &[Privilege::Write]),
            AceDocument::href(unit.href(&binder), &[Privilege::Bind]),
            AceDocument::href(unit.href(&reader), &[Privilege::Read]),
        ],
    )
    .await;

    assert!(unit.allowed(&caller(&writer), Operation::CreateChild, col).await);
    assert!(unit.allowed(&caller(&binder), Operation::CreateChild, col).await);
    assert!(!unit.allowed(&caller(&reader), Operation::CreateChild, col).await);
}

#[test_log::test(tokio::test)]
async fn anonymous_callers_get_only_everyone_grants() {
    let unit = TestUnit::new().await;
    let reader = unit.role("reader").await;
    let col = unit.collection(unit.box_id, "col").await;
    let private = unit.collection(unit.box_id, "private").await;

    unit.grant_all(col, &[Privilege::Read]).await;
    unit.grant(private, &reader, &[Privilege::Read]).await;

    let anonymous = CallerIdentity::Anonymous;
    assert!(unit.allowed(&anonymous, Operation::Read, col).await);
    assert!(!unit.allowed(&anonymous, Operation::Write, col).await);
    assert!(!unit.allowed(&anonymous, Operation::Read, private).await);

    // role holders get the everyone grant as well
    assert!(unit.allowed(&caller(&reader), Operation::Read, col).await);
}

#[test_log::test(tokio::test)]
async fn unknown_account_is_treated_as_anonymous() {
    let unit = TestUnit::new().await;
    let col = unit.collection(unit.box_id, "col").await;
    unit.grant_all(col, &[Privilege::Read, Privilege::Write]).await;

    let ghost = CallerIdentity::Account(AccountRef::new(CELL, "ghost"));
    assert!(unit.allowed(&ghost, Operation::Read, col).await);
    assert!(!unit.allowed(&ghost, Operation::ReadAcl, col).await);
}

#[test_log::test(tokio::test)]
async fn account_inherits_linked_roles() {
    let unit = TestUnit::new().await;
    let editor = unit.role("editor").await;
    let col = unit.collection(unit.box_id, "col").await;
    unit.grant(col, &editor, &[Privilege::Write]).await;

    let alice = AccountRef::new(CELL, "alice");
    unit.warden
        .create_account(alice.clone())
        .await
        .expect("Failed to create account");
    let who = CallerIdentity::Account(alice.clone());
    assert!(!unit.allowed(&who, Operation::Write, col).await);

    unit.warden
        .link_account_role(&alice, &editor)
        .await
        .expect("Failed to link role");
    assert!(unit.allowed(&who, Operation::Write, col).await);

    unit.warden
        .unlink_account_role(&alice, &editor)
        .await
        .expect("Failed to unlink role");
    assert!(!unit.allowed(&who, Operation::Write, col).await);
}

#[test_log::test(tokio::test)]
async fn box_scoped_and_unscoped_roles_are_distinct() {
    let unit = TestUnit::new().await;
    let scoped = unit.role("staff").await;
    let unscoped = unit.cell_role("staff").await;
    let col = unit.collection(unit.box_id, "col").await;

    unit.grant(col, &scoped, &[Privilege::Read]).await;

    assert!(unit.allowed(&caller(&scoped), Operation::Read, col).await);
    assert!(!unit.allowed(&caller(&unscoped), Operation::Read, col).await);
}

#[test_log::test(tokio::test)]
async fn master_caller_bypasses_evaluation() {
    let unit = TestUnit::new().await;
    let col = unit.collection(unit.box_id, "col").await;

    assert!(unit.allowed(&CallerIdentity::Master, Operation::WriteAcl, col).await);
    let privileges = unit
        .warden
        .current_user_privileges(&CallerIdentity::Master, col)
        .await
        .expect("Failed to list privileges");
    assert!(privileges.contains(Privilege::AlterSchema));

    let missing = unit
        .warden
        .authorize(&CallerIdentity::Master, &AuthzRequest::new(Operation::Read, NodeId::new()))
        .await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[test_log::test(tokio::test)]
async fn denial_maps_to_privilege_lacking() {
    let unit = TestUnit::new().await;
    let col = unit.collection(unit.box_id, "col").await;

    let err = unit
        .warden
        .require(&CallerIdentity::Anonymous, &AuthzRequest::new(Operation::Read, col))
        .await
        .expect_err("Anonymous read should be denied");
    assert_eq!(err.code(), codes::NECESSARY_PRIVILEGE_LACKING);
    assert_eq!(err.status(), 403);
}

#[test_log::test(tokio::test)]
async fn propfind_with_acl_needs_read_acl_too() {
    let unit = TestUnit::new().await;
    let viewer = unit.role("viewer").await;
    let col = unit.collection(unit.box_id, "col").await;
    unit.grant(col, &viewer, &[Privilege::ReadProperties]).await;

    let who = caller(&viewer);
    let plain = unit
        .warden
        .authorize_method(&who, HttpMethod::Propfind, MethodContext::existing(), col, None)
        .await
        .expect("Failed to authorize");
    assert_eq!(plain, AuthzResult::Allowed);

    let with_acl = unit
        .warden
        .authorize_method(
            &who,
            HttpMethod::Propfind,
            MethodContext::existing().with_acl(),
            col,
            None,
        )
        .await
        .expect("Failed to authorize");
    assert_eq!(with_acl, AuthzResult::Denied);
}

#[test_log::test(tokio::test)]
async fn schema_resources_need_alter_schema_to_change() {
    let unit = TestUnit::new().await;
    let modeler = unit.role("modeler").await;
    let odata = unit.create(unit.box_id, "odata", NodeType::ODataCollection).await;
    let entity = unit.create(odata, "Customer", NodeType::SchemaEntity).await;

    unit.grant(odata, &modeler, &[Privilege::Read, Privilege::Write]).await;

    let who = caller(&modeler);
    let read = unit
        .warden
        .authorize_method(&who, HttpMethod::Get, MethodContext::schema(), entity, None)
        .await
        .expect("Failed to authorize");
    assert_eq!(read, AuthzResult::Allowed);

    let write = unit
        .warden
        .authorize_method(&who, HttpMethod::Put, MethodContext::schema(), entity, None)
        .await
        .expect("Failed to authorize");
    assert_eq!(write, AuthzResult::Denied);

    unit.grant(odata, &modeler, &[Privilege::AlterSchema]).await;
    assert!(unit.allowed(&who, Operation::SchemaWrite, entity).await);
}

#[test_log::test(tokio::test)]
async fn service_endpoints_need_exec() {
    let unit = TestUnit::new().await;
    let runner = unit.role("runner").await;
    let svc = unit.create(unit.box_id, "svc", NodeType::ServiceCollection).await;
    unit.grant(svc, &runner, &[Privilege::Read]).await;

    let who = caller(&runner);
    let denied = unit
        .warden
        .authorize_method(&who, HttpMethod::Post, MethodContext::service(), svc, None)
        .await
        .expect("Failed to authorize");
    assert_eq!(denied, AuthzResult::Denied);

    unit.grant(svc, &runner, &[Privilege::Exec]).await;
    let allowed = unit
        .warden
        .authorize_method(&who, HttpMethod::Post, MethodContext::service(), svc, None)
        .await
        .expect("Failed to authorize");
    assert_eq!(allowed, AuthzResult::Allowed);
}

#[test_log::test(tokio::test)]
async fn schema_authz_flag_follows_the_box() {
    let unit = TestUnit::new().await;
    let strict = unit
        .warden
        .create_box(CELL, "strict", true)
        .await
        .expect("Failed to create box");
    let inside = unit.collection(strict, "col").await;
    let relaxed = unit.collection(unit.box_id, "col").await;

    assert!(
        unit.warden
            .requires_schema_authz(inside)
            .await
            .expect("Failed to read flag")
    );
    assert!(
        !unit
            .warden
            .requires_schema_authz(relaxed)
            .await
            .expect("Failed to read flag")
    );
}
