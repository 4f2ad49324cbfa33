use simplemod_core::db::open_db_in_memory;
use simplemod_core::{
    parse_access_csv, AccessError, AccessGuard, AccessOperation, AccessRepoError, AccessRule,
    FieldValue, Record, RecordListQuery, RecordService, ServiceError, SqliteAccessRepository,
    SqliteRecordRepository, RECORD_ACCESS_CSV, RECORD_MODEL,
};
use std::collections::BTreeMap;

fn readonly_rule(group: &str) -> AccessRule {
    AccessRule {
        id: format!("access_simple_record_{group}_ro"),
        model: RECORD_MODEL.to_string(),
        group: group.to_string(),
        perm_read: true,
        perm_write: false,
        perm_create: false,
        perm_unlink: false,
    }
}

#[test]
fn guard_denies_by_default_when_no_rule_exists() {
    let guard = AccessGuard::new();

    for operation in [
        AccessOperation::Read,
        AccessOperation::Write,
        AccessOperation::Create,
        AccessOperation::Unlink,
    ] {
        let err = guard
            .assert_allowed(RECORD_MODEL, "base.group_user", operation)
            .expect_err("missing rule must deny");
        assert!(matches!(err, AccessError::NoRule { .. }));
    }
}

#[test]
fn guard_enforces_per_operation_flags() {
    let guard = AccessGuard::from_rules([readonly_rule("base.group_portal")])
        .expect("guard construction");

    guard
        .assert_allowed(RECORD_MODEL, "base.group_portal", AccessOperation::Read)
        .expect("read should be allowed");

    for operation in [
        AccessOperation::Write,
        AccessOperation::Create,
        AccessOperation::Unlink,
    ] {
        let err = guard
            .assert_allowed(RECORD_MODEL, "base.group_portal", operation)
            .expect_err("flag 0 must deny");
        assert!(matches!(err, AccessError::OperationDenied { .. }));
    }
}

#[test]
fn guard_rejects_duplicate_rule_for_same_pair() {
    let mut guard = AccessGuard::new();
    guard
        .insert_rule(readonly_rule("base.group_user"))
        .expect("first insert should succeed");
    let err = guard
        .insert_rule(readonly_rule("base.group_user"))
        .expect_err("duplicate pair must fail");
    assert!(matches!(err, AccessError::DuplicateRule { .. }));
}

#[test]
fn installed_csv_rules_roundtrip_through_storage() {
    let conn = open_db_in_memory().unwrap();
    let access_repo = SqliteAccessRepository::new(&conn);

    let rules = parse_access_csv(RECORD_ACCESS_CSV).expect("shipped csv parse");
    let installed = access_repo.install_rules(&rules).expect("rule install");
    assert_eq!(installed, 1);

    let loaded = access_repo.load_rules().expect("rule load");
    assert_eq!(loaded, rules);

    let guard = access_repo.load_guard().expect("guard load");
    guard
        .assert_allowed(RECORD_MODEL, "base.group_user", AccessOperation::Create)
        .expect("installed rule should allow create");
}

#[test]
fn reinstalling_same_rule_pair_fails() {
    let conn = open_db_in_memory().unwrap();
    let access_repo = SqliteAccessRepository::new(&conn);

    let rules = parse_access_csv(RECORD_ACCESS_CSV).expect("shipped csv parse");
    access_repo.install_rules(&rules).expect("first install");

    let err = access_repo
        .install_rules(&rules)
        .expect_err("duplicate install must fail");
    assert!(matches!(err, AccessRepoError::DuplicateRule { .. }));
}

#[test]
fn failed_install_batch_leaves_no_partial_rules_behind() {
    let conn = open_db_in_memory().unwrap();
    let access_repo = SqliteAccessRepository::new(&conn);

    let shipped = parse_access_csv(RECORD_ACCESS_CSV).expect("shipped csv parse");
    access_repo.install_rules(&shipped).expect("first install");

    // Second batch: a fresh rule for another model followed by a duplicate
    // of the already-installed (model, group) pair.
    let other_model = AccessRule {
        id: "access_other_model_user".to_string(),
        model: "other.model".to_string(),
        group: "base.group_user".to_string(),
        perm_read: true,
        perm_write: true,
        perm_create: true,
        perm_unlink: true,
    };
    let duplicate = AccessRule {
        id: "access_simple_record_user_again".to_string(),
        ..shipped[0].clone()
    };

    let err = access_repo
        .install_rules(&[other_model, duplicate])
        .expect_err("batch with duplicate pair must fail");
    assert!(matches!(err, AccessRepoError::DuplicateRule { .. }));

    let persisted = access_repo.load_rules().expect("rule load");
    assert_eq!(
        persisted, shipped,
        "failed batch must not leave earlier rows installed"
    );
}

#[test]
fn service_creates_and_reads_back_for_granted_group() {
    let conn = open_db_in_memory().unwrap();
    let access_repo = SqliteAccessRepository::new(&conn);
    let rules = parse_access_csv(RECORD_ACCESS_CSV).expect("shipped csv parse");
    access_repo.install_rules(&rules).expect("rule install");
    let guard = access_repo.load_guard().expect("guard load");

    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = RecordService::new(repo, guard, "base.group_user");

    let mut values = BTreeMap::new();
    values.insert("name".to_string(), FieldValue::Text("Test".to_string()));
    values.insert(
        "description".to_string(),
        FieldValue::Text("A test record.".to_string()),
    );
    let created = service.create_from_values(&values).expect("create");

    let loaded = service
        .get_record(created.uuid, false)
        .expect("read")
        .expect("created record should be visible");
    assert_eq!(loaded.name, "Test");
    assert_eq!(loaded.description.as_deref(), Some("A test record."));
    assert!(loaded.active);
}

#[test]
fn service_denies_operations_for_unknown_group() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let service = RecordService::new(repo, AccessGuard::new(), "base.group_public");

    let record = Record::new("blocked");
    let err = service.create_record(&record).expect_err("create must be denied");
    assert!(matches!(
        err,
        ServiceError::Access(AccessError::NoRule { .. })
    ));

    let err = service
        .list_records(&RecordListQuery::default())
        .expect_err("read must be denied");
    assert!(matches!(err, ServiceError::Access(_)));
}

#[test]
fn service_enforces_readonly_group_across_operations() {
    let conn = open_db_in_memory().unwrap();

    // Seed one record as a fully-privileged group first.
    let full_rules = parse_access_csv(RECORD_ACCESS_CSV).expect("shipped csv parse");
    let access_repo = SqliteAccessRepository::new(&conn);
    access_repo.install_rules(&full_rules).expect("rule install");
    let admin_guard = access_repo.load_guard().expect("guard load");
    let admin_repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let admin = RecordService::new(admin_repo, admin_guard, "base.group_user");
    let mut seeded = Record::new("seeded");
    admin.create_record(&seeded).expect("seed create");

    let readonly_guard = AccessGuard::from_rules([readonly_rule("base.group_portal")])
        .expect("guard construction");
    let readonly_repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let portal = RecordService::new(readonly_repo, readonly_guard, "base.group_portal");

    let listed = portal
        .list_records(&RecordListQuery::default())
        .expect("read should be allowed");
    assert_eq!(listed.len(), 1);

    seeded.description = Some("edited".to_string());
    let err = portal
        .update_record(&seeded)
        .expect_err("write must be denied");
    assert!(matches!(
        err,
        ServiceError::Access(AccessError::OperationDenied {
            operation: AccessOperation::Write,
            ..
        })
    ));

    let err = portal
        .archive_record(seeded.uuid)
        .expect_err("unlink must be denied");
    assert!(matches!(
        err,
        ServiceError::Access(AccessError::OperationDenied {
            operation: AccessOperation::Unlink,
            ..
        })
    ));

    // Denied operations must not have touched storage.
    let untouched = admin
        .get_record(seeded.uuid, false)
        .expect("read")
        .expect("record should still be active");
    assert_eq!(untouched.description, None);
}
