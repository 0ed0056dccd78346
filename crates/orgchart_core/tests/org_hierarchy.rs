use orgchart_core::db::{open_db, open_db_in_memory};
use orgchart_core::{
    ancestors_of, build_nodes, candidate_parents, check_integrity, count_roots, descendants_of,
    FetchError, MemberRecord, OrgBackend, OrgChartSession, OutlineRenderer, ParentPolicy,
    RootRecord, SecretaryRecord, SqliteOrgBackend, TransformError, TransformOptions,
};

fn seed(backend: &SqliteOrgBackend<'_>) {
    backend
        .set_root(&RootRecord {
            id: "a".to_string(),
            name: Some("Ada".to_string()),
            title: Some("CEO".to_string()),
            image_ref: Some("ada.png".to_string()),
            secretaries: Vec::new(),
        })
        .unwrap();
    backend.add_secretary(&SecretaryRecord::new("Sam")).unwrap();
    backend
        .upsert_member(&MemberRecord::new("b", "Ben", "VP", Some("a")))
        .unwrap();
    backend
        .upsert_member(&MemberRecord::new("c", "Cat", "Lead", Some("b")))
        .unwrap();
    backend
        .upsert_member(&MemberRecord::new("d", "Dee", "Analyst", Some("c")))
        .unwrap();
}

fn lenient() -> TransformOptions {
    TransformOptions::default()
}

#[test]
fn sqlite_directory_builds_a_valid_tree() {
    let conn = open_db_in_memory().unwrap();
    let backend = SqliteOrgBackend::try_new(&conn).unwrap();
    seed(&backend);

    let root = backend.fetch_root().unwrap();
    let members = backend.fetch_members().unwrap();
    let nodes = build_nodes(root.as_ref(), &members, &lenient()).unwrap();

    check_integrity(&nodes).unwrap();
    assert_eq!(count_roots(&nodes), 1);
    assert_eq!(nodes[0].id, "a");
    let last = nodes.last().unwrap();
    assert_eq!(last.id, "sec-0");
    assert!(last.is_secretary);
    assert_eq!(last.parent(), Some("a"));
}

#[test]
fn descendants_and_ancestors_agree() {
    let conn = open_db_in_memory().unwrap();
    let backend = SqliteOrgBackend::try_new(&conn).unwrap();
    seed(&backend);
    let nodes = build_nodes(
        backend.fetch_root().unwrap().as_ref(),
        &backend.fetch_members().unwrap(),
        &lenient(),
    )
    .unwrap();

    let below_b = descendants_of("b", &nodes);
    assert!(below_b.contains("c"));
    assert!(below_b.contains("d"));
    assert!(!below_b.contains("b"));
    assert!(!below_b.contains("a"));

    for node in &nodes {
        for ancestor in ancestors_of(&node.id, &nodes) {
            assert!(descendants_of(ancestor, &nodes).contains(node.id.as_str()));
        }
    }

    let offered: Vec<&str> = candidate_parents(&nodes, "b")
        .into_iter()
        .map(|node| node.id.as_str())
        .collect();
    assert_eq!(offered, vec!["a"]);
}

#[test]
fn dangling_parent_follows_policy() {
    let root = RootRecord::new("a");
    let members = vec![MemberRecord::new("x", "Xan", "Ops", Some("ghost"))];

    let nodes = build_nodes(Some(&root), &members, &lenient()).unwrap();
    assert_eq!(nodes[1].parent(), Some("a"));

    let strict = TransformOptions {
        policy: ParentPolicy::Strict,
        ..TransformOptions::default()
    };
    let err = build_nodes(Some(&root), &members, &strict).unwrap_err();
    assert!(matches!(err, TransformError::DanglingParent { .. }));
}

#[test]
fn member_cycle_is_reported_as_corrupt_data() {
    let conn = open_db_in_memory().unwrap();
    let backend = SqliteOrgBackend::try_new(&conn).unwrap();
    seed(&backend);
    backend
        .upsert_member(&MemberRecord::new("b", "Ben", "VP", Some("d")))
        .unwrap();

    let mut session = OrgChartSession::new(OutlineRenderer::new(), lenient());
    let err = session.load(&backend).unwrap_err();
    assert!(matches!(err, FetchError::Corrupt(_)));
    assert!(session.snapshot().is_none());
}

#[test]
fn saved_parent_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("org.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let backend = SqliteOrgBackend::try_new(&conn).unwrap();
        seed(&backend);

        let mut session = OrgChartSession::new(OutlineRenderer::new(), lenient());
        session.load(&backend).unwrap();
        session.click("d").unwrap();
        session.choose_parent(Some("b".to_string())).unwrap();
        session.save(&backend).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let backend = SqliteOrgBackend::try_new(&conn).unwrap();
    let mut session = OrgChartSession::new(OutlineRenderer::new(), lenient());
    session.load(&backend).unwrap();

    let snapshot = session.snapshot().unwrap();
    assert_eq!(snapshot.get("d").unwrap().parent(), Some("b"));
    assert_eq!(snapshot.children_of("b").count(), 2);
    assert_eq!(snapshot.get("a").unwrap().image_ref, "ada.png");
}

#[test]
fn unknown_member_update_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let backend = SqliteOrgBackend::try_new(&conn).unwrap();
    seed(&backend);

    let outcome = backend.update_parent("zz", Some("a")).unwrap();
    assert!(!outcome.success);
}
