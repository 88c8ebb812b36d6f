//! Replicated topology with slave groups and a default slave group

use athena_router::{Access, RouteReason, Target};

use crate::{database_of, session, DEFAULT_GROUP_DB, MASTER_DB};

#[test]
fn test_picks_slave_group_from_scope() {
    let session = session();

    // Writes land on the master
    let write = session.route("INSERT INTO cats (name) VALUES ('Thiago1')");
    assert_eq!(database_of(&write.connection), MASTER_DB);

    let on_master = session
        .using(Target::Master, |s| s.route("SELECT COUNT(*) FROM cats"))
        .unwrap();
    assert_eq!(database_of(&on_master.connection), MASTER_DB);

    let unscoped = session.route("SELECT COUNT(*) FROM cats");
    assert_eq!(database_of(&unscoped.connection), DEFAULT_GROUP_DB);

    let slaves1 = session
        .using(Target::slave_group("slaves1"), |s| s.resolve(Access::Read))
        .unwrap();
    assert_eq!(database_of(&slaves1), DEFAULT_GROUP_DB);

    let slaves2 = session
        .using(Target::slave_group("slaves2"), |s| s.resolve(Access::Read))
        .unwrap();
    assert_eq!(database_of(&slaves2), MASTER_DB);
}

#[test]
fn test_unscoped_reads_stay_in_default_group() {
    let session = session();
    session.route("INSERT INTO cats (name) VALUES ('Thiago1')");
    session.route("INSERT INTO cats (name) VALUES ('Thiago2')");

    // One master and four slaves: no read may leak out of slaves1
    for _ in 0..5 {
        let decision = session.route("SELECT COUNT(*) FROM cats");
        assert_eq!(decision.connection.name(), "slave11");
        assert_eq!(decision.reason, RouteReason::DefaultGroup);
    }
}

#[test]
fn test_keeps_group_inside_using_block() {
    let session = session();
    assert_eq!(database_of(&session.resolve(Access::Read)), DEFAULT_GROUP_DB);

    session
        .using(Target::slave_group("slaves2"), |s| {
            assert_eq!(s.resolve(Access::Read).name(), "slave21");
            assert_eq!(s.resolve(Access::Read).name(), "slave21");
        })
        .unwrap();
}

#[test]
fn test_keeps_slave_inside_using_block() {
    let session = session();
    assert_eq!(database_of(&session.resolve(Access::Read)), DEFAULT_GROUP_DB);

    for (slave, expected_db) in [
        ("slave21", MASTER_DB),
        ("slave31", MASTER_DB),
        ("slave32", DEFAULT_GROUP_DB),
    ] {
        session
            .using(Target::connection(slave), |s| {
                for _ in 0..2 {
                    let decision = s.decide(Access::Read);
                    assert_eq!(decision.connection.name(), slave);
                    assert_eq!(database_of(&decision.connection), expected_db);
                    assert_eq!(decision.reason, RouteReason::ExplicitConnection);
                }
            })
            .unwrap();
    }
}

#[test]
fn test_master_inside_using_block() {
    let session = session();
    assert_eq!(database_of(&session.resolve(Access::Read)), DEFAULT_GROUP_DB);

    session
        .using(Target::Master, |s| {
            for _ in 0..2 {
                let decision = s.decide(Access::Read);
                assert_eq!(decision.connection.name(), "master");
                assert_eq!(decision.reason, RouteReason::MasterScope);
            }
        })
        .unwrap();
}

#[test]
fn test_restores_previous_group_after_nested_block() {
    let session = session();

    session
        .using(Target::slave_group("slaves2"), |s| {
            s.using(Target::slave_group("slaves1"), |s| {
                assert_eq!(database_of(&s.resolve(Access::Read)), DEFAULT_GROUP_DB);
            })
            .unwrap();
            assert_eq!(database_of(&s.resolve(Access::Read)), MASTER_DB);
        })
        .unwrap();
}

#[test]
fn test_restores_previous_slave_after_nested_block() {
    let session = session();
    assert_eq!(database_of(&session.resolve(Access::Read)), DEFAULT_GROUP_DB);

    session
        .using(Target::connection("slave21"), |s| {
            s.using(Target::connection("slave11"), |s| {
                assert_eq!(database_of(&s.resolve(Access::Read)), DEFAULT_GROUP_DB);
            })
            .unwrap();
            assert_eq!(database_of(&s.resolve(Access::Read)), MASTER_DB);
        })
        .unwrap();

    assert_eq!(database_of(&session.resolve(Access::Read)), DEFAULT_GROUP_DB);
}

#[test]
fn test_multi_member_group_stays_in_group() {
    let session = session();
    session
        .using(Target::slave_group("slaves3"), |s| {
            for _ in 0..10 {
                let conn = s.resolve(Access::Read);
                assert!(conn.name() == "slave31" || conn.name() == "slave32");
                assert_eq!(conn.group(), Some("slaves3"));
            }
        })
        .unwrap();
}
