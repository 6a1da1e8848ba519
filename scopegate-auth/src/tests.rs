// SPDX-License-Identifier: MIT OR Apache-2.0

use scopegate_core::{Predicate, Value};
use serde_json::json;

use crate::context::AuthContext;
use crate::document::ResourceDocument;
use crate::engine::AccessControl;
use crate::permission::{Action, Domain, Permission};
use crate::registry::ScopeKind;
use crate::test_utils::{access_control, admin, agent, document, entity_schemas, policy_config};

const RESOURCE_TYPES: [&str; 6] = [
    "clienti",
    "conferme-ordine",
    "fatture",
    "rapportini",
    "note",
    "not-registered",
];

#[test]
fn admin_bypasses_every_check() {
    let access = access_control();
    let admin = admin();

    for domain in Domain::ALL {
        for action in Action::ALL {
            let permission = Permission::new(domain, action);
            assert!(access.has_permission(&admin, permission, None));
            for resource_type in RESOURCE_TYPES {
                assert!(access.has_permission(&admin, permission, Some(resource_type)));
            }
        }
    }

    for resource_type in RESOURCE_TYPES {
        assert_eq!(access.access_filter(&admin, resource_type), Predicate::True);
        assert_eq!(
            access.access_filter_in(&admin, Domain::Event, resource_type),
            Predicate::True
        );
    }
    assert_eq!(access.basic_access_filter(&admin), Predicate::True);
    assert_eq!(access.access_filter(&admin, "clienti").to_mongo(), json!({}));

    let frozen = ResourceDocument::new("U2").with_visibility(["PublicReadOnly"]);
    assert!(access.can_edit_or_delete_resource(
        &admin,
        &frozen,
        Domain::Entity,
        Action::Delete,
        Some("conferme-ordine")
    ));
}

#[test]
fn unknown_roles_fail_closed() {
    let access = access_control();
    let ghost = AuthContext::new("U9", "Ghost", false);

    assert!(!access.has_permission(&ghost, "entity.view".parse().unwrap(), None));
    for action in Action::ALL {
        assert!(!access.has_permission(
            &ghost,
            Permission::new(Domain::Entity, action),
            Some("note")
        ));
    }

    let public = ResourceDocument::new("U2").with_visibility(["Public"]);
    assert!(!access.can_edit_or_delete_resource(
        &ghost,
        &public,
        Domain::Entity,
        Action::Edit,
        None
    ));

    // Reads stay limited to owned and broadcast documents.
    let filter = access.access_filter(&ghost, "conferme-ordine");
    assert_eq!(filter, access.basic_access_filter(&ghost));
    assert!(filter.matches(&document("U9", &[])));
    assert!(filter.matches(&document("U2", &["Public"])));
    assert!(!filter.matches(&document("U2", &["Agente"])));
}

#[test]
fn owners_always_see_their_documents() {
    let access = access_control();
    let principals = [
        agent(),
        AuthContext::new("U1", "Cliente", false),
        AuthContext::new("U1", "Amministrazione", false),
        AuthContext::new("U1", "Ghost", false),
    ];

    for auth in &principals {
        for resource_type in RESOURCE_TYPES {
            let filter = access.access_filter(auth, resource_type);
            assert!(filter.matches(&document("U1", &[])));
            assert!(filter.matches(&document("U1", &["Cliente"])));
            assert!(filter.matches(&document("U1", &["PublicReadOnly"])));
            assert!(!filter.matches(&document("U2", &[])));
        }
    }
}

#[test]
fn broadcast_markers() {
    let access = access_control();

    for role in ["Agente", "Cliente", "Amministrazione", "Ghost"] {
        let auth = AuthContext::new("U1", role, false);
        let filter = access.access_filter(&auth, "conferme-ordine");

        assert!(filter.matches(&document("U2", &["Public"])));
        assert!(filter.matches(&document("U2", &["PublicReadOnly"])));
        assert!(filter.matches(&document("U2", &[role])));
        assert!(!filter.matches(&document("U2", &["Segreteria"])));
    }

    // Readable, but only the owner may mutate it.
    let frozen = ResourceDocument::new("U2").with_visibility(["PublicReadOnly"]);
    let office = AuthContext::new("U1", "Amministrazione", false);
    let owner = AuthContext::new("U2", "Amministrazione", false);
    for action in [Action::Edit, Action::Delete] {
        assert!(!access.can_edit_or_delete_resource(
            &office,
            &frozen,
            Domain::Entity,
            action,
            Some("conferme-ordine")
        ));
        assert!(access.can_edit_or_delete_resource(
            &owner,
            &frozen,
            Domain::Entity,
            action,
            Some("conferme-ordine")
        ));
    }

    let public = ResourceDocument::new("U2").with_visibility(["Public"]);
    assert!(access.can_edit_or_delete_resource(
        &office,
        &public,
        Domain::Entity,
        Action::Delete,
        Some("conferme-ordine")
    ));
}

#[test]
fn reference_rule_expands_reads() {
    let access = access_control();
    let agent = agent();

    let filter = access.access_filter(&agent, "conferme-ordine");
    let confirmation = json!({
        "_id": "O1",
        "owner": "U7",
        "visibilityRoles": [],
        "data": { "codiceCliente": "C1" }
    });
    assert!(filter.matches(&confirmation));
    assert!(!filter.matches(&json!({
        "owner": "U7",
        "visibilityRoles": [],
        "data": { "codiceCliente": "C2" }
    })));

    // Same rule on a resource type where the field is not declared as a reference.
    let filter = access.access_filter(&agent, "fatture");
    assert_eq!(filter, access.basic_access_filter(&agent));
    assert!(!filter.matches(&confirmation));
}

#[test]
fn group_membership_rule_expands_reads() {
    let access = access_control();
    let agent = AuthContext::new("U1", "Agente", false)
        .with_keys(ScopeKind::Group, "agenti", ["G1"]);

    let filter = access.access_filter(&agent, "rapportini");
    let report = |groups: serde_json::Value| {
        json!({
            "owner": "U7",
            "visibilityRoles": [],
            "groups": groups
        })
    };

    assert!(filter.matches(&report(json!([{ "groupId": "G1", "groupType": "agenti" }]))));
    assert!(filter.matches(&report(json!([
        { "groupId": "G9", "groupType": "agenti" },
        { "groupId": "G1", "groupType": "agenti" }
    ]))));
    assert!(!filter.matches(&report(json!([{ "groupId": "G1", "groupType": "classi" }]))));
    assert!(!filter.matches(&report(json!([{ "groupId": "G2", "groupType": "agenti" }]))));
    assert!(!filter.matches(&report(json!([]))));
}

#[test]
fn rules_only_apply_to_listed_roles() {
    let access = access_control();
    let customer = AuthContext::new("U3", "Cliente", false)
        .with_keys(ScopeKind::Entity, "clienti", ["C1"])
        .with_keys(ScopeKind::Group, "agenti", ["G1"]);

    let filter = access.access_filter(&customer, "conferme-ordine");
    assert_eq!(filter, access.basic_access_filter(&customer));

    let filter = access.access_filter(&customer, "rapportini");
    assert_eq!(filter, access.basic_access_filter(&customer));

    // The self rule of `clienti` lists the customer role.
    let filter = access.access_filter(&customer, "clienti");
    assert_eq!(filter.branch_count(), 3);
    assert!(filter.matches(&json!({ "_id": "C1", "owner": "U0", "visibilityRoles": [] })));
    assert!(!filter.matches(&json!({ "_id": "C2", "owner": "U0", "visibilityRoles": [] })));
}

#[test]
fn filters_are_deterministic() {
    let access = access_control();
    let first = AuthContext::new("U1", "Agente", false)
        .with_keys(ScopeKind::Group, "agenti", ["G1", "G2"])
        .with_keys(ScopeKind::Entity, "clienti", ["C1", "C2"]);
    let second = AuthContext::new("U1", "Agente", false)
        .with_keys(ScopeKind::Entity, "clienti", ["C1", "C2"])
        .with_keys(ScopeKind::Group, "agenti", ["G1", "G2"]);
    assert_eq!(first, second);

    for resource_type in RESOURCE_TYPES {
        assert_eq!(
            access.access_filter(&first, resource_type),
            access.access_filter(&second, resource_type)
        );
        assert_eq!(
            access.access_filter(&first, resource_type).to_mongo(),
            access.access_filter(&first, resource_type).to_mongo()
        );
    }
}

#[test]
fn malformed_ids_never_widen_access() {
    // Storage with object ids.
    let access = AccessControl::new(policy_config(), entity_schemas());
    let valid = "65a1f0c2b3d4e5f60718293a";

    let clean = AuthContext::new("U1", "Agente", false)
        .with_keys(ScopeKind::Entity, "clienti", [valid]);
    let dirty = AuthContext::new("U1", "Agente", false).with_keys(
        ScopeKind::Entity,
        "clienti",
        ["C1", valid, "65a1f0c2b3d4e5f6071829", "zzzzzzzzzzzzzzzzzzzzzzzz", ""],
    );

    let clean_filter = access.access_filter(&clean, "conferme-ordine");
    let dirty_filter = access.access_filter(&dirty, "conferme-ordine");
    assert_eq!(clean_filter, dirty_filter);

    let documents = [
        json!({ "owner": "U7", "visibilityRoles": [], "data": { "codiceCliente": valid } }),
        json!({
            "owner": "U7",
            "visibilityRoles": [],
            "data": { "codiceCliente": { "$oid": valid } }
        }),
        json!({ "owner": "U7", "visibilityRoles": [], "data": { "codiceCliente": "C1" } }),
        json!({ "owner": "U7", "visibilityRoles": [], "data": { "codiceCliente": "" } }),
    ];
    for document in &documents {
        if dirty_filter.matches(document) {
            assert!(clean_filter.matches(document));
        }
    }
    assert!(dirty_filter.matches(&documents[0]));
    assert!(dirty_filter.matches(&documents[1]));
    assert!(!dirty_filter.matches(&documents[2]));

    // Only unparseable ids: the rule contributes nothing.
    let only_bad = AuthContext::new("U1", "Agente", false)
        .with_keys(ScopeKind::Entity, "clienti", ["C1", "C2"]);
    assert_eq!(
        access.access_filter(&only_bad, "conferme-ordine"),
        access.basic_access_filter(&only_bad)
    );
}

#[test]
fn agent_reads_confirmations_of_held_customers() {
    let access = access_control();

    let filter = access.access_filter(&agent(), "conferme-ordine");
    assert_eq!(
        filter,
        Predicate::or(vec![
            Predicate::field_eq("owner", "U1"),
            Predicate::field_in("visibilityRoles", ["Public", "PublicReadOnly", "Agente"]),
            Predicate::field_in("data.codiceCliente", [Value::from("C1")]),
        ])
    );
    assert_eq!(
        filter.to_mongo(),
        json!({
            "$or": [
                { "owner": "U1" },
                { "visibilityRoles": { "$in": ["Public", "PublicReadOnly", "Agente"] } },
                { "data.codiceCliente": { "$in": ["C1"] } }
            ]
        })
    );
}

#[test]
fn super_role_is_unrestricted() {
    let access = access_control();
    let auth = access.resolve_auth("U0", "Super");
    assert!(auth.is_admin);

    for resource_type in RESOURCE_TYPES {
        assert!(access.access_filter(&auth, resource_type).is_unrestricted());
    }
}

#[test]
fn read_only_document_of_another_user() {
    let access = access_control();
    let document = ResourceDocument::new("U2").with_visibility(["PublicReadOnly"]);
    let auth = AuthContext::new("U1", "Amministrazione", false);

    let edit = Permission::new(Domain::Entity, Action::Edit);
    assert!(access.has_permission(&auth, edit, None));
    assert!(!access.can_edit_or_delete_resource(
        &auth,
        &document,
        Domain::Entity,
        Action::Edit,
        None
    ));
}

#[test]
fn own_only_roles_mutate_own_documents() {
    let access = access_control();
    let agent = agent();

    let mine = ResourceDocument::new("U1").with_visibility(["Agente"]);
    let theirs = ResourceDocument::new("U2").with_visibility(["Agente"]);

    assert!(access.can_edit_or_delete_resource(
        &agent,
        &mine,
        Domain::Entity,
        Action::Edit,
        Some("conferme-ordine")
    ));
    assert!(!access.can_edit_or_delete_resource(
        &agent,
        &theirs,
        Domain::Entity,
        Action::Edit,
        Some("conferme-ordine")
    ));

    // `note` grants edit to agents without ownership restriction.
    assert!(access.can_edit_or_delete_resource(
        &agent,
        &theirs,
        Domain::Entity,
        Action::Edit,
        Some("note")
    ));

    // No delete capability at all.
    assert!(!access.can_edit_or_delete_resource(
        &agent,
        &mine,
        Domain::Entity,
        Action::Delete,
        Some("conferme-ordine")
    ));
}

#[test]
fn navigation_gating_by_domain() {
    let access = access_control();
    let agent = agent();
    let customer = AuthContext::new("U3", "Cliente", false);

    assert!(access.has_permission(&agent, "event.create".parse().unwrap(), None));
    assert!(access.has_permission(&agent, "group.view".parse().unwrap(), None));
    assert!(!access.has_permission(&customer, "group.view".parse().unwrap(), None));
    assert!(!access.has_permission(&customer, "event.view".parse().unwrap(), None));
    assert!(access.has_permission(&customer, "entity.view".parse().unwrap(), None));
    assert!(!access.has_permission(
        &customer,
        "entity.view".parse().unwrap(),
        Some("fatture")
    ));
}

#[test]
fn listing_expands_to_referencing_resource_types() {
    let access = access_control();

    assert_eq!(
        access.relevant_resource_types(&agent()),
        vec!["clienti", "conferme-ordine", "fatture"]
    );
    assert!(
        access
            .relevant_resource_types(&AuthContext::new("U1", "Agente", false))
            .is_empty()
    );

    // Group keys are not entity keys.
    let grouped = AuthContext::new("U1", "Agente", false)
        .with_keys(ScopeKind::Group, "agenti", ["G1"]);
    assert!(access.relevant_resource_types(&grouped).is_empty());
}

#[test]
fn business_filters_narrow_access_filters() {
    let access = access_control();
    let filter = access
        .access_filter(&agent(), "conferme-ordine")
        .and_with(Predicate::field_eq("data.stato", "aperta"));

    let open = json!({
        "owner": "U7",
        "visibilityRoles": [],
        "data": { "codiceCliente": "C1", "stato": "aperta" }
    });
    let closed = json!({
        "owner": "U7",
        "visibilityRoles": [],
        "data": { "codiceCliente": "C1", "stato": "chiusa" }
    });
    assert!(filter.matches(&open));
    assert!(!filter.matches(&closed));

    // Admin filters stay the business filter alone.
    let filter = access
        .access_filter(&admin(), "conferme-ordine")
        .and_with(Predicate::field_eq("data.stato", "aperta"));
    assert_eq!(filter, Predicate::field_eq("data.stato", "aperta"));
}
