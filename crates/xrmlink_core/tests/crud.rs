//! Integration tests for the CRUD executor against the in-memory service.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use xrmlink_codec::{EntityReference, LookupValue, Money, Record, Value, WireValue};
use xrmlink_core::{Operation, UpdatePolicy};
use xrmlink_service::{
    AttributeMetadata, AttributeTypeCode, EntityMetadata, RemoteError, RequiredLevel, ServiceCall,
};
use xrmlink_testkit::prelude::*;

#[test]
fn create_contact_with_status() {
    with_workspace(|ws| {
        let record = Record::new()
            .with("lastname", "Smith")
            .with("statuscode", "Active");
        let outcome = ws.create(ws.contact, &record);
        assert_eq!(outcome.path_name(), "Success");
        let id = outcome.success().unwrap();

        let created = ws.service.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].get("lastname"), Some(&WireValue::String("Smith".into())));
        assert_eq!(created[0].get("statuscode"), Some(&WireValue::OptionSetValue(1)));

        let stored = ws.service.record("contact", Uuid::parse_str(&id).unwrap()).unwrap();
        assert_eq!(stored.get("contactid"), Some(&WireValue::Guid(Uuid::parse_str(&id).unwrap())));
    });
}

#[test]
fn create_without_required_field_reports_it() {
    with_workspace(|ws| {
        let outcome = ws.create(ws.contact, &Record::new());
        assert_eq!(outcome.path_name(), "Error");
        assert_eq!(
            outcome.error_message(),
            Some("The following required fields are missing: lastname.")
        );
        assert!(ws.service.calls().is_empty());
    });
}

#[test]
fn create_reports_every_missing_field() {
    with_workspace(|ws| {
        let account = ws.define(ACCOUNT_CHOICE);
        ws.service.modify_entity("account", |m| {
            if let Some(attr) = m.attribute_mut("customertypecode") {
                attr.required_level = RequiredLevel::ApplicationRequired;
            }
        });
        ws.synchronizer.regenerate(account).unwrap();

        let outcome = ws.create(account, &Record::new());
        assert_eq!(
            outcome.error_message(),
            Some("The following required fields are missing: name, customertypecode.")
        );
    });
}

#[test]
fn create_only_demands_fields_it_writes() {
    with_workspace(|ws| {
        ws.service.modify_entity("contact", |m| {
            m.attributes.push(
                AttributeMetadata::new("externalkey", AttributeTypeCode::String)
                    .with_display_name("External Key")
                    .with_required_level(RequiredLevel::SystemRequired)
                    .with_valid_for_update(false),
            );
        });
        ws.synchronizer.regenerate(ws.contact).unwrap();

        let outcome = ws.create(ws.contact, &Record::new().with("lastname", "Smith"));
        assert!(outcome.is_success());
        let created = &ws.service.created()[0];
        assert!(!created.contains("externalkey"));
    });
}

#[test]
fn create_sends_present_null_as_clear() {
    with_workspace(|ws| {
        let outcome = ws.create(ws.contact, &Record::new().with("lastname", Value::Null));
        assert!(outcome.is_success());
        assert_eq!(ws.service.created()[0].get("lastname"), Some(&WireValue::Null));
    });
}

#[test]
fn create_encodes_every_field_type() {
    with_workspace(|ws| {
        let account = Uuid::new_v4();
        let birthday = Utc.with_ymd_and_hms(1990, 4, 1, 0, 0, 0).unwrap();
        let record = Record::new()
            .with("Last Name", "Smith")
            .with("creditlimit", Decimal::new(150_050, 2))
            .with("parentcustomerid", LookupValue::new("account", account.to_string()))
            .with("birthdate", birthday)
            .with("numberofchildren", 2i64)
            .with("donotemail", true)
            .with("createdon", birthday)
            .with("ownerid", "someone");
        assert!(ws.create(ws.contact, &record).is_success());

        let created = &ws.service.created()[0];
        assert_eq!(
            created.get("creditlimit"),
            Some(&WireValue::Money(Money(Decimal::new(150_050, 2))))
        );
        assert_eq!(
            created.get("parentcustomerid"),
            Some(&WireValue::EntityReference(EntityReference::new("account", account)))
        );
        assert_eq!(created.get("birthdate"), Some(&WireValue::DateTime(birthday)));
        assert_eq!(created.get("numberofchildren"), Some(&WireValue::Integer(2)));
        assert_eq!(created.get("donotemail"), Some(&WireValue::Boolean(true)));
        assert!(!created.contains("createdon"));
        assert!(!created.contains("ownerid"));
    });
}

#[test]
fn create_skips_soft_failures() {
    with_workspace(|ws| {
        let record = Record::new()
            .with("lastname", "Smith")
            .with("statuscode", "Retired")
            .with("parentcustomerid", LookupValue::new("account", ""));
        assert!(ws.create(ws.contact, &record).is_success());

        let created = &ws.service.created()[0];
        assert!(!created.contains("statuscode"));
        assert!(!created.contains("parentcustomerid"));
    });
}

#[test]
fn create_fails_on_type_mismatch() {
    with_workspace(|ws| {
        let record = Record::new()
            .with("lastname", "Smith")
            .with("creditlimit", "lots");
        let outcome = ws.create(ws.contact, &record);
        assert!(outcome.error_message().unwrap().contains("creditlimit"));
        assert!(ws.service.created().is_empty());
    });
}

#[test]
fn update_with_unknown_status_omits_it() {
    with_workspace(|ws| {
        let id = ws.create_contact("Smith");
        let outcome = ws.update(
            ws.contact,
            &id,
            &Record::new().with("statuscode", "Unknown").with("firstname", "Ann"),
            UpdatePolicy::default(),
        );
        assert!(outcome.is_success());

        let (updated_id, wire) = ws.service.updated().pop().unwrap();
        assert_eq!(updated_id.to_string(), id);
        assert!(!wire.contains("statuscode"));
        assert_eq!(wire.get("firstname"), Some(&WireValue::String("Ann".into())));
    });
}

#[test]
fn update_null_clears_by_default() {
    with_workspace(|ws| {
        let id = ws.create_contact("Smith");
        let record = Record::new().with("firstname", "Ann");
        assert!(ws.update(ws.contact, &id, &record, UpdatePolicy::default()).is_success());

        let record = Record::new().with("firstname", Value::Null);
        assert!(ws.update(ws.contact, &id, &record, UpdatePolicy::default()).is_success());

        let (_, wire) = ws.service.updated().pop().unwrap();
        assert_eq!(wire.get("firstname"), Some(&WireValue::Null));
        let stored = ws.service.record("contact", Uuid::parse_str(&id).unwrap()).unwrap();
        assert!(!stored.contains("firstname"));
    });
}

#[test]
fn update_null_as_ignore_omits_field() {
    with_workspace(|ws| {
        let id = ws.create_contact("Smith");
        let policy = UpdatePolicy::new().treat_null_as_ignore(true);
        let record = Record::new().with("firstname", Value::Null).with("lastname", "Jones");
        assert!(ws.update(ws.contact, &id, &record, policy).is_success());

        let (_, wire) = ws.service.updated().pop().unwrap();
        assert!(!wire.contains("firstname"));
        assert_eq!(wire.get("lastname"), Some(&WireValue::String("Jones".into())));
    });
}

#[test]
fn update_empty_string_policies() {
    with_workspace(|ws| {
        let id = ws.create_contact("Smith");
        let record = Record::new().with("firstname", "");

        let policy = UpdatePolicy::new().treat_empty_string_as_null(true);
        assert!(ws.update(ws.contact, &id, &record, policy).is_success());
        let (_, wire) = ws.service.updated().pop().unwrap();
        assert_eq!(wire.get("firstname"), Some(&WireValue::Null));

        let policy = policy.treat_null_as_ignore(true);
        assert!(ws.update(ws.contact, &id, &record, policy).is_success());
        let (_, wire) = ws.service.updated().pop().unwrap();
        assert!(!wire.contains("firstname"));

        assert!(ws.update(ws.contact, &id, &record, UpdatePolicy::default()).is_success());
        let (_, wire) = ws.service.updated().pop().unwrap();
        assert_eq!(wire.get("firstname"), Some(&WireValue::String(String::new())));
    });
}

#[test]
fn update_resolves_enum_member_names() {
    with_workspace(|ws| {
        let account = ws.define(ACCOUNT_CHOICE);
        let id = ws
            .create(account, &Record::new().with("name", "Contoso"))
            .success()
            .unwrap();

        let record = Record::new().with("customertypecode", "preferredcustomer");
        assert!(ws.update(account, &id, &record, UpdatePolicy::default()).is_success());
        let (_, wire) = ws.service.updated().pop().unwrap();
        assert_eq!(wire.get("customertypecode"), Some(&WireValue::OptionSetValue(1)));
    });
}

#[test]
fn update_of_missing_record_surfaces_service_message() {
    with_workspace(|ws| {
        let id = Uuid::new_v4();
        let outcome = ws.update(
            ws.contact,
            &id.to_string(),
            &Record::new().with("firstname", "Ann"),
            UpdatePolicy::default(),
        );
        assert_eq!(
            outcome.error_message(),
            Some(format!("contact With Id = {id} Does Not Exist").as_str())
        );
    });
}

#[test]
fn delete_removes_record() {
    with_workspace(|ws| {
        let id = ws.create_contact("Smith");
        assert!(ws.delete(ws.contact, &id).is_success());
        assert_eq!(ws.service.record_count("contact"), 0);

        let outcome = ws.delete(ws.contact, &id);
        assert_eq!(
            outcome.error_message(),
            Some(format!("contact With Id = {id} Does Not Exist").as_str())
        );
    });
}

#[test]
fn malformed_identifiers_never_reach_the_service() {
    with_workspace(|ws| {
        let record = Record::new().with("firstname", "Ann");
        let outcome = ws.update(ws.contact, "", &record, UpdatePolicy::default());
        assert_eq!(outcome.error_message(), Some("Record identifier cannot be empty."));
        let outcome = ws.retrieve(ws.contact, "not-a-guid");
        assert_eq!(
            outcome.error_message(),
            Some("'not-a-guid' is not a valid record identifier.")
        );
        assert!(ws.service.calls().is_empty());
    });
}

#[test]
fn retrieve_decodes_canonical_values() {
    with_workspace(|ws| {
        let account = Uuid::new_v4();
        let record = Record::new()
            .with("lastname", "Smith")
            .with("statuscode", "Inactive")
            .with("creditlimit", 250i64)
            .with("parentcustomerid", LookupValue::new("account", account.to_string()));
        let id = ws.create(ws.contact, &record).success().unwrap();

        let retrieved = ws.retrieve(ws.contact, &id).success().unwrap();
        assert_eq!(retrieved.get("contactid"), Some(&Value::from(id.as_str())));
        assert_eq!(retrieved.get("lastname"), Some(&Value::from("Smith")));
        assert_eq!(retrieved.get("statuscode"), Some(&Value::from("Inactive")));
        assert_eq!(retrieved.get("creditlimit"), Some(&Value::Decimal(Decimal::from(250))));
        assert_eq!(
            retrieved.get("parentcustomerid"),
            Some(&Value::Reference(LookupValue::new("account", account.to_string())))
        );
    });
}

#[test]
fn retrieve_drops_attributes_outside_the_catalog() {
    with_workspace(|ws| {
        let id = ws.seed_contact("Smith", Some(7));
        let uuid = Uuid::parse_str(&id).unwrap();
        let mut wire = ws.service.record("contact", uuid).unwrap();
        wire.set("ownerid", WireValue::String("someone".into()));
        ws.service.insert_record(wire);

        let retrieved = ws.retrieve(ws.contact, &id).success().unwrap();
        assert!(!retrieved.contains("ownerid"));
        assert_eq!(retrieved.get("statuscode"), Some(&Value::Integer(7)));
    });
}

#[test]
fn retrieve_all_returns_every_record() {
    with_workspace(|ws| {
        ws.seed_contact("Smith", Some(1));
        ws.seed_contact("Jones", None);

        let records = ws.retrieve_all(ws.contact).success().unwrap();
        let mut names: Vec<_> = records
            .iter()
            .filter_map(|r| r.get("lastname").and_then(Value::as_text))
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Jones", "Smith"]);
        assert!(ws
            .service
            .calls()
            .iter()
            .any(|c| matches!(c, ServiceCall::RetrieveAll(e) if e == "contact")));
    });
}

#[test]
fn remote_failures_become_error_outcomes() {
    with_workspace(|ws| {
        ws.service.fail_next(RemoteError::transport_retryable("timed out"));
        let outcome = ws.retrieve_all(ws.contact);
        assert_eq!(outcome.error_message(), Some("transport error: timed out"));

        ws.service.set_connected(false);
        let outcome = ws.create(ws.contact, &Record::new().with("lastname", "Smith"));
        assert_eq!(
            outcome.error_message(),
            Some("not connected to the organization service")
        );
    });
}

#[test]
fn definition_without_catalog_is_rejected() {
    with_workspace(|ws| {
        ws.service.register_entity(EntityMetadata::new("note").with_display_name("Note"));
        ws.store.refresh_entity_list(ws.connection, ws.connector.as_ref()).unwrap();
        let note = ws.define("Note (note)");

        let calls = ws.service.call_count();
        let outcome = ws.retrieve_all(note);
        assert_eq!(
            outcome.error_message(),
            Some("entity 'note' has no field catalog; save or regenerate its definition")
        );
        assert!(!ws.create(note, &Record::new()).is_success());
        assert_eq!(ws.service.call_count(), calls);

        // Delete needs no catalog and reaches the service.
        let id = Uuid::new_v4();
        assert_eq!(
            ws.delete(note, &id.to_string()).error_message(),
            Some(format!("note With Id = {id} Does Not Exist").as_str())
        );
    });
}

#[test]
fn step_names_follow_display_name() {
    with_workspace(|ws| {
        assert_eq!(
            ws.step_name(ws.contact, Operation::RetrieveAll).as_deref(),
            Some("Get All Contact Entities")
        );
        assert_eq!(Operation::Create.payload_label("Contact").as_deref(), Some("Added Contact Id"));
    });
}
