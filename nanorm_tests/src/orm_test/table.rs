use super::*;
use nanorm_core::TableDescriptor;

#[test]
fn add_registers_live_record() {
    on_each_backend("table_live", |backend, path| {
        let storage = open_handle(backend, path)?;
        let mut users = users_table(&storage)?;

        let record = users.record(Row::new().with("key", 1).with("id", -1))?;
        let added = users.add(record)?;
        assert_eq!(added.fields(), &user(1, -1, -1));
        assert_eq!(users.live_len(), 1);

        // lookup ignores field order
        let probe = Row::new().with("id", -1).with("key", 1).with("lobby_id", -1);
        assert!(users.live(&probe).is_some());
        assert!(users.live(&Row::new().with("key", 1)).is_none());

        let live = users
            .live_mut(&probe)
            .ok_or_else(|| anyhow::anyhow!("record not registered"))?;
        live.set(&Row::new().with("lobby_id", 3))?;
        assert_eq!(live.get("lobby_id")?, &Value::Int(3));

        // the registry keeps the instance, not its original field set
        assert!(users.live(&probe).is_none());
        assert_eq!(
            fields_of(users.find_one(&Filter::new().with("key", 1))?),
            Some(user(1, 3, -1))
        );
        storage.borrow_mut().disconnect()?;
        Ok(())
    });
}

#[test]
fn find_builds_new_records_from_storage() {
    on_each_backend("table_find_fresh", |backend, path| {
        let storage = open_handle(backend, path)?;
        let mut users = users_table(&storage)?;
        seed_users(&mut users, 2)?;

        let mut first = users
            .find_one(&Filter::new().with("key", 0))?
            .ok_or_else(|| anyhow::anyhow!("user 0 missing"))?;
        let second = users
            .find_one(&Filter::new().with("key", 0))?
            .ok_or_else(|| anyhow::anyhow!("user 0 missing"))?;
        assert_eq!(first, second);

        first.set(&Row::new().with("lobby_id", 11))?;
        assert_ne!(first, second);
        assert_eq!(second.get("lobby_id")?, &Value::Int(-1));
        storage.borrow_mut().disconnect()?;
        Ok(())
    });
}

#[test]
fn duplicate_adds_store_both_rows_and_keep_one_live_entry() {
    on_each_backend("table_duplicates", |backend, path| {
        let storage = open_handle(backend, path)?;
        let mut users = users_table(&storage)?;

        for _ in 0..2 {
            let record = users.record(Row::new().with("key", 4))?;
            users.add(record)?;
        }
        assert_eq!(users.find(&Filter::new().with("key", 4))?.len(), 2);
        assert_eq!(users.live_len(), 1);
        storage.borrow_mut().disconnect()?;
        Ok(())
    });
}

#[test]
fn add_rejects_records_of_other_tables() {
    on_each_backend("table_foreign_record", |backend, path| {
        let storage = open_handle(backend, path)?;
        let mut users = users_table(&storage)?;
        let types = storage.borrow().types();
        let schema = Schema::from_tags(types, &[("key", "int"), ("lobby_id", "int"), ("id", "int")])?;
        let others = Table::new(storage.clone(), TableConfig::new("others", schema))?;

        let foreign = others.record(user(1, 1, 1))?;
        assert!(matches!(
            users.add(foreign),
            Err(StorageError::SchemaViolation(_))
        ));
        assert!(users.find(&Filter::new())?.is_empty());
        assert!(others.find(&Filter::new())?.is_empty());
        assert_eq!(users.live_len(), 0);
        storage.borrow_mut().disconnect()?;
        Ok(())
    });
}

#[test]
fn table_declares_itself_in_storage() {
    on_each_backend("table_declare", |backend, path| {
        let storage = open_handle(backend, path)?;
        let users = users_table(&storage)?;
        assert_eq!(users.name(), "users");
        assert_eq!(storage.borrow().tables()?, vec!["users"]);
        assert_eq!(&storage.borrow().schema("users")?, users.schema());

        // a second table object over the same relation sees the same rows
        let mut again = users_table(&storage)?;
        seed_users(&mut again, 3)?;
        assert_eq!(users.find(&Filter::new())?.len(), 3);
        storage.borrow_mut().disconnect()?;
        Ok(())
    });
}

#[test]
fn table_rejects_conflicting_declaration() {
    on_each_backend("table_conflict", |backend, path| {
        let storage = open_handle(backend, path)?;
        let _users = users_table(&storage)?;
        let types = storage.borrow().types();
        let schema = Schema::from_tags(types, &[("key", "int"), ("name", "str")])?;
        assert!(matches!(
            Table::new(storage.clone(), TableConfig::new("users", schema)),
            Err(StorageError::SchemaViolation(_))
        ));
        storage.borrow_mut().disconnect()?;
        Ok(())
    });
}

#[test]
fn invalid_defaults_are_rejected_before_create() {
    on_each_backend("table_bad_defaults", |backend, path| {
        let storage = open_handle(backend, path)?;
        let types = storage.borrow().types();
        let schema = Schema::from_tags(types, &[("key", "int"), ("name", "str")])?;

        let unknown = TableConfig::new("lobbies", schema.clone()).with_default("owner", 1);
        assert!(matches!(
            Table::new(storage.clone(), unknown),
            Err(StorageError::SchemaViolation(_))
        ));
        let mistyped = TableConfig::new("lobbies", schema).with_default("name", 1);
        assert!(matches!(
            Table::new(storage.clone(), mistyped),
            Err(StorageError::SchemaViolation(_))
        ));
        assert!(storage.borrow().tables()?.is_empty());
        storage.borrow_mut().disconnect()?;
        Ok(())
    });
}

#[test]
fn descriptor_is_named_after_the_table() {
    on_each_backend("table_descriptor", |backend, path| {
        let storage = open_handle(backend, path)?;
        let mut users = users_table(&storage)?;
        assert_eq!(users.descriptor(), &TableDescriptor::named("users"));
        assert_eq!(users.descriptor().get("key"), Some(&Value::from("users")));

        users.descriptor_mut().set("owner", "admin");
        assert_eq!(
            users.descriptor().fields(),
            &Row::new().with("key", "users").with("owner", "admin")
        );
        // descriptor fields never reach storage or filters
        assert!(users.find(&Filter::new())?.is_empty());
        storage.borrow_mut().disconnect()?;
        Ok(())
    });
}

#[test]
fn operations_fail_once_storage_is_disconnected() {
    on_each_backend("table_disconnected", |backend, path| {
        let storage = open_handle(backend, path)?;
        let mut users = users_table(&storage)?;
        seed_users(&mut users, 1)?;
        let mut record = users
            .find_one(&Filter::new())?
            .ok_or_else(|| anyhow::anyhow!("user missing"))?;

        storage.borrow_mut().disconnect()?;
        assert!(matches!(
            users.find(&Filter::new()),
            Err(StorageError::NotConnected)
        ));
        assert!(matches!(
            record.set(&Row::new().with("lobby_id", 2)),
            Err(StorageError::NotConnected)
        ));
        assert_eq!(record.get("lobby_id")?, &Value::Int(-1));
        Ok(())
    });
}

#[test]
fn table_over_a_directly_built_handle() -> anyhow::Result<()> {
    let path = crate::support::temp_path("table_shared_fn");
    let storage = nanorm_core::shared(nanorm_core::FileStorage::open(&path)?);
    let types = storage.borrow().types();
    let schema = Schema::from_tags(types, &[("key", "int"), ("name", "str")])?;
    let config = TableConfig::new("lobbies", schema)
        .with_defaults(Row::new().with("key", 0).with("name", "lobby"));
    let mut lobbies = Table::new(storage.clone(), config)?;

    let record = lobbies.record(Row::new().with("key", 5))?;
    let added = lobbies.add(record)?;
    assert_eq!(added.key()?.as_int(), Some(5));
    assert_eq!(added.get("name")?.as_text(), Some("lobby"));
    assert!(added.fields().contains("name"));

    assert!(lobbies.storage().borrow().is_connected());
    lobbies.storage().borrow_mut().disconnect()?;
    assert!(!storage.borrow().is_connected());
    crate::support::cleanup(&path);
    Ok(())
}
