use super::*;

fn with_test_table(
    backend: Backend,
    path: &std::path::Path,
) -> anyhow::Result<Box<dyn Storage>> {
    let mut storage = open(backend, path)?;
    let schema = key_foo_schema(&*storage)?;
    storage.create("test", &schema)?;
    Ok(storage)
}

#[test]
fn unknown_table_is_table_not_found() {
    on_each_backend("unknown_table", |backend, path| {
        let mut storage = with_test_table(backend, path)?;
        let row = key_foo(1, "bar");

        assert!(matches!(
            storage.insert("missing", &row),
            Err(StorageError::TableNotFound(t)) if t == "missing"
        ));
        assert!(matches!(
            storage.select_one("missing", &Filter::new()),
            Err(StorageError::TableNotFound(_))
        ));
        assert!(matches!(
            storage.select_many("missing", &Filter::new()),
            Err(StorageError::TableNotFound(_))
        ));
        assert!(matches!(
            storage.update("missing", &Filter::new(), &row),
            Err(StorageError::TableNotFound(_))
        ));
        assert!(matches!(
            storage.schema("missing"),
            Err(StorageError::TableNotFound(_))
        ));
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn malformed_rows_are_schema_violations() {
    on_each_backend("bad_rows", |backend, path| {
        let mut storage = with_test_table(backend, path)?;
        let bad = [
            Row::new().with("key", 1),
            Row::new().with("key", 1).with("foo", "bar").with("extra", 1),
            Row::new().with("key", "1").with("foo", "bar"),
            Row::new().with("key", 1).with("foo", 2),
        ];
        for row in &bad {
            assert!(
                matches!(storage.insert("test", row), Err(StorageError::SchemaViolation(_))),
                "{row:?} should be rejected"
            );
        }
        assert!(storage.select_many("test", &Filter::new())?.is_empty());
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn bad_filters_and_replacements_are_schema_violations() {
    on_each_backend("bad_filters", |backend, path| {
        let mut storage = with_test_table(backend, path)?;
        storage.insert("test", &key_foo(1, "bar"))?;

        assert!(matches!(
            storage.select_many("test", &Filter::new().with("nope", 1)),
            Err(StorageError::SchemaViolation(_))
        ));
        assert!(matches!(
            storage.select_one("test", &Filter::new().with("key", "1")),
            Err(StorageError::SchemaViolation(_))
        ));
        assert!(matches!(
            storage.update("test", &Filter::new(), &Row::new().with("nope", 1)),
            Err(StorageError::SchemaViolation(_))
        ));
        assert!(matches!(
            storage.update("test", &Filter::new(), &Row::new().with("foo", 1)),
            Err(StorageError::SchemaViolation(_))
        ));
        assert_eq!(storage.select_many("test", &Filter::new())?, vec![key_foo(1, "bar")]);
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn conflicting_create_is_schema_violation() {
    on_each_backend("create_conflict", |backend, path| {
        let mut storage = with_test_table(backend, path)?;
        let other = Schema::from_tags(storage.types(), &[("key", "str")])?;
        assert!(matches!(
            storage.create("test", &other),
            Err(StorageError::SchemaViolation(_))
        ));
        assert!(matches!(
            storage.create("", &other),
            Err(StorageError::SchemaViolation(_))
        ));
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn operations_after_disconnect_are_not_connected() {
    on_each_backend("not_connected", |backend, path| {
        let mut storage = with_test_table(backend, path)?;
        storage.disconnect()?;
        assert!(!storage.is_connected());
        assert_eq!(storage.path(), None);

        let schema = key_foo_schema(&*storage)?;
        let row = key_foo(1, "bar");
        assert!(matches!(storage.create("t", &schema), Err(StorageError::NotConnected)));
        assert!(matches!(storage.insert("test", &row), Err(StorageError::NotConnected)));
        assert!(matches!(
            storage.select_one("test", &Filter::new()),
            Err(StorageError::NotConnected)
        ));
        assert!(matches!(
            storage.select_many("test", &Filter::new()),
            Err(StorageError::NotConnected)
        ));
        assert!(matches!(
            storage.update("test", &Filter::new(), &row),
            Err(StorageError::NotConnected)
        ));
        assert!(matches!(storage.tables(), Err(StorageError::NotConnected)));
        assert!(matches!(storage.flush(), Err(StorageError::NotConnected)));

        // a second disconnect is harmless, and connect brings the handle back
        storage.disconnect()?;
        storage.connect(path)?;
        assert!(storage.is_connected());
        assert_eq!(storage.path(), Some(path));
        assert!(storage.select_many("test", &Filter::new())?.is_empty());
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn table_names_differing_only_by_case_clash() {
    on_each_backend("case_tables", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        storage.create("Users", &schema)?;
        storage.insert("Users", &key_foo(1, "bar"))?;

        assert!(matches!(
            storage.create("users", &schema),
            Err(StorageError::SchemaViolation(_))
        ));
        assert!(matches!(
            storage.select_many("users", &Filter::new()),
            Err(StorageError::TableNotFound(_))
        ));
        assert_eq!(storage.tables()?, vec!["Users"]);
        assert_eq!(storage.select_many("Users", &Filter::new())?.len(), 1);
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn column_names_differing_only_by_case_are_rejected() {
    on_each_backend("case_columns", |backend, path| {
        let mut storage = open(backend, path)?;
        let err = Schema::from_tags(storage.types(), &[("key", "int"), ("KEY", "int")]).unwrap_err();
        assert!(matches!(err, StorageError::SchemaViolation(_)));
        assert!(storage.tables()?.is_empty());
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn row_id_column_names_are_rejected() {
    on_each_backend("row_id_columns", |backend, path| {
        let mut storage = open(backend, path)?;
        for name in ["rowid", "ROWID", "oid", "_rowid_"] {
            assert!(
                matches!(
                    Schema::from_tags(storage.types(), &[("key", "int"), (name, "int")]),
                    Err(StorageError::SchemaViolation(_))
                ),
                "{name} should be reserved"
            );
        }
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn reserved_table_prefix_is_rejected() {
    on_each_backend("reserved_prefix", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        for name in ["sqlite_stat1", "SQLITE_mine"] {
            assert!(
                matches!(storage.create(name, &schema), Err(StorageError::SchemaViolation(_))),
                "{name} should be reserved"
            );
        }
        assert!(storage.tables()?.is_empty());
        storage.disconnect()?;
        Ok(())
    });
}
