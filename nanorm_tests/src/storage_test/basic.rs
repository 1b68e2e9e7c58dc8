use super::*;

#[test]
fn create_then_select_is_empty() {
    on_each_backend("create_empty", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        storage.create("test", &schema)?;

        assert_eq!(storage.select_one("test", &Filter::new())?, None);
        assert!(storage.select_many("test", &Filter::new())?.is_empty());
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn five_bar_ten_baz_scenario() {
    on_each_backend("bar_baz", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        storage.create("test", &schema)?;
        for i in 0..15 {
            storage.insert("test", &key_foo(i, if i < 5 { "bar" } else { "baz" }))?;
        }

        assert_eq!(storage.select_many("test", &Filter::new())?.len(), 15);
        assert_eq!(storage.select_many("test", &key_foo_filter("bar"))?.len(), 5);
        assert_eq!(storage.select_many("test", &key_foo_filter("baz"))?.len(), 10);

        let matched = storage.update(
            "test",
            &key_foo_filter("bar"),
            &Row::new().with("foo", "baz"),
        )?;
        assert_eq!(matched, 5);
        assert!(storage.select_many("test", &key_foo_filter("bar"))?.is_empty());
        assert_eq!(storage.select_many("test", &key_foo_filter("baz"))?.len(), 15);
        assert_eq!(storage.select_many("test", &Filter::new())?.len(), 15);
        storage.disconnect()?;
        Ok(())
    });
}

fn key_foo_filter(foo: &str) -> Filter {
    Filter::new().with("foo", foo)
}

#[test]
fn rows_come_back_in_insertion_order() {
    on_each_backend("insertion_order", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        storage.create("test", &schema)?;
        let keys = [7, 3, 9, 1, 3];
        for k in keys {
            storage.insert("test", &key_foo(k, "x"))?;
        }

        let got: Vec<Value> = storage
            .select_many("test", &Filter::new())?
            .iter()
            .filter_map(|r| r.get("key").cloned())
            .collect();
        let expected: Vec<Value> = keys.iter().map(|k| Value::Int(*k)).collect();
        assert_eq!(got, expected);

        // duplicate keys are allowed; select_one returns the earliest
        storage.insert("test", &key_foo(3, "later"))?;
        let first = storage.select_one("test", &Filter::new().with("key", 3))?;
        assert_eq!(first, Some(key_foo(3, "x")));
        assert_eq!(
            storage.select_many("test", &Filter::new().with("key", 3))?.len(),
            3
        );
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn rows_are_returned_in_schema_order() {
    on_each_backend("schema_order", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        storage.create("test", &schema)?;
        storage.insert("test", &Row::new().with("foo", "bar").with("key", 1))?;

        let row = storage
            .select_one("test", &Filter::new())?
            .ok_or_else(|| anyhow::anyhow!("row missing"))?;
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["key", "foo"]);
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn multi_field_filter_is_conjunctive() {
    on_each_backend("conjunctive", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        storage.create("test", &schema)?;
        storage.insert("test", &key_foo(1, "bar"))?;
        storage.insert("test", &key_foo(2, "bar"))?;
        storage.insert("test", &key_foo(1, "baz"))?;

        let rows = storage.select_many("test", &key_foo(1, "bar"))?;
        assert_eq!(rows, vec![key_foo(1, "bar")]);
        assert_eq!(storage.select_one("test", &key_foo(2, "baz"))?, None);
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn identical_create_is_idempotent() {
    on_each_backend("create_twice", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        storage.create("test", &schema)?;
        storage.insert("test", &key_foo(1, "bar"))?;
        storage.create("test", &schema)?;

        assert_eq!(storage.select_many("test", &Filter::new())?.len(), 1);
        assert_eq!(storage.tables()?, vec!["test".to_string()]);
        assert_eq!(storage.schema("test")?, schema);
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn tables_are_listed_sorted() {
    on_each_backend("tables_sorted", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = key_foo_schema(&*storage)?;
        for name in ["users", "lobbies", "audit"] {
            storage.create(name, &schema)?;
        }
        assert_eq!(storage.tables()?, vec!["audit", "lobbies", "users"]);
        storage.disconnect()?;
        Ok(())
    });
}

#[test]
fn both_registries_resolve_the_same_schema() {
    let file_path = temp_path("registry_file");
    let sqlite_path = temp_path("registry_sqlite");
    let file = open(Backend::File, &file_path).unwrap();
    let sqlite = open(Backend::Sqlite, &sqlite_path).unwrap();

    assert_eq!(
        key_foo_schema(&*file).unwrap(),
        key_foo_schema(&*sqlite).unwrap()
    );
    assert_ne!(file.types().backend(), sqlite.types().backend());

    drop(file);
    drop(sqlite);
    cleanup(&file_path);
    cleanup(&sqlite_path);
}

#[test]
fn quoted_identifiers_are_safe() {
    on_each_backend("odd_names", |backend, path| {
        let mut storage = open(backend, path)?;
        let schema = Schema::from_tags(storage.types(), &[("key", "int"), ("we\"ird col", "str")])?;
        storage.create("odd \"table\"", &schema)?;
        storage.insert(
            "odd \"table\"",
            &Row::new().with("key", 1).with("we\"ird col", "it's; fine"),
        )?;
        let got = storage.select_one(
            "odd \"table\"",
            &Filter::new().with("we\"ird col", "it's; fine"),
        )?;
        assert!(got.is_some());
        storage.disconnect()?;
        Ok(())
    });
}
