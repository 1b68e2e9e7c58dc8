//! Shared fixtures: unique store paths and per-backend runners.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use nanorm_core::{
    Backend, Row, Schema, SharedStorage, Storage, StorageConfig, open_shared, open_storage,
};

pub const BACKENDS: [Backend; 2] = [Backend::File, Backend::Sqlite];

pub fn temp_path(prefix: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "nanorm_store_{}_{}_{}",
        prefix,
        std::process::id(),
        id
    ));
    cleanup(&path);
    path
}

pub fn cleanup(path: &Path) {
    let _ = std::fs::remove_file(path);
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let _ = std::fs::remove_file(PathBuf::from(tmp));
}

pub fn open(backend: Backend, path: &Path) -> anyhow::Result<Box<dyn Storage>> {
    Ok(open_storage(&StorageConfig::new(backend, path))?)
}

pub fn open_handle(backend: Backend, path: &Path) -> anyhow::Result<SharedStorage> {
    Ok(open_shared(&StorageConfig::new(backend, path))?)
}

/// Runs `scenario` once per backend on a fresh path, naming the backend in
/// the panic message when it fails.
pub fn on_each_backend(prefix: &str, scenario: impl Fn(Backend, &Path) -> anyhow::Result<()>) {
    for backend in BACKENDS {
        let path = temp_path(&format!("{prefix}_{backend}"));
        let result = scenario(backend, &path);
        cleanup(&path);
        if let Err(e) = result {
            panic!("{backend} backend: {e:#}");
        }
    }
}

/// `key:int, foo:str` declared through the backend's own registry.
pub fn key_foo_schema(storage: &dyn Storage) -> anyhow::Result<Schema> {
    Ok(Schema::from_tags(
        storage.types(),
        &[("key", "int"), ("foo", "str")],
    )?)
}

pub fn key_foo(key: i64, foo: &str) -> Row {
    Row::new().with("key", key).with("foo", foo)
}
