use std::path::Path;
use std::sync::Arc;

use tuft_client::{ClientConfig, Error, RepoManager};
use tuft_crypto::SigningScheme;
use tuft_repo::{RepoBuilder, RepoLayout, RepoSeed, RolesStrategy, Signer, SigningKey};
use url::Url;

/// Publish `files` into a mirror at `root`, returning the encoded root metadata
fn publish_mirror(root: &Path, files: &[(&str, &str)], consistent: bool) -> Vec<u8> {
    let strategy = RolesStrategy::standard();
    let key: Arc<dyn Signer> = Arc::new(SigningKey::generate(SigningScheme::Ed25519).unwrap());
    let keys = Arc::new(strategy.registry().key_manager_from_single_key(key));
    let seed = RepoSeed::make(&strategy, keys, consistent, false).unwrap();

    let layout = RepoLayout::new(root, strategy.extension());
    let mut builder = RepoBuilder::new(&strategy, seed).unwrap();
    for (path, data) in files {
        builder.add_file(*path, data.as_bytes()).unwrap();
    }
    builder.publish().unwrap();
    builder.save(&layout).unwrap();

    std::fs::read(layout.metadata_dir().join("root.json")).unwrap()
}

fn mirror_uri(path: &Path) -> String {
    Url::from_directory_path(path).unwrap().to_string()
}

#[test]
fn test_fetch_from_consistent_mirror() {
    let mirror = tempfile::tempdir().unwrap();
    let repos = tempfile::tempdir().unwrap();
    let root = publish_mirror(
        mirror.path(),
        &[("a.txt", "hello"), ("docs/b.txt", "world")],
        true,
    );

    let mut manager = RepoManager::new(ClientConfig::new(repos.path())).unwrap();
    let settings = manager
        .add("main", &root, vec![mirror_uri(mirror.path())])
        .unwrap();
    assert_eq!(settings.base_uris.len(), 1);
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.iter().collect::<Vec<_>>(), vec!["main"]);

    let mut repo = manager.get("main").unwrap();
    repo.update().unwrap();
    assert_eq!(
        repo.target_names().unwrap(),
        vec!["a.txt".to_string(), "docs/b.txt".to_string()]
    );

    let path = repo.get_target_path("docs/b.txt").unwrap();
    assert_eq!(path, repos.path().join("main/content/docs/b.txt"));
    assert_eq!(std::fs::read(&path).unwrap(), b"world");

    let local_meta = repos.path().join("main/metadata");
    for name in ["root.json", "1.targets.json", "1.snapshot.json", "timestamp.json"] {
        assert!(local_meta.join(name).is_file(), "{name} missing");
    }

    assert!(matches!(
        repo.get_target_path("c.txt"),
        Err(Error::TargetNotFound { .. })
    ));
}

#[test]
fn test_refresh_keeps_only_current_versions() {
    let mirror = tempfile::tempdir().unwrap();
    let repos = tempfile::tempdir().unwrap();
    let strategy = RolesStrategy::standard();
    let key: Arc<dyn Signer> = Arc::new(SigningKey::generate(SigningScheme::Ed25519).unwrap());
    let keys = Arc::new(strategy.registry().key_manager_from_single_key(key));
    let seed = RepoSeed::make(&strategy, keys, true, false).unwrap();
    let layout = RepoLayout::new(mirror.path(), strategy.extension());

    let mut builder = RepoBuilder::new(&strategy, seed).unwrap();
    builder.add_file("a.txt", b"hello".to_vec()).unwrap();
    builder.publish().unwrap();
    builder.save(&layout).unwrap();
    let seed = builder.into_seed();

    let root = std::fs::read(layout.metadata_dir().join("root.json")).unwrap();
    let mut manager = RepoManager::new(ClientConfig::new(repos.path())).unwrap();
    manager
        .add("main", &root, vec![mirror_uri(mirror.path())])
        .unwrap();
    let mut repo = manager.get("main").unwrap();
    repo.update().unwrap();

    let mut builder = RepoBuilder::load(&strategy, seed, &layout.metadata_dir()).unwrap();
    builder.add_file("b.txt", b"world".to_vec()).unwrap();
    builder.publish().unwrap();
    builder.save(&layout).unwrap();
    repo.update().unwrap();

    let local_meta = repos.path().join("main/metadata");
    for name in ["2.targets.json", "2.snapshot.json", "timestamp.json", "root.json"] {
        assert!(local_meta.join(name).is_file(), "{name} missing");
    }
    for name in ["1.targets.json", "1.snapshot.json"] {
        assert!(!local_meta.join(name).exists(), "{name} was kept");
    }
    assert_eq!(
        repo.target_names().unwrap(),
        vec!["a.txt".to_string(), "b.txt".to_string()]
    );
}

#[test]
fn test_fetch_from_simple_mirror() {
    let mirror = tempfile::tempdir().unwrap();
    let repos = tempfile::tempdir().unwrap();
    let root = publish_mirror(mirror.path(), &[("a.txt", "hello")], false);

    let mut manager = RepoManager::new(ClientConfig::new(repos.path())).unwrap();
    manager
        .add("plain", &root, vec![mirror_uri(mirror.path())])
        .unwrap();
    let mut repo = manager.get("plain").unwrap();
    repo.update().unwrap();
    let path = repo.get_target_path("a.txt").unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"hello");
}

#[test]
fn test_tampered_content_is_unavailable() {
    let mirror = tempfile::tempdir().unwrap();
    let repos = tempfile::tempdir().unwrap();
    let root = publish_mirror(mirror.path(), &[("a.txt", "hello")], false);
    std::fs::write(mirror.path().join("content/a.txt"), b"HELLO").unwrap();

    let mut manager = RepoManager::new(ClientConfig::new(repos.path())).unwrap();
    manager
        .add("main", &root, vec![mirror_uri(mirror.path())])
        .unwrap();
    let mut repo = manager.get("main").unwrap();
    repo.update().unwrap();
    assert!(matches!(
        repo.get_target_path("a.txt"),
        Err(Error::TargetUnavailable { .. })
    ));
}

#[test]
fn test_remove_and_missing_settings() {
    let mirror = tempfile::tempdir().unwrap();
    let repos = tempfile::tempdir().unwrap();
    let root = publish_mirror(mirror.path(), &[], true);

    let mut manager = RepoManager::new(ClientConfig::new(repos.path())).unwrap();
    manager.add("empty", &root, vec![]).unwrap();
    assert!(matches!(
        manager.get("empty"),
        Err(Error::NoBaseUri { pet_name }) if pet_name == "empty"
    ));

    assert!(manager.remove("empty").unwrap());
    assert!(!manager.remove("empty").unwrap());
    assert!(manager.is_empty());
}
