//! Loading topologies from disk

use std::fs;

use athena_router::{load_config, ConfigError, RegistryError, Resolver};

use crate::config_path;

fn write_temp_config(name: &str, content: &str) -> std::path::PathBuf {
    let file_name = format!("athena-router-{}-{}.toml", name, std::process::id());
    let path = std::env::temp_dir().join(file_name);
    fs::write(&path, content).expect("Failed to write temp config");
    path
}

#[test]
fn test_load_shipped_config() {
    let config = load_config(config_path("athena-router.toml")).unwrap();
    assert_eq!(config.connections.len(), 5);
    assert_eq!(config.slave_groups.len(), 3);

    let resolver = Resolver::from_config(&config).unwrap();
    let registry = resolver.registry();
    assert_eq!(registry.master().name(), "master");
    assert_eq!(registry.default_group().unwrap().name(), "slaves1");
    assert_eq!(registry.group_names(), vec!["slaves1", "slaves2", "slaves3"]);
    assert_eq!(registry.slaves().len(), 4);
}

#[test]
fn test_missing_file() {
    let err = load_config(config_path("does-not-exist.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

#[test]
fn test_malformed_file() {
    let path = write_temp_config("malformed", "[[connections]\nname = ");
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
    let _ = fs::remove_file(path);
}

#[test]
fn test_invalid_topology_is_fatal() {
    let path = write_temp_config(
        "two-defaults",
        r#"
[[connections]]
name = "master"
role = "master"

[[connections]]
name = "s1"
role = "slave"

[[connections]]
name = "s2"
role = "slave"

[[slave_groups]]
name = "a"
members = ["s1"]
default = true

[[slave_groups]]
name = "b"
members = ["s2"]
default = true
"#,
    );
    let config = load_config(&path).unwrap();
    let err = Resolver::from_config(&config).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::RegistryError(RegistryError::MultipleDefaultGroups { .. })
    ));
    let _ = fs::remove_file(path);
}

#[test]
fn test_empty_group_rejected_at_load() {
    let path = write_temp_config(
        "empty-group",
        r#"
[[connections]]
name = "master"
role = "master"

[[slave_groups]]
name = "ghosts"
members = []
"#,
    );
    let config = load_config(&path).unwrap();
    let err = Resolver::from_config(&config).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::RegistryError(RegistryError::EmptyGroup(ref g)) if g == "ghosts"
    ));
    let _ = fs::remove_file(path);
}
