use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_apply() {
    let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/notes")])).unwrap();
    assert_eq!(config.database_url, "postgres://localhost/notes");
    assert_eq!(config.port, 3000);
    assert_eq!(config.static_dir, PathBuf::from("dist"));
    assert_eq!(config.db_max_connections, 5);
}

#[test]
fn overrides_apply() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://db/notes"),
        ("PORT", "8080"),
        ("STATIC_DIR", "/srv/board"),
        ("DB_MAX_CONNECTIONS", " 12 "),
    ]))
    .unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.static_dir, PathBuf::from("/srv/board"));
    assert_eq!(config.db_max_connections, 12);
}

#[test]
fn missing_database_url_is_error() {
    assert_eq!(Config::from_lookup(lookup_from(&[])), Err(ConfigError::Missing("DATABASE_URL")));
    assert_eq!(
        Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])),
        Err(ConfigError::Missing("DATABASE_URL"))
    );
}

#[test]
fn invalid_port_is_error() {
    let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "http")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "PORT", value: "http".into() });
    assert_eq!(err.to_string(), "invalid PORT: \"http\"");
}

#[test]
fn out_of_range_port_is_error() {
    let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "70000")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
}
