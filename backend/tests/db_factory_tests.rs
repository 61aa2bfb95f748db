//! Tests for repository creation and `repository.toml` loading.

mod support;

use std::io::Write;
use std::str::FromStr;

use course_sched::db::factory::{RepositoryFactory, RepositoryType};
use course_sched::db::repo_config::CONFIG_PATH_ENV;
use course_sched::db::{AppConfig, ScheduleRepository};
use course_sched::ingest::{Bounds, ValidationRules};

#[test]
fn test_repository_type_from_str() {
    assert_eq!(
        RepositoryType::from_str("postgres").unwrap(),
        RepositoryType::Postgres
    );
    assert_eq!(RepositoryType::from_str("PG").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("memory").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("invalid").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/courses")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_repository_type_from_env_invalid_defaults_to_local() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("invalid")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[tokio::test]
async fn test_create_local_via_factory() {
    let repo = RepositoryFactory::create(RepositoryType::Local, None)
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_create_postgres_without_feature_fails() {
    let err = RepositoryFactory::create(RepositoryType::Postgres, None)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("feature not enabled"));
}

#[test]
fn test_config_sections_parse() {
    let config = AppConfig::from_toml_str(
        r#"
        [repository]
        type = "local"

        [validation]
        min_notes = 1
        credits = { min = 1, max = 6 }

        [guidelines]
        page_size = 5
        "#,
    )
    .unwrap();

    assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    assert_eq!(config.validation.min_notes, 1);
    assert_eq!(config.validation.credits, Bounds::new(1, 6));
    // Unlisted rules keep their defaults.
    assert_eq!(
        config.validation.capacity,
        ValidationRules::default().capacity
    );
    assert_eq!(config.guidelines.page_size, 5);
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = AppConfig::from_toml_str("").unwrap();
    assert_eq!(config.repository.repo_type, "local");
    assert_eq!(config.validation, ValidationRules::default());
    assert_eq!(config.guidelines.page_size, 20);
}

#[test]
fn test_malformed_config_is_a_configuration_error() {
    let err = AppConfig::from_toml_str("[repository\ntype = ").unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_load_honors_config_path_env() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[guidelines]\npage_size = 7").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let config = support::with_scoped_env(&[(CONFIG_PATH_ENV, Some(path.as_str()))], || {
        AppConfig::load().unwrap()
    });
    assert_eq!(config.guidelines.page_size, 7);
}

#[test]
fn test_load_fails_for_missing_explicit_file() {
    let result = support::with_scoped_env(
        &[(CONFIG_PATH_ENV, Some("/nonexistent/repository.toml"))],
        AppConfig::load,
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn test_from_app_config_rejects_unknown_type() {
    let config = AppConfig::from_toml_str("[repository]\ntype = \"cassandra\"").unwrap();
    let err = RepositoryFactory::from_app_config(&config)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("Invalid repository type"));
}
