use super::*;
use crate::error::ErrorCode;
use tempfile::TempDir;

fn loader_in(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::new()
        .with_project_dir(dir.path())
        .with_global_dir(None)
        .without_env()
}

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.log_level, "info");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.persistence.backend, BackendType::Memory);
    assert_eq!(config.payment.currency, "XOF");
    assert_eq!(config.pricing.premium_region, "Abidjan");
    assert_eq!(config.pricing.premium_price, 150_000.0);
    assert_eq!(config.pricing.standard_price, 200_000.0);
    assert_eq!(config.documents.bucket, "company-documents");
    assert!(!config.payments_enabled());
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let toml_str = r#"
log_level = "debug"

[server]
port = 9000

[pricing.service_surcharges]
domiciliation = 25000
"#;

    let config: AppConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(
        config.pricing.service_surcharges.get("domiciliation"),
        Some(&25_000.0)
    );
    assert_eq!(config.pricing.standard_price, 200_000.0);
}

#[test]
fn test_env_overrides() {
    let mut config = AppConfig::default();
    config.merge_env_from(|key| match key {
        "LEGALFORM_PORT" => Some("3000".to_string()),
        "SUPABASE_URL" => Some("https://abc.supabase.co".to_string()),
        "SUPABASE_SERVICE_ROLE_KEY" => Some("service-key".to_string()),
        "FEDAPAY_SECRET_KEY" => Some("sk_live".to_string()),
        _ => None,
    });

    assert_eq!(config.server.port, 3000);
    assert_eq!(config.persistence.backend, BackendType::Supabase);
    assert_eq!(
        config.persistence.supabase_url.as_deref(),
        Some("https://abc.supabase.co")
    );
    assert!(config.payments_enabled());
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_port_env_is_ignored() {
    let mut config = AppConfig::default();
    config.merge_env_from(|key| (key == "LEGALFORM_PORT").then(|| "not-a-port".to_string()));
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_validate_rejects_unknown_log_level() {
    let config = AppConfig {
        log_level: "loud".to_string(),
        ..AppConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
}

#[test]
fn test_validate_requires_supabase_credentials() {
    let mut config = AppConfig::default();
    config.persistence.backend = BackendType::Supabase;
    config.persistence.supabase_url = Some("https://abc.supabase.co".to_string());

    let err = config.validate().unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
    assert!(err.to_string().contains("service_role_key"));
}

#[test]
fn test_callback_url_derivation() {
    let mut config = AppConfig::default();
    assert_eq!(config.payment_callback_url(), None);

    config.server.public_url = Some("https://api.legalform.ci/".to_string());
    assert_eq!(
        config.payment_callback_url().as_deref(),
        Some("https://api.legalform.ci/api/v1/payments/webhook")
    );

    config.payment.callback_url = Some("https://hooks.example/fedapay".to_string());
    assert_eq!(
        config.payment_callback_url().as_deref(),
        Some("https://hooks.example/fedapay")
    );
}

#[test]
fn test_redacted_masks_secrets() {
    let mut config = AppConfig::default();
    config.payment.secret_key = Some("sk_live_123".to_string());
    config.notification.resend_api_key = Some("re_456".to_string());

    let redacted = config.redacted();
    assert_eq!(redacted.payment.secret_key.as_deref(), Some("********"));
    assert_eq!(
        redacted.notification.resend_api_key.as_deref(),
        Some("********")
    );
    assert_eq!(redacted.persistence.service_role_key, None);

    let rendered = toml::to_string(&redacted).unwrap();
    assert!(!rendered.contains("sk_live_123"));
}

#[tokio::test]
async fn test_loader_uses_defaults_without_files() {
    let dir = TempDir::new().unwrap();
    let config = loader_in(&dir).load(None).await.unwrap();
    assert_eq!(config, AppConfig::default());
}

#[tokio::test]
async fn test_loader_reads_project_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("legalform.toml"),
        "log_level = \"warn\"\n[server]\nport = 8181\n",
    )
    .unwrap();

    let config = loader_in(&dir).load(None).await.unwrap();
    assert_eq!(config.log_level, "warn");
    assert_eq!(config.server.port, 8181);
}

#[tokio::test]
async fn test_loader_prefers_project_over_global() {
    let project = TempDir::new().unwrap();
    let global = TempDir::new().unwrap();
    std::fs::write(global.path().join("legalform.toml"), "log_level = \"error\"\n").unwrap();

    let loader = ConfigLoader::new()
        .with_project_dir(project.path())
        .with_global_dir(Some(global.path().to_path_buf()))
        .without_env();
    let config = loader.load(None).await.unwrap();
    assert_eq!(config.log_level, "error");

    std::fs::write(project.path().join("legalform.toml"), "log_level = \"debug\"\n").unwrap();
    let config = loader.load(None).await.unwrap();
    assert_eq!(config.log_level, "debug");
}

#[tokio::test]
async fn test_loader_explicit_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = loader_in(&dir).load(Some(&missing)).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
}

#[tokio::test]
async fn test_loader_reports_invalid_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[server\nport = 1").unwrap();

    let err = loader_in(&dir).load(Some(&path)).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
    assert!(err.to_string().contains("broken.toml"));
}

#[tokio::test]
async fn test_loader_reports_unreadable_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legalform.toml");
    std::fs::create_dir(&path).unwrap();

    let err = loader_in(&dir).load(Some(&path)).await.unwrap_err();
    assert!(matches!(err, crate::error::LegalFormError::Config { .. }));
    assert!(err.to_string().contains("legalform.toml"));
    assert!(std::error::Error::source(&err).is_some());
}
