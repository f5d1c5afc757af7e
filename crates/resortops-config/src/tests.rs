#[cfg(test)]
mod tests {
    use super::super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3001");
        assert_eq!(config.session.cookie_name, "resortops_session");
        assert_eq!(config.session.ttl_hours, 12);
        assert!(!config.drive.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_leave_policy() {
        let policy = LeaveConfig::default().policy();
        assert_eq!(policy, LeavePolicy::default());
        assert!(policy.el_annual_cap > policy.el_accrual_per_week);
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config = Config::from_toml_str(
            r#"
            [database]
            url = "postgres://ops@db/resort"

            [leave]
            el_annual_cap = 15.0

            [property]
            name = "Coral Bay Resort"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.url, "postgres://ops@db/resort");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.leave.el_annual_cap, 15.0);
        assert_eq!(config.leave.sick_quota, 7.0);
        assert_eq!(config.property.name, "Coral Bay Resort");
        assert_eq!(config.property.currency, "INR");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://env@localhost/ops"),
            ("GOOGLE_DRIVE_TOKEN", "ya29.token"),
            ("RESORTOPS_SECURE_COOKIE", "true"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.database.url, "postgres://env@localhost/ops");
        assert!(config.drive.is_enabled());
        assert_eq!(
            config.drive.access_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("ya29.token".to_string())
        );
        assert!(config.session.secure_cookie);
        assert_eq!(config.drive.folder_id, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.leave.lop_divisor_days = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.database.min_connections = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_ttl_bounds() {
        let mut config = Config::default();
        config.session.ttl_hours = MAX_SESSION_TTL_HOURS;
        assert!(config.validate().is_ok());

        config.session.ttl_hours = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.session.ttl_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(matches!(Config::from_toml_str("[server"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_example_file_parses() {
        let config = Config::from_toml_str(include_str!("../../../resortops.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.drive.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.inventory.default_min_threshold, 5.0);
    }
}
