//! Property tests for config validation and defaulting.

use std::time::Duration;

use proptest::prelude::*;

use drone_digitalocean::error::ConfigError;
use drone_digitalocean::Config;

fn maybe_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z0-9/_.-]{1,12}"]
}

fn secs() -> impl Strategy<Value = Duration> {
    (0u64..3600).prop_map(Duration::from_secs)
}

prop_compose! {
    fn any_config()(
        loadbalancer in maybe_text(),
        tag in maybe_text(),
        user in maybe_text(),
        key_path in maybe_text(),
        key in maybe_text(),
        password in maybe_text(),
        port in any::<i32>(),
        connect_timeout in secs(),
        command_timeout in secs(),
        pat in maybe_text(),
        target_path in maybe_text(),
    ) -> Config {
        Config {
            loadbalancer,
            tag,
            user,
            key_path,
            key,
            password,
            port,
            connect_timeout,
            command_timeout,
            pat,
            target_path,
            ..Default::default()
        }
    }
}

fn expected_error(config: &Config) -> Option<ConfigError> {
    let selectors = [&config.loadbalancer, &config.tag]
        .iter()
        .filter(|s| !s.is_empty())
        .count();
    let credentials = [&config.key_path, &config.key, &config.password]
        .iter()
        .filter(|s| !s.is_empty())
        .count();

    match (selectors, credentials) {
        (2, _) => Some(ConfigError::AmbiguousSelector),
        (0, _) => Some(ConfigError::MissingSelector),
        (_, 0) => Some(ConfigError::MissingCredential),
        (_, 2..) => Some(ConfigError::AmbiguousCredential),
        _ if config.pat.is_empty() => Some(ConfigError::MissingToken),
        _ => None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_global_rejects: 16384,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the first violated rule is the one reported.
    #[test]
    fn property_rules_apply_in_order(config in any_config()) {
        let expected = expected_error(&config);
        let mut validated = config.clone();
        prop_assert_eq!(validated.validate().err(), expected);
    }

    /// PROPERTY: a valid config leaves validation with every default filled.
    #[test]
    fn property_valid_configs_are_complete(config in any_config()) {
        prop_assume!(expected_error(&config).is_none());
        let mut config = config;
        config.validate().unwrap();

        prop_assert!(config.selector().is_some());
        prop_assert!(!config.user.is_empty());
        prop_assert!(config.port > 0 && config.port <= i32::from(u16::MAX));
        prop_assert_eq!(i32::from(config.port()), config.port);
        prop_assert!(!config.connect_timeout.is_zero());
        prop_assert!(config.command_timeout >= config.connect_timeout);
        prop_assert!(!config.source_path.as_os_str().is_empty());
        prop_assert!(!config.target_path.is_empty());
    }

    /// PROPERTY: validating twice changes nothing.
    #[test]
    fn property_validation_is_idempotent(config in any_config()) {
        let mut once = config;
        if once.validate().is_ok() {
            let mut twice = once.clone();
            prop_assert!(twice.validate().is_ok());
            prop_assert_eq!(twice, once);
        }
    }

    /// PROPERTY: explicit in-range values survive defaulting.
    #[test]
    fn property_explicit_values_are_kept(port in 1i32..=65535, user in "[a-z]{1,8}") {
        let mut config = Config {
            tag: "web".to_string(),
            password: "pw".to_string(),
            pat: "token".to_string(),
            port,
            user: user.clone(),
            ..Default::default()
        };
        config.validate().unwrap();
        prop_assert_eq!(config.port, port);
        prop_assert_eq!(config.user, user);
    }
}
