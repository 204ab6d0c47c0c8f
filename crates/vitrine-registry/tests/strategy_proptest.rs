//! Property tests for authentication strategy derivation.

use proptest::prelude::*;
use vitrine_registry::{resolve_strategy, AuthStrategy};

fn strategy_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("noauth".to_string()),
        Just("keystone".to_string()),
        "[a-z]{1,12}",
    ]
}

proptest! {
    #[test]
    fn auth_url_forces_keystone(
        default in strategy_name(),
        url in "https?://[a-z]{1,10}:[0-9]{2,5}/v3",
        from_env in any::<bool>(),
    ) {
        let strategy = if from_env {
            resolve_strategy(&default, None, Some(&url))
        } else {
            resolve_strategy(&default, Some(&url), None)
        };
        prop_assert_eq!(strategy, AuthStrategy::Keystone);
    }

    #[test]
    fn without_auth_url_default_is_kept(default in strategy_name()) {
        let strategy = resolve_strategy(&default, None, Some(""));
        prop_assert_eq!(strategy.as_str(), default.as_str());
    }
}
