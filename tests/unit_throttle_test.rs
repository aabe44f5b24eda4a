use ids2_agent::config::ResourceConfig;
use ids2_agent::core::state::ThrottleLevel;

fn limits() -> ResourceConfig {
    // Defaults: T1/T2/T3 = 50/60/70.
    ResourceConfig::default()
}

#[test]
fn test_band_edges() {
    let limits = limits();
    assert_eq!(ThrottleLevel::classify(0.0, &limits), ThrottleLevel::None);
    assert_eq!(ThrottleLevel::classify(49.9, &limits), ThrottleLevel::None);
    assert_eq!(ThrottleLevel::classify(50.0, &limits), ThrottleLevel::Light);
    assert_eq!(ThrottleLevel::classify(59.9, &limits), ThrottleLevel::Light);
    assert_eq!(ThrottleLevel::classify(60.0, &limits), ThrottleLevel::Medium);
    assert_eq!(ThrottleLevel::classify(69.9, &limits), ThrottleLevel::Medium);
    assert_eq!(ThrottleLevel::classify(100.0, &limits), ThrottleLevel::Heavy);
}

#[test]
fn test_usage_exactly_at_t3_is_heavy() {
    assert_eq!(
        ThrottleLevel::classify(70.0, &limits()),
        ThrottleLevel::Heavy
    );
}

#[test]
fn test_levels_are_ordered() {
    assert!(ThrottleLevel::None < ThrottleLevel::Light);
    assert!(ThrottleLevel::Light < ThrottleLevel::Medium);
    assert!(ThrottleLevel::Medium < ThrottleLevel::Heavy);
    assert_eq!(ThrottleLevel::Heavy.as_u8(), 3);
}

#[test]
fn test_advisory_table() {
    let none = ThrottleLevel::None.advisory();
    assert_eq!(none.sleep_multiplier, 1.0);
    assert_eq!(none.batch_divisor, 1);
    assert!(!none.pause_non_critical);

    let light = ThrottleLevel::Light.advisory();
    assert_eq!(light.sleep_multiplier, 1.5);
    assert_eq!(light.batch_divisor, 1);
    assert!(!light.pause_non_critical);

    let medium = ThrottleLevel::Medium.advisory();
    assert_eq!(medium.sleep_multiplier, 2.0);
    assert_eq!(medium.batch_divisor, 2);
    assert!(!medium.pause_non_critical);

    let heavy = ThrottleLevel::Heavy.advisory();
    assert_eq!(heavy.sleep_multiplier, 4.0);
    assert_eq!(heavy.batch_divisor, 4);
    assert!(heavy.pause_non_critical);
}
