use ids2_agent::config::ResourceConfig;
use ids2_agent::core::state::{EventCounters, ResourceSample, ThrottleLevel};
use proptest::prelude::*;

proptest! {
    /// The throttle level always matches the band definition, whatever the
    /// (strictly increasing) thresholds are.
    #[test]
    fn classify_matches_band_definition(
        usage in 0.0f64..200.0,
        t1 in 1.0f64..98.0,
        step2 in 0.5f64..50.0,
        step3 in 0.5f64..50.0,
    ) {
        let t2 = t1 + step2;
        let t3 = t2 + step3;
        let limits = ResourceConfig {
            max_cpu_percent: 70.0,
            max_ram_percent: 70.0,
            throttle_threshold_1: t1,
            throttle_threshold_2: t2,
            throttle_threshold_3: t3,
        };
        let level = ThrottleLevel::classify(usage, &limits).as_u8();
        let expected = if usage >= t3 {
            3
        } else if usage >= t2 {
            2
        } else if usage >= t1 {
            1
        } else {
            0
        };
        prop_assert_eq!(level, expected);
    }

    /// A sample's level is always derived from the larger of CPU and RAM, and
    /// the ceiling check from both against their limits.
    #[test]
    fn sample_derives_level_from_max(cpu in 0.0f64..150.0, ram in 0.0f64..150.0) {
        let limits = ResourceConfig::default();
        let sample = ResourceSample::from_usage(cpu, ram, &limits);
        prop_assert_eq!(sample.throttle_level, ThrottleLevel::classify(cpu.max(ram), &limits));
        prop_assert_eq!(
            sample.resource_ok,
            cpu <= limits.max_cpu_percent && ram <= limits.max_ram_percent
        );
    }

    /// Counter values never decrease under any increment sequence.
    #[test]
    fn counters_never_decrease(increments in proptest::collection::vec(0u64..1000, 0..50)) {
        let counters = EventCounters::new();
        let mut last_processed = 0;
        let mut last_failed = 0;
        for increment in increments {
            counters.add_processed(increment);
            counters.add_failed(increment / 2);
            let processed = counters.processed();
            let failed = counters.failed();
            prop_assert!(processed >= last_processed);
            prop_assert!(failed >= last_failed);
            last_processed = processed;
            last_failed = failed;
        }
    }

    /// The advisory gets strictly no gentler as pressure rises.
    #[test]
    fn advisory_tightens_with_level(a in 0u8..4, b in 0u8..4) {
        let levels = [
            ThrottleLevel::None,
            ThrottleLevel::Light,
            ThrottleLevel::Medium,
            ThrottleLevel::Heavy,
        ];
        let (low, high) = (levels[a.min(b) as usize], levels[a.max(b) as usize]);
        let (low_adv, high_adv) = (low.advisory(), high.advisory());
        prop_assert!(high_adv.sleep_multiplier >= low_adv.sleep_multiplier);
        prop_assert!(high_adv.batch_divisor >= low_adv.batch_divisor);
        prop_assert!(high_adv.pause_non_critical || !low_adv.pause_non_critical);
    }
}
