//! Unit tests for configuration constants and helper functions.

use super::*;

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON > 0.0);
}

#[test]
fn test_epsilon_is_small() {
    assert!(EPSILON < 1e-6);
}

#[test]
fn test_watertight_epsilon_not_smaller_than_epsilon() {
    assert!(WATERTIGHT_EPSILON >= EPSILON);
}

#[test]
fn test_clamp_detail_minimum() {
    assert_eq!(clamp_detail(0), MIN_DETAIL);
    assert_eq!(clamp_detail(1), MIN_DETAIL);
}

#[test]
fn test_clamp_detail_maximum() {
    assert_eq!(clamp_detail(u32::MAX), MAX_DETAIL);
}

#[test]
fn test_clamp_detail_passthrough() {
    assert_eq!(clamp_detail(24), 24);
}

#[test]
fn test_bsp_split_penalty_positive() {
    assert!(BSP_SPLIT_PENALTY > 0.0);
}

#[test]
fn test_bsp_plane_sample_limit_nonzero() {
    assert!(BSP_PLANE_SAMPLE_LIMIT > 0);
}

#[test]
fn test_default_rng_seed_nonzero() {
    assert_ne!(DEFAULT_RNG_SEED, 0);
}

#[test]
fn test_approx_equal_within_epsilon() {
    let small_diff = EPSILON / 2.0;
    assert!(approx_equal(1.0, 1.0 + small_diff));
}

#[test]
fn test_approx_equal_outside_epsilon() {
    let large_diff = EPSILON * 2.0;
    assert!(!approx_equal(1.0, 1.0 + large_diff));
}

#[test]
fn test_approx_zero() {
    assert!(approx_zero(0.0));
    assert!(!approx_zero(1.0));
}

#[test]
fn test_max_recursion_depth_reasonable() {
    assert!(MAX_RECURSION_DEPTH >= 100);
    assert!(MAX_RECURSION_DEPTH <= 10_000);
}

#[test]
fn test_default_color_is_opaque_and_in_range() {
    for component in DEFAULT_COLOR {
        assert!((0.0..=1.0).contains(&component));
    }
    assert_eq!(DEFAULT_COLOR[3], 1.0);
}

#[test]
fn test_global_config_default() {
    let cfg = GlobalConfig::default();
    assert!(cfg.tolerance > 0.0);
    assert!(cfg.default_detail >= MIN_DETAIL);
}

#[test]
fn test_global_config_rejects_nonpositive_tolerance() {
    assert_eq!(
        GlobalConfig::new(0.0, DEFAULT_DETAIL, 1),
        Err(ConfigError::InvalidTolerance(0.0))
    );
}

#[test]
fn test_global_config_rejects_small_detail() {
    assert_eq!(
        GlobalConfig::new(EPSILON, 1, 1),
        Err(ConfigError::InvalidDetail(1))
    );
}

#[test]
fn test_global_config_accepts_valid_values() {
    let cfg = GlobalConfig::new(1e-6, 24, 7).unwrap();
    assert_eq!(cfg.default_detail, 24);
    assert_eq!(cfg.rng_seed, 7);
}
