//! Integration tests for module exports.
//!
//! Verify that all public modules and types are correctly exported
//! and accessible via absolute paths.

/// Test that the grid is accessible via both the module and the re-export.
#[test]
fn test_grid_module_exports() {
    use pricer_core::math::grid::TriangularGrid;

    let grid = pricer_core::math::TriangularGrid::filled(2, 0.0_f64);
    let same: TriangularGrid<f64> = grid.clone();
    assert_eq!(grid, same);
}

/// Test that error types are accessible via absolute path.
#[test]
fn test_error_module_exports() {
    use pricer_core::types::error::{GridError, PricingError};

    let err: PricingError = GridError::Empty.into();
    assert!(matches!(err, PricingError::InvalidInput(_)));
}

/// Test that option vocabulary is re-exported at the types level.
#[test]
fn test_option_module_exports() {
    use pricer_core::types::option::ExerciseStyle as StyleFromModule;
    use pricer_core::types::{ExerciseStyle, OptionKind};

    assert_eq!(StyleFromModule::American, ExerciseStyle::American);
    assert_eq!(OptionKind::Put.intrinsic(80.0, 100.0), 20.0);
}

/// Test that distribution functions are accessible via absolute path.
#[test]
fn test_distribution_exports() {
    use pricer_core::math::distributions::norm_cdf;

    assert!(norm_cdf(0.0) > 0.49);
}
