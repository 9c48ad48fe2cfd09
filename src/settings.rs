//! Process-wide tunables for the GJK queries.
//!
//! Settings are fixed for the lifetime of the process: [`configure`] may be called once at
//! startup, before the first query runs. Queries read them through [`settings`], which falls
//! back to [`GjkSettings::default`] if nothing was configured.

use std::sync::OnceLock;

use crate::math::{Scalar, HALF};

static SETTINGS: OnceLock<GjkSettings> = OnceLock::new();

/// Iteration caps and tolerances shared by every query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GjkSettings {
    /// Hard cap on the number of support points fetched by a single query.
    pub maximum_iterations: u32,

    /// Iteration count past which a query is probably stuck on a degenerate configuration.
    ///
    /// Queries log when they cross it. Past it, a closest-point query also stops early as soon
    /// as an iteration fails to reduce the distance below the best seen so far, and returns the
    /// points it has. Callers can compare it against
    /// [`ClosestPoints::iterations`](crate::gjk::ClosestPoints::iterations).
    pub high_iterations: u32,

    /// Relative tolerance for closest-point, ray and sweep termination.
    ///
    /// Each test compares a squared length against `epsilon` times the simplex's error tolerance
    /// (the largest squared vertex magnitude). Raising it toward `big_epsilon` makes casts
    /// converge in fewer iterations at the price of visible jitter in resting contacts.
    pub epsilon: Scalar,

    /// Relative tolerance for the boolean intersection test's early-out.
    pub big_epsilon: Scalar,

    /// Factor applied to the sphere radius between CCD sphere-cast attempts.
    pub ccd_radius_scale: Scalar,

    /// Number of shrunken-radius retries before CCD falls back to a plain ray cast.
    pub ccd_max_attempts: u32,
}

impl GjkSettings {
    pub const DEFAULT: GjkSettings = GjkSettings {
        maximum_iterations: 15,
        high_iterations: 8,
        // 429 * 2^-32 ≈ 1.0e-7
        epsilon: Scalar::from_bits(429),
        // 42950 * 2^-32 ≈ 1.0e-5
        big_epsilon: Scalar::from_bits(42950),
        ccd_radius_scale: HALF,
        ccd_max_attempts: 3,
    };
}

impl Default for GjkSettings {
    #[inline]
    fn default() -> Self {
        GjkSettings::DEFAULT
    }
}

/// Returned by [`configure`] if the settings were already fixed.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("GJK settings were already configured or read")]
pub struct AlreadyConfigured;

/// Installs the process-wide settings.
///
/// Fails if settings were configured before, or if any query already read the defaults.
pub fn configure(settings: GjkSettings) -> Result<(), AlreadyConfigured> {
    SETTINGS.set(settings).map_err(|_| AlreadyConfigured)?;
    tracing::debug!(?settings, "configured GJK settings");
    Ok(())
}

/// Returns the process-wide settings.
#[inline]
pub fn settings() -> &'static GjkSettings {
    SETTINGS.get_or_init(GjkSettings::default)
}
