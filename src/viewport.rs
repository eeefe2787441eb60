//! Named viewport profiles and the controller that applies them.
//!
//! Applying a profile is not assumed instantaneous: layout reflow means the
//! surface may report the old dimensions for a while. The controller reuses
//! the retry engine for a short bounded settle-check instead of a fixed
//! sleep.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::retry::{self, Poll, RetryPolicy};
use crate::surface::{UiSurface, ViewportSize};

/// A named, immutable width/height pair, always applied wholesale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportProfile {
    pub name: String,
    pub size: ViewportSize,
}

impl ViewportProfile {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            size: ViewportSize::new(width, height),
        }
    }

    /// The standard preset profiles
    pub fn presets() -> &'static [ViewportProfile] {
        static PRESETS: Lazy<Vec<ViewportProfile>> = Lazy::new(|| {
            vec![
                ViewportProfile::new("mobile", 375, 667),
                ViewportProfile::new("tablet", 768, 1024),
                ViewportProfile::new("desktop", 1920, 1080),
            ]
        });
        &PRESETS
    }

    /// Parse a profile from a preset name or a custom "WxH" string
    pub fn from_str(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if let Some(preset) = Self::presets()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(spec))
        {
            return Some(preset.clone());
        }
        let (w, h) = spec.split_once('x')?;
        let width = w.parse().ok()?;
        let height = h.parse().ok()?;
        Some(Self::new(spec.to_lowercase(), width, height))
    }
}

impl std::fmt::Display for ViewportProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.size)
    }
}

/// Applies viewport profiles and tracks which one is in effect
///
/// The only persistent state is the current profile, kept readable so later
/// steps can include it in diagnostics.
pub struct ViewportController {
    default_profile: ViewportProfile,
    current: ViewportProfile,
}

impl ViewportController {
    /// Create a controller that restores `default_profile` on reset
    pub fn new(default_profile: ViewportProfile) -> Self {
        Self {
            current: default_profile.clone(),
            default_profile,
        }
    }

    /// Profile currently in effect
    pub fn current(&self) -> &ViewportProfile {
        &self.current
    }

    /// Whether a scoped override is active
    pub fn is_overridden(&self) -> bool {
        self.current != self.default_profile
    }

    /// Apply a profile and wait (bounded) until the surface reports the new
    /// dimensions are in effect.
    pub fn apply(
        &mut self,
        surface: &mut dyn UiSurface,
        profile: &ViewportProfile,
    ) -> EngineResult<()> {
        tracing::debug!(profile = %profile, "applying viewport profile");
        surface.set_viewport(profile.size)?;

        let wanted = profile.size;
        retry::wait_until(RetryPolicy::settle(), || {
            let actual = surface.viewport();
            Ok(Poll::from_bool(
                actual == wanted,
                format!("viewport still {}", actual),
            ))
        })
        .map_err(|err| {
            EngineError::ViewportApplyFault(format!(
                "viewport {} did not settle: {}",
                profile, err
            ))
        })?;

        self.current = profile.clone();
        Ok(())
    }

    /// Restore the default profile. Called on every scenario exit path.
    pub fn reset(&mut self, surface: &mut dyn UiSurface) -> EngineResult<()> {
        if !self.is_overridden() {
            return Ok(());
        }
        let default_profile = self.default_profile.clone();
        self.apply(surface, &default_profile)
    }
}
