//! `viewport` tool (§6): resize the active tab's viewport by explicit dimensions or device
//! preset.
//!
//! Device presets are [`ViewportSize::mobile`]/`tablet`/`desktop`, the same table the Browser
//! Manager applies at launch from [`CharlotteConfig::viewport`]. `set_viewport_size` itself is
//! grounded on `browser.rs`'s existing startup call to `page.set_viewport_size(w, h)`.

use crate::config::ViewportSize;
use crate::error::{EngineError, Result};
use crate::render::{PageRepresentation, RenderOptions};
use crate::Engine;

/// A named device preset for `viewport` (§6 `device`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePreset {
    /// 375x667.
    Mobile,
    /// 768x1024.
    Tablet,
    /// 1280x720.
    Desktop,
}

impl DevicePreset {
    fn size(self) -> ViewportSize {
        match self {
            Self::Mobile => ViewportSize::mobile(),
            Self::Tablet => ViewportSize::tablet(),
            Self::Desktop => ViewportSize::desktop(),
        }
    }
}

impl Engine {
    /// Resize the active tab's viewport (§6 `viewport`). Explicit `width`/`height` take
    /// precedence over `device` when both are given.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if neither `width`/`height` nor `device` is given, or
    /// if the resize itself fails.
    pub async fn viewport(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        device: Option<DevicePreset>,
        options: RenderOptions,
    ) -> Result<PageRepresentation> {
        let size = match (width, height) {
            (Some(w), Some(h)) => ViewportSize::new(w, h),
            _ => device
                .map(DevicePreset::size)
                .ok_or_else(|| EngineError::session_error("viewport requires width+height or a device preset"))?,
        };

        let (page, _target_id) = self.active_page().await?;
        page.set_viewport_size(size.width as i32, size.height as i32)
            .await
            .map_err(|e| EngineError::session_error(format!("set_viewport_size: {e}")))?;

        self.action_render(options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_presets_match_spec_table() {
        assert_eq!(DevicePreset::Mobile.size(), ViewportSize::new(375, 667));
        assert_eq!(DevicePreset::Tablet.size(), ViewportSize::new(768, 1024));
        assert_eq!(DevicePreset::Desktop.size(), ViewportSize::new(1280, 720));
    }
}
