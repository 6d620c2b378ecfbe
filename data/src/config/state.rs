use serde::{Deserialize, Serialize};

use crate::chart::overlay::OverlayWindow;
use crate::chart::selection::Selection;
use crate::chart::viewport::Viewport;
use crate::chart::{Dataset, Fingerprint};
use crate::util::ok_or_default;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Failed to decode chart state: {0}")]
    Decode(String),
    #[error("Failed to encode chart state: {0}")]
    Encode(String),
    #[error("Chart state does not match dataset: {0}")]
    Mismatch(String),
}

/// Everything a chart view needs to come back exactly as it was left.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartState {
    pub fingerprint: Fingerprint,
    #[serde(deserialize_with = "ok_or_default")]
    pub viewport: Option<Viewport>,
    pub visibility: Vec<bool>,
    #[serde(deserialize_with = "ok_or_default")]
    pub selection: Option<Selection>,
    #[serde(deserialize_with = "ok_or_default")]
    pub overlay: Option<OverlayWindow>,
}

impl ChartState {
    pub fn to_blob(&self) -> Result<String, StateError> {
        serde_json::to_string(self).map_err(|e| StateError::Encode(e.to_string()))
    }

    pub fn from_blob(blob: &str) -> Result<Self, StateError> {
        serde_json::from_str(blob).map_err(|e| StateError::Decode(e.to_string()))
    }

    /// Checks that the state was produced for `dataset` and holds usable geometry.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), StateError> {
        if self.fingerprint != dataset.fingerprint() {
            return Err(StateError::Mismatch(format!(
                "fingerprint {:?}, dataset has {:?}",
                self.fingerprint,
                dataset.fingerprint()
            )));
        }

        if self.visibility.len() != dataset.series().len() {
            return Err(StateError::Mismatch(format!(
                "{} visibility flags for {} series",
                self.visibility.len(),
                dataset.series().len()
            )));
        }

        if let Some(index) = self.selection.and_then(|s| s.data_index)
            && index >= dataset.len()
        {
            return Err(StateError::Mismatch(format!(
                "selection index {index} out of {} samples",
                dataset.len()
            )));
        }

        if let Some(vp) = self.viewport {
            let finite = [vp.offset_px, vp.width_px, vp.step_px]
                .iter()
                .all(|v| v.is_finite());
            if !finite || vp.step_px <= 0.0 || vp.offset_px < 0.0 {
                return Err(StateError::Mismatch(format!("invalid viewport {vp:?}")));
            }
        }

        if let Some(window) = self.overlay
            && !(window.scroll_px.is_finite() && window.width_px.is_finite())
        {
            return Err(StateError::Mismatch(format!(
                "invalid overlay window {window:?}"
            )));
        }

        if let Some(selection) = self.selection
            && !selection.pixel_x.is_finite()
        {
            return Err(StateError::Mismatch("invalid selection position".into()));
        }

        Ok(())
    }
}
