// src/measure/recorded.rs

use std::fs;
use std::path::Path;

use super::{parse_response, BoxMap, MeasureError, Measurer, Viewport};

/// Replays a previously recorded box map instead of rendering.
///
/// Useful for tests and for laying out a document again with a different
/// configuration without launching a browser. The map is returned for every
/// call regardless of the HTML; ids missing from it surface as
/// `MeasurementMissing` warnings during layout.
#[derive(Debug, Clone, Default)]
pub struct RecordedMeasurer {
    boxes: BoxMap,
    calls: usize,
}

impl RecordedMeasurer {
    pub fn new(boxes: BoxMap) -> Self {
        RecordedMeasurer { boxes, calls: 0 }
    }

    /// Accepts either a provider response (`{"boxes": {...}}`) or a bare map.
    pub fn from_json_str(json: &str) -> Result<Self, MeasureError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| MeasureError::Protocol(format!("invalid recorded box map: {}", e)))?;
        let boxes = if value.get("boxes").is_some() || value.get("error").is_some() {
            parse_response(json)?
        } else {
            serde_json::from_value(value)
                .map_err(|e| MeasureError::Protocol(format!("invalid recorded box map: {}", e)))?
        };
        Ok(RecordedMeasurer::new(boxes))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MeasureError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        log::debug!("Replaying recorded box map from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Writes the map in provider response format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MeasureError> {
        let json = serde_json::to_string_pretty(&serde_json::json!({ "boxes": &self.boxes }))
            .map_err(|e| MeasureError::Protocol(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn boxes(&self) -> &BoxMap {
        &self.boxes
    }

    /// Number of `measure` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Measurer for RecordedMeasurer {
    fn measure(&mut self, _html: &str, _viewport: Viewport) -> Result<BoxMap, MeasureError> {
        self.calls += 1;
        Ok(self.boxes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::MeasuredBox;

    #[test]
    fn accepts_bare_maps_and_responses() {
        let bare = r#"{"b0": {"x": 0, "y": 0, "width": 10, "height": 20}}"#;
        let wrapped = r#"{"boxes": {"b0": {"x": 0, "y": 0, "width": 10, "height": 20}}}"#;
        let a = RecordedMeasurer::from_json_str(bare).unwrap();
        let b = RecordedMeasurer::from_json_str(wrapped).unwrap();
        assert_eq!(a.boxes(), b.boxes());
        assert_eq!(a.boxes()["b0"].height, 20.0);
    }

    #[test]
    fn saves_and_replays_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxes.json");
        let mut boxes = BoxMap::new();
        boxes.insert("b0".into(), MeasuredBox::new(40.0, 40.0, 880.0, 30.0));
        RecordedMeasurer::new(boxes.clone()).save(&path).unwrap();

        let mut replay = RecordedMeasurer::from_file(&path).unwrap();
        let measured = replay.measure("<p></p>", Viewport::new(960.0, 540.0)).unwrap();
        assert_eq!(measured, boxes);
        assert_eq!(replay.calls(), 1);
    }
}
