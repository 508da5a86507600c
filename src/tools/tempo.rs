//! Built-in tempo tools over the control-surface bridge.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, ToolError};
use crate::osc::OscBridge;
use crate::tools::{Tool, ToolRegistry};

/// Arguments accepted by [`SetSongTempo`].
#[derive(Debug, Clone, Copy, Deserialize)]
struct SetTempoArgs {
    /// Target tempo in beats per minute.
    bpm: f32,
}

/// Reads the song tempo from the DAW.
pub struct GetSongTempo {
    bridge: Arc<OscBridge>,
}

impl GetSongTempo {
    /// Creates the tool over `bridge`.
    #[must_use]
    pub fn new(bridge: Arc<OscBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Tool for GetSongTempo {
    fn name(&self) -> &str {
        "get_song_tempo"
    }

    fn description(&self) -> &str {
        "Get the current tempo of the song in beats per minute (BPM)."
    }

    fn parameters(&self) -> Option<serde_json::Value> {
        None
    }

    async fn invoke(&self, _arguments: serde_json::Value) -> Result<serde_json::Value> {
        let tempo = self.bridge.get_tempo().await?;
        Ok(json!({ "tempo": tempo }))
    }
}

/// Writes the song tempo on the DAW.
pub struct SetSongTempo {
    bridge: Arc<OscBridge>,
}

impl SetSongTempo {
    /// Creates the tool over `bridge`.
    #[must_use]
    pub fn new(bridge: Arc<OscBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl Tool for SetSongTempo {
    fn name(&self) -> &str {
        "set_song_tempo"
    }

    fn description(&self) -> &str {
        "Set the tempo of the song in beats per minute (BPM)."
    }

    fn parameters(&self) -> Option<serde_json::Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "bpm": {
                    "type": "number",
                    "description": "Target tempo in beats per minute"
                }
            },
            "required": ["bpm"]
        }))
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let args: SetTempoArgs =
            serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
                name: self.name().to_string(),
                reason: e.to_string(),
            })?;
        let tempo = self.bridge.set_tempo(args.bpm).await?;
        Ok(json!({ "tempo": tempo }))
    }
}

/// Registers both tempo tools over one shared bridge.
pub fn register_tempo_tools(registry: &mut ToolRegistry, bridge: &Arc<OscBridge>) {
    registry.register(Arc::new(GetSongTempo::new(Arc::clone(bridge))));
    registry.register(Arc::new(SetSongTempo::new(Arc::clone(bridge))));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_tempo_args_parse() {
        let args: SetTempoArgs = serde_json::from_value(json!({ "bpm": 120 })).unwrap();
        assert!((args.bpm - 120.0).abs() < f32::EPSILON);

        let args: SetTempoArgs = serde_json::from_value(json!({ "bpm": 98.5 })).unwrap();
        assert!((args.bpm - 98.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_tempo_args_reject_missing_bpm() {
        let parsed = serde_json::from_value::<SetTempoArgs>(json!({}));
        assert!(parsed.is_err());

        let parsed = serde_json::from_value::<SetTempoArgs>(json!({ "bpm": "fast" }));
        assert!(parsed.is_err());
    }
}
