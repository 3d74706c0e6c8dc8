//! Named preset blobs for the presentation shell.
//!
//! Presets are plain JSON key-value records. Import is field-tolerant:
//! anything missing takes its default and anything unrecognized is
//! skipped, so a blob from an older or newer build still loads.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    pub pattern: String,
    pub color: String,
    pub particle_count: usize,
    pub particle_size: f32,
    pub glow_intensity: f32,
    pub rotation_speed: f32,
    pub morph_speed: f32,
    pub idle_amplitude: f32,
    pub connections: bool,
    pub auto_rotate: bool,
    /// Unix milliseconds at save time.
    pub timestamp: u64,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            pattern: "sphere".to_string(),
            color: "#64c8ff".to_string(),
            particle_count: 15_000,
            particle_size: 2.0,
            glow_intensity: 0.6,
            rotation_speed: 1.0,
            morph_speed: 1.0,
            idle_amplitude: 1.0,
            connections: false,
            auto_rotate: true,
            timestamp: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PresetFile {
    pub version: u32,
    pub presets: Vec<Preset>,
    pub export_date: String,
}

impl Default for PresetFile {
    fn default() -> Self {
        Self {
            version: EXPORT_VERSION,
            presets: Vec::new(),
            export_date: String::new(),
        }
    }
}

pub fn export_presets(presets: &[Preset], export_date: &str) -> Result<String> {
    let file = PresetFile {
        version: EXPORT_VERSION,
        presets: presets.to_vec(),
        export_date: export_date.to_string(),
    };
    serde_json::to_string_pretty(&file).context("failed to serialize presets")
}

pub fn import_presets(json: &str) -> Result<Vec<Preset>> {
    let file: PresetFile =
        serde_json::from_str(json).context("failed to parse preset file")?;
    Ok(file.presets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_import_round_trip() {
        let presets = vec![
            Preset {
                name: "Nebula".to_string(),
                pattern: "galaxy".to_string(),
                particle_count: 20_000,
                ..Preset::default()
            },
            Preset::default(),
        ];
        let json = export_presets(&presets, "2026-08-30").unwrap();
        let restored = import_presets(&json).unwrap();
        assert_eq!(restored, presets);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{"version":1,"presets":[{"name":"Sparse","pattern":"torus"}]}"#;
        let restored = import_presets(json).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].name, "Sparse");
        assert_eq!(restored[0].pattern, "torus");
        assert_eq!(restored[0].particle_count, 15_000);
        assert!(restored[0].auto_rotate);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{
            "version": 3,
            "exportDate": "2031-01-01",
            "flavor": "grape",
            "presets": [{"name": "Future", "warpDrive": true}]
        }"#;
        let restored = import_presets(json).unwrap();
        assert_eq!(restored[0].name, "Future");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(import_presets("{not json").is_err());
    }
}
