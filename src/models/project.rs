use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Feature flag controlling workspace creation; always disabled by this
/// connector since workspaces cannot be created locally.
pub const FEATURE_WORKSPACE_CREATE: &str = "workspace.create";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    pub experiments: HashMap<String, bool>,
    pub features: HashMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceData {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub rotatable: bool,
}

/// Shape of the repository's optional `editor.yaml` configuration file.
///
/// A missing file is treated as an empty configuration; any other read or
/// parse failure propagates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorFileSettings {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeviceData>,
    #[serde(default)]
    pub experiments: HashMap<String, bool>,
    #[serde(default)]
    pub features: HashMap<String, bool>,
}
