// ── Light table persistence ──
//
// The `lights` table lives in a single JSON document. Writes go to a
// sibling temp file that is then renamed over the original.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LightStore;
use crate::error::CoreError;
use crate::model::Light;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LightTable {
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    lights: Vec<Light>,
}

/// Read the table at `path`. A missing file is an empty table.
pub fn load_lights(path: &Path) -> Result<Vec<Light>, CoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no light table yet");
            return Ok(Vec::new());
        }
        Err(e) => return Err(persistence(path, "read", &e)),
    };

    let table: LightTable = serde_json::from_str(&raw).map_err(|e| persistence(path, "parsed", &e))?;
    debug!(path = %path.display(), count = table.lights.len(), "light table loaded");
    Ok(table.lights)
}

/// Write the store's current snapshot to `path`.
pub fn save_lights(path: &Path, store: &LightStore) -> Result<(), CoreError> {
    let snapshot = store.list();
    let table = LightTable {
        saved_at: Some(Utc::now()),
        lights: snapshot.iter().map(|l| (**l).clone()).collect(),
    };
    let json = serde_json::to_string_pretty(&table).map_err(|e| persistence(path, "encoded", &e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| persistence(path, "written", &e))?;
    }
    let tmp = temp_path(path);
    std::fs::write(&tmp, json).map_err(|e| persistence(path, "written", &e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(persistence(path, "written", &e));
    }

    debug!(path = %path.display(), version = snapshot.version(), "light table saved");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn persistence(path: &Path, action: &'static str, err: &dyn std::fmt::Display) -> CoreError {
    CoreError::Persistence {
        path: path.to_path_buf(),
        action,
        message: err.to_string(),
    }
}
