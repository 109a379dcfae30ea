use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::Result;

/// Serializes `value` as pretty JSON, staging through a sibling temp file before renaming.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), "wrote json snapshot");
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FinanceError;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn save_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let mut value = BTreeMap::new();
        value.insert("food".to_string(), 42.5);
        save_json(&value, &path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        let loaded: BTreeMap<String, f64> = load_json(&path).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn load_reports_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_json::<BTreeMap<String, f64>>(&path).unwrap_err();
        assert!(matches!(err, FinanceError::Serde(_)));
    }
}
