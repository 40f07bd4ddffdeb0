//! Local identity: a profile file holding the UUID this machine acts as.
//! Created on first use; `--user` overrides it per invocation.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
}

fn config_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "studyset", "StudySet") {
        pd.config_dir().to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn profile_file() -> PathBuf {
    config_root().join("profile.json")
}

pub fn load_or_create() -> Result<Profile> {
    let path = profile_file();
    if path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let p: Profile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        return Ok(p);
    }

    let p = Profile {
        user_id: Uuid::new_v4(),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, serde_json::to_string_pretty(&p)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(p)
}
