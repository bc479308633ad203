use std::env;
use std::fs;
use std::path::PathBuf;

use moji_config::Config;
use serde::{Deserialize, Serialize};

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Profiles live as `<root>/profiles/<name>.json`
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$MOJI_HOME`, else `~/.config/moji`, else `./.moji`
    pub fn from_env() -> Self {
        let root = env::var_os("MOJI_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/moji")))
            .unwrap_or_else(|| PathBuf::from(".moji"));
        Self::new(root)
    }

    fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir().join(format!("{name}.json"))
    }

    /// Create the profiles folder and a main profile if missing
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.profiles_dir())?;

        let main_profile = self.profile_path("main");
        if !main_profile.exists() {
            let profile = Profile {
                name: "main".into(),
                value: Config::default(),
            };
            fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
            tracing::info!("Created main profile at {}", main_profile.display());
        }

        Ok(())
    }

    /// Load a profile by name, falling back to main and then to defaults
    pub fn load(&self, name: &str) -> anyhow::Result<Config> {
        let profile_file = self.profile_path(name);

        if profile_file.exists() {
            return read_profile(&profile_file);
        }

        tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
        let main_file = self.profile_path("main");
        if main_file.exists() {
            read_profile(&main_file)
        } else {
            Ok(Config::default())
        }
    }

    /// Add a new profile cloned from main
    pub fn add_from_main(&self, new_name: &str) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(self.profiles_dir())?;
        let profile = Profile {
            name: new_name.into(),
            value: self.load("main")?,
        };
        let file = self.profile_path(new_name);
        fs::write(&file, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created new profile: {new_name}");
        Ok(file)
    }
}

fn read_profile(path: &std::path::Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&data)?;
    Ok(profile.value)
}
