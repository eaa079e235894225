use std::process::Command;

/// Resolved git binary path and version, discovered once per executor.
#[derive(Debug, Clone)]
pub struct GitInfo {
  pub version: String,
  pub path: String,
}

impl GitInfo {
  pub fn discover() -> Result<Self, String> {
    Self::from_path(&default_git_path())
  }

  pub fn from_path(git_path: &str) -> Result<Self, String> {
    let output = Command::new(git_path)
      .arg("version")
      .output()
      .map_err(|e| format!("Failed to run '{git_path} version': {e}"))?;
    if !output.status.success() {
      return Err(format!("'{git_path} version' failed: {}", String::from_utf8_lossy(&output.stderr)));
    }
    let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(Self {
      version: raw.strip_prefix("git version ").unwrap_or(&raw).to_string(),
      path: git_path.to_string(),
    })
  }
}

#[cfg(target_os = "macos")]
fn default_git_path() -> String {
  // Prefer Homebrew git when present; PATH inside app bundles is unreliable
  for path in ["/opt/homebrew/bin/git", "/usr/local/bin/git"] {
    if std::path::Path::new(path).exists() {
      return path.to_string();
    }
  }
  "git".to_string()
}

#[cfg(not(target_os = "macos"))]
fn default_git_path() -> String {
  "git".to_string()
}
