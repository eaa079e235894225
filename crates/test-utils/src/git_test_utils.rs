use git_executor::git_command_executor::GitCommandExecutor;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEST_USER_NAME: &str = "Test User";
const TEST_USER_EMAIL: &str = "test@example.com";

/// Git test repository wrapper with helper methods
pub struct TestRepo {
  dir: TempDir,
  git_executor: GitCommandExecutor,
}

impl Default for TestRepo {
  fn default() -> Self {
    Self::new()
  }
}

impl TestRepo {
  /// Creates a new, initialized test repository
  pub fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    let git_executor = GitCommandExecutor::new();
    let path = dir.path().to_str().unwrap();

    git_executor.execute_command(&["init"], path).unwrap_or_else(|e| panic!("Git init failed: {}", e));
    git_executor.execute_command(&["config", "user.name", TEST_USER_NAME], path).unwrap();
    git_executor.execute_command(&["config", "user.email", TEST_USER_EMAIL], path).unwrap();

    Self { dir, git_executor }
  }

  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  pub fn path_str(&self) -> &str {
    self.dir.path().to_str().unwrap()
  }

  pub fn executor(&self) -> &GitCommandExecutor {
    &self.git_executor
  }

  /// Write a file under the repository without staging it
  pub fn write_file(&self, filename: &str, content: &str) {
    let file_path = self.path().join(filename);
    if let Some(parent) = file_path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
  }

  /// Creates a commit with a single file
  pub fn create_commit(&self, message: &str, filename: &str, content: &str) -> String {
    self.create_commit_with_files(message, &[(filename, content)])
  }

  /// Creates a commit with multiple files
  pub fn create_commit_with_files(&self, message: &str, files: &[(&str, &str)]) -> String {
    for (filename, content) in files {
      self.write_file(filename, content);
      self.git_executor.execute_command(&["add", filename], self.path_str()).unwrap();
    }

    self
      .git_executor
      .execute_command(&["commit", "-m", message], self.path_str())
      .unwrap_or_else(|e| panic!("Git commit failed: {}", e));

    self.head()
  }

  /// Current HEAD commit hash
  pub fn head(&self) -> String {
    self.git_executor.execute_command(&["rev-parse", "HEAD"], self.path_str()).unwrap().trim().to_string()
  }

  pub fn rev_parse(&self, ref_name: &str) -> Result<String, String> {
    self
      .git_executor
      .execute_command(&["rev-parse", ref_name], self.path_str())
      .map(|output| output.trim().to_string())
      .map_err(|e| e.to_string())
  }

  /// Commit count from HEAD
  pub fn commit_count(&self) -> usize {
    self
      .git_executor
      .execute_command(&["rev-list", "--count", "HEAD"], self.path_str())
      .unwrap()
      .trim()
      .parse()
      .unwrap()
  }

  /// The last N commit messages from HEAD, newest first
  pub fn commit_messages(&self, count: usize) -> Vec<String> {
    let count_arg = format!("-{count}");
    self
      .git_executor
      .execute_command_lines(&["log", &count_arg, "--pretty=format:%s"], self.path_str())
      .unwrap_or_default()
  }

  /// File content as committed at the given revision
  pub fn file_at(&self, revision: &str, filename: &str) -> Result<String, String> {
    let spec = format!("{revision}:{filename}");
    self.git_executor.execute_command(&["show", &spec], self.path_str()).map_err(|e| e.to_string())
  }

  /// Author name and timestamp of a commit, for metadata-preservation checks
  pub fn author_and_timestamp(&self, commit: &str) -> (String, u32) {
    let output = self
      .git_executor
      .execute_command(&["show", "-s", "--format=%an%x1f%at", commit], self.path_str())
      .unwrap();
    let (name, ts) = output.trim().split_once('\x1f').unwrap();
    (name.to_string(), ts.parse().unwrap())
  }

  /// First parent of a commit, if any
  pub fn parent_of(&self, commit: &str) -> Option<String> {
    let output = self
      .git_executor
      .execute_command(&["rev-list", "--parents", "-n", "1", commit], self.path_str())
      .unwrap();
    output.split_whitespace().nth(1).map(|p| p.to_string())
  }

  pub fn reset_hard(&self, commit_hash: &str) -> Result<(), String> {
    self
      .git_executor
      .execute_command(&["reset", "--hard", commit_hash], self.path_str())
      .map(|_| ())
      .map_err(|e| e.to_string())
  }
}
