use crate::locate::{ResolvedCommit, resolve_commit};
use crate::model::FixupError;
use git_executor::git_command_executor::GitCommandExecutor;
use test_log::test;
use test_utils::git_test_utils::TestRepo;

const STALE_ID: &str = "0123456789abcdef0123456789abcdef01234567";

#[test]
fn resolves_by_identity_when_commit_exists() {
  let repo = TestRepo::new();
  let commit = repo.create_commit("Add parser", "parser.rs", "fn parse() {}");
  repo.create_commit("Add lexer", "lexer.rs", "fn lex() {}");

  let git = GitCommandExecutor::new();
  let resolved = resolve_commit(&git, repo.path_str(), &commit, "Add parser").unwrap();

  assert_eq!(resolved, ResolvedCommit::ByIdentity(commit));
}

#[test]
fn falls_back_to_exact_message_match() {
  let repo = TestRepo::new();
  repo.create_commit("Add parser", "parser.rs", "fn parse() {}");
  let expected = repo.create_commit("Fix bug", "fix.rs", "fn fix() {}");
  repo.create_commit("Fix bug in lexer", "lexer.rs", "fn lex() {}");

  let git = GitCommandExecutor::new();
  let resolved = resolve_commit(&git, repo.path_str(), STALE_ID, "Fix bug").unwrap();

  // Must be a full-message match, not a substring hit on "Fix bug in lexer"
  assert_eq!(resolved, ResolvedCommit::ByMessage(expected));
}

#[test]
fn message_fallback_returns_most_recent_match() {
  let repo = TestRepo::new();
  repo.create_commit("Update config", "a.txt", "one");
  repo.create_commit("Unrelated", "b.txt", "two");
  let newer = repo.create_commit("Update config", "c.txt", "three");

  let git = GitCommandExecutor::new();
  let resolved = resolve_commit(&git, repo.path_str(), STALE_ID, "Update config").unwrap();

  assert_eq!(resolved.id(), newer);
}

#[test]
fn unreachable_identity_falls_back_to_message() {
  let repo = TestRepo::new();
  let c1 = repo.create_commit("Base", "base.txt", "base");
  let stale = repo.create_commit("Add widget", "widget.rs", "struct Widget;");

  // Rewind the branch; the old object still exists but is unreachable
  repo.reset_hard(&c1).unwrap();
  let replacement = repo.create_commit("Add widget", "widget.rs", "pub struct Widget;");

  let git = GitCommandExecutor::new();
  let resolved = resolve_commit(&git, repo.path_str(), &stale, "Add widget").unwrap();

  assert_eq!(resolved, ResolvedCommit::ByMessage(replacement));
}

#[test]
fn not_found_cites_identity_and_message() {
  let repo = TestRepo::new();
  repo.create_commit("Only commit", "file.txt", "content");

  let git = GitCommandExecutor::new();
  let err = resolve_commit(&git, repo.path_str(), STALE_ID, "No such message").unwrap_err();

  match &err {
    FixupError::CommitNotFound { id, message } => {
      assert_eq!(id, STALE_ID);
      assert_eq!(message, "No such message");
    }
    other => panic!("expected CommitNotFound, got {other:?}"),
  }

  let text = err.to_string();
  assert!(text.contains(STALE_ID));
  assert!(text.contains("No such message"));
}
