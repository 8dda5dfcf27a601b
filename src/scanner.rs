use std::fs;
use std::path::{Path, PathBuf};
use tokio::task;
use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use if_chain::if_chain;
use spinoff::{spinners, Spinner, Streams};
use walkdir::WalkDir;

use crate::project::ProjectDir;

/// files or folders whose presence marks a directory as a project,
/// first match in list order is the one reported
pub const PROJECT_MARKERS: [&str; 14] = [
    "package.json",
    "pom.xml",
    "Cargo.toml",
    "go.mod",
    "requirements.txt",
    "Gemfile",
    "composer.json",
    ".git",
    "Makefile",
    "CMakeLists.txt",
    "build.gradle",
    "pyproject.toml",
    "deno.json",
    "bun.lock",
];

/// scan `root` on a blocking task with a spinner on stderr
pub async fn scan_projects(root: &Path, include_hidden: bool) -> Result<Vec<ProjectDir>> {
    let mut spinner = Spinner::new_with_stream(
        spinners::Dots,
        format!("scanning directories in: {}", root.display()),
        spinoff::Color::White,
        Streams::Stderr,
    );

    let root = root.to_path_buf();
    let projects = task::spawn_blocking(move || scan(&root, include_hidden)).await?;

    spinner.clear();

    Ok(projects)
}

/// walk `root` one level deep, probing each folder's children for nested
/// git repositories, and return the entries sorted by name
pub fn scan(root: &Path, include_hidden: bool) -> Vec<ProjectDir> {
    if !root.exists() {
        return Vec::new();
    }

    let read_dir = match fs::read_dir(root) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            eprintln!(
                "{}",
                format!("error scanning directory {}: {}", root.display(), err).red()
            );
            return Vec::new();
        }
    };

    let mut directories = Vec::new();

    for entry in read_dir.filter_map(|entry| entry.ok()) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !include_hidden && name.starts_with('.') {
            continue;
        }

        // skip inaccessible entries, one bad child must not abort the scan
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        if !metadata.is_dir() {
            continue;
        }

        let path = entry.path();
        let (is_project, marker) = is_project_directory(&path);
        let has_subdirs = has_visible_subdirectories(&path);

        directories.push(ProjectDir {
            name: name.clone(),
            path: path.clone(),
            is_project,
            has_subdirs,
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            marker,
            parent: None,
            is_subdirectory: false,
        });

        if has_subdirs {
            directories.extend(scan_subdirectories_for_git(&path, &name));
        }
    }

    directories.sort_by(|a, b| a.name.cmp(&b.name));
    directories
}

/// check the immediate children of `path` against the marker list
pub fn is_project_directory(path: &Path) -> (bool, Option<String>) {
    let names: Vec<String> = match fs::read_dir(path) {
        Ok(read_dir) => read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => return (false, None),
    };

    for marker in PROJECT_MARKERS {
        if names.iter().any(|name| name == marker) {
            return (true, Some(marker.to_string()));
        }
    }

    (false, None)
}

/// true if `path` has at least one non-hidden child directory
pub fn has_visible_subdirectories(path: &Path) -> bool {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .any(|entry| {
            entry.file_type().is_dir() && !entry.file_name().to_string_lossy().starts_with('.')
        })
}

/// second level of the scan: children of `parent_path` that are git
/// repositories, regardless of whether the parent is itself a project
fn scan_subdirectories_for_git(parent_path: &Path, parent_name: &str) -> Vec<ProjectDir> {
    let read_dir = match fs::read_dir(parent_path) {
        Ok(read_dir) => read_dir,
        Err(_) => return Vec::new(),
    };

    let mut git_projects = Vec::new();

    for entry in read_dir.filter_map(|entry| entry.ok()) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let path: PathBuf = entry.path();

        if_chain! {
            if let Ok(metadata) = entry.metadata();
            if metadata.is_dir();
            if path.join(".git").exists();
            then {
                let (_, marker) = is_project_directory(&path);
                git_projects.push(ProjectDir {
                    name,
                    path: path.clone(),
                    is_project: true,
                    has_subdirs: has_visible_subdirectories(&path),
                    last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                    marker: marker.or_else(|| Some(".git".to_string())),
                    parent: Some(parent_name.to_string()),
                    is_subdirectory: true,
                });
            }
        }
    }

    git_projects
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_classifies_and_sorts_by_name() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("foo")).unwrap();
        fs::write(root.path().join("foo/package.json"), "{}").unwrap();
        fs::create_dir(root.path().join("bar")).unwrap();

        let entries = scan(root.path(), false);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "bar");
        assert!(!entries[0].is_project);
        assert!(!entries[0].has_subdirs);
        assert_eq!(entries[1].name, "foo");
        assert!(entries[1].is_project);
        assert_eq!(entries[1].marker.as_deref(), Some("package.json"));
        assert!(!entries[1].is_subdirectory);
    }

    #[test]
    fn test_discovers_nested_git_repositories() {
        let root = tempdir().unwrap();
        let team = root.path().join("team");
        fs::create_dir_all(team.join("proj-a/.git")).unwrap();
        fs::create_dir_all(team.join("proj-b/.git")).unwrap();

        let entries = scan(root.path(), false);

        assert_eq!(entries.len(), 3);
        let team_entry = entries.iter().find(|e| e.name == "team").unwrap();
        assert!(!team_entry.is_project);
        assert!(team_entry.has_subdirs);

        for name in ["proj-a", "proj-b"] {
            let sub = entries.iter().find(|e| e.name == name).unwrap();
            assert!(sub.is_subdirectory);
            assert!(sub.is_project);
            assert_eq!(sub.parent.as_deref(), Some("team"));
            assert_eq!(sub.marker.as_deref(), Some(".git"));
            assert!(sub.path.starts_with(&team));
        }
    }

    #[test]
    fn test_nested_scan_runs_even_when_parent_is_a_project() {
        let root = tempdir().unwrap();
        let mono = root.path().join("mono");
        fs::create_dir(&mono).unwrap();
        fs::write(mono.join("package.json"), "{}").unwrap();
        fs::create_dir_all(mono.join("vendored/.git")).unwrap();

        let entries = scan(root.path(), false);

        let parent = entries.iter().find(|e| e.name == "mono").unwrap();
        assert!(parent.is_project);
        let nested = entries.iter().find(|e| e.name == "vendored").unwrap();
        assert!(nested.is_subdirectory);
        assert_eq!(nested.parent.as_deref(), Some("mono"));
    }

    #[test]
    fn test_skips_hidden_and_non_directories() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join(".hidden")).unwrap();
        fs::create_dir(root.path().join("visible")).unwrap();
        fs::write(root.path().join("notes.txt"), "not a directory").unwrap();

        let entries = scan(root.path(), false);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "visible");

        let with_hidden = scan(root.path(), true);
        assert_eq!(with_hidden.len(), 2);
    }

    #[test]
    fn test_missing_root_yields_empty() {
        let root = tempdir().unwrap();
        let entries = scan(&root.path().join("does-not-exist"), false);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_hidden_children_do_not_count_as_subdirectories() {
        let root = tempdir().unwrap();
        let repo = root.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        let entries = scan(root.path(), false);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_project);
        assert_eq!(entries[0].marker.as_deref(), Some(".git"));
        // only a hidden child, so no second-level probe happened
        assert!(!entries[0].has_subdirs);
    }

    #[test]
    fn test_git_marker_can_be_a_plain_file() {
        // worktrees and submodules keep a `.git` file instead of a folder
        let root = tempdir().unwrap();
        let team = root.path().join("team");
        fs::create_dir_all(team.join("linked")).unwrap();
        fs::write(team.join("linked/.git"), "gitdir: elsewhere").unwrap();

        let entries = scan(root.path(), false);
        let nested = entries.iter().find(|e| e.name == "linked").unwrap();
        assert!(nested.is_project);
        assert_eq!(nested.marker.as_deref(), Some(".git"));
    }
}
