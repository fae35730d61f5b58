//! External task descriptors
//!
//! Users add tools by dropping `*.toml` descriptor files into the external
//! tasks directory. Files are read in file-name order.

use crate::error::{Result, SecsyError};
use crate::tasks::descriptor::TaskDescriptor;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Load every descriptor in `dir`. A missing directory yields nothing;
/// unreadable or invalid files are skipped with a warning.
pub fn load_dir(dir: &Path) -> Result<Vec<TaskDescriptor>> {
    if !dir.is_dir() {
        debug!("No external tasks directory at {}", dir.display());
        return Ok(Vec::new());
    }

    let mut descriptors = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true).sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "toml") {
            continue;
        }
        match load_file(path) {
            Ok(descriptor) => {
                debug!("Loaded external task '{}' from {}", descriptor.name, path.display());
                descriptors.push(descriptor);
            }
            Err(e) => warn!("Skipping external task {}: {}", path.display(), e),
        }
    }
    Ok(descriptors)
}

/// Parse and validate one descriptor file
pub fn load_file(path: &Path) -> Result<TaskDescriptor> {
    let content = std::fs::read_to_string(path)?;
    let descriptor: TaskDescriptor = toml::from_str(&content)
        .map_err(|source| SecsyError::Toml { path: path.to_path_buf(), source })?;
    descriptor.validate()?;
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output_types::Finding;
    use crate::tasks::descriptor::{OptionKind, TaskOptions};
    use serde_json::json;
    use std::fs;

    const HTTPX: &str = r#"
name = "httpx_hosts"
description = "Probe hosts with httpx"
cmd = "httpx"
json_flag = "-json"
input_flag = "-u"
file_flag = "-l"
install_cmd = "go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest"

[opt_key_map]
threads = "t"

[[opts]]
name = "follow_redirects"
type = "flag"
help = "Follow redirects"

[output_map]
type = "subdomain"

[output_map.fields]
host = { derive = { function = "lowercase", from = "input" } }
domain = { derive = { function = "parent_domain", from = "input" } }
"#;

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("httpx.toml");
        fs::write(&path, HTTPX).unwrap();

        let descriptor = load_file(&path).unwrap();
        assert_eq!(descriptor.name, "httpx_hosts");
        assert_eq!(descriptor.opt_prefix, "-");
        assert_eq!(descriptor.opts[0].kind, OptionKind::Flag);

        let mut options = TaskOptions::new();
        options.enable("follow_redirects").set("threads", "5");
        let command = descriptor.build_command(&["Www.Example.com".to_string()], &options).unwrap();
        assert_eq!(
            command.to_shell_string(),
            "httpx -json -u Www.Example.com -follow-redirects -t 5"
        );

        let finding = descriptor.output_map.apply(&json!({"input": "Www.Example.com"})).unwrap();
        match finding {
            Finding::Subdomain(s) => {
                assert_eq!(s.host, "www.example.com");
                assert_eq!(s.domain, "Example.com");
            }
            other => panic!("unexpected finding {:?}", other),
        }
    }

    #[test]
    fn test_load_dir_skips_invalid_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.toml"), HTTPX.replace("httpx_hosts", "zeta")).unwrap();
        fs::write(dir.path().join("a.toml"), HTTPX.replace("httpx_hosts", "alpha")).unwrap();
        fs::write(dir.path().join("broken.toml"), "name = ").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let names: Vec<String> =
            load_dir(dir.path()).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_dir_skips_dangling_link() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.toml"), dir.path().join("a.toml")).unwrap();
        fs::write(dir.path().join("b.toml"), HTTPX).unwrap();

        let names: Vec<String> =
            load_dir(dir.path()).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["httpx_hosts"]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let descriptors = load_dir(Path::new("/nonexistent/secsy/tasks")).unwrap();
        assert!(descriptors.is_empty());
    }

    #[test]
    fn test_unknown_derivation_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, HTTPX.replace("\"lowercase\"", "\"exec\"")).unwrap();
        assert!(matches!(load_file(&path), Err(SecsyError::Toml { .. })));
    }
}
