//! Schema file scanning and compilation.
//!
//! # Responsibilities
//! - Scan the proto directory for `.proto` files
//! - Compile each file independently (partial-success policy)
//! - Report a per-load summary for logs and the control API

use std::path::{Path, PathBuf};

use prost_reflect::DescriptorPool;

/// Recognized schema file extension.
pub const PROTO_EXTENSION: &str = "proto";

/// Error type for schema loading.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to scan proto directory: {0}")]
    Scan(#[from] std::io::Error),

    #[error("Failed to compile proto: {0}")]
    Compile(#[from] protox::Error),

    #[error("Invalid descriptor set: {0}")]
    Descriptor(#[from] prost_reflect::DescriptorError),
}

/// Outcome of one registry load.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Files compiled successfully.
    pub files_loaded: usize,
    /// Files skipped because they failed to compile.
    pub files_skipped: usize,
    /// Total services indexed.
    pub services: usize,
}

/// List `.proto` files in `dir`, sorted by file name.
///
/// Sorting makes duplicate-service resolution deterministic: the first file
/// (alphabetically) defining a service name wins.
pub fn scan_proto_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(PROTO_EXTENSION))
        .collect();
    files.sort();
    Ok(files)
}

/// Compile a single proto file into a descriptor pool.
///
/// The proto directory is the include path, so files may import siblings.
pub fn compile_file(path: &Path, include_dir: &Path) -> Result<DescriptorPool, SchemaError> {
    let set = protox::compile([path], [include_dir])?;
    let pool = DescriptorPool::from_file_descriptor_set(set)?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GREETER: &str = r#"
        syntax = "proto3";
        package pkg;
        service Greeter {
            rpc SayHello (HelloRequest) returns (HelloReply);
        }
        message HelloRequest { string name = 1; }
        message HelloReply { string message = 1; }
    "#;

    #[test]
    fn scan_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.proto"), GREETER).unwrap();
        fs::write(dir.path().join("a.proto"), GREETER).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = scan_proto_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.proto", "b.proto"]);
    }

    #[test]
    fn compile_exposes_services() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greeter.proto");
        fs::write(&path, GREETER).unwrap();

        let pool = compile_file(&path, dir.path()).unwrap();
        let names: Vec<_> = pool.services().map(|s| s.full_name().to_string()).collect();
        assert_eq!(names, vec!["pkg.Greeter"]);
    }

    #[test]
    fn compile_rejects_malformed_proto() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.proto");
        fs::write(&path, "syntax = \"proto3\"; service {").unwrap();
        assert!(compile_file(&path, dir.path()).is_err());
    }
}
