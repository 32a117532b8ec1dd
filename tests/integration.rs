//! Integration tests exercising the VFS end to end.
//!
//! These tests verify that:
//! 1. Local directories mount with and without a `.vfs` descriptor
//! 2. Packages written by `PackageBuilder` mount and serve their content
//! 3. Sources merge, and local files shadow packaged ones
//! 4. Malicious archives are rejected before anything is read

use murasame_vfs::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn version(n: u32) -> ResourceVersion {
    ResourceVersion::new(n).unwrap()
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Package with two directories, mirroring a typical shipped resource set.
fn build_package(dir: &Path, name: &str, compressed: bool) -> PathBuf {
    let path = dir.join(name);
    let mut builder = PackageBuilder::new().compressed(compressed);
    builder
        .add_file(
            "directory1/file1.txt",
            version(1),
            Some("text/plain"),
            b"file1".to_vec(),
        )
        .unwrap();
    builder
        .add_file(
            "directory2/file2.txt",
            version(1),
            Some("text/plain"),
            b"file2".to_vec(),
        )
        .unwrap();
    builder
        .add_file(
            "config/app.json",
            version(1),
            None,
            br#"{"source": "package"}"#.to_vec(),
        )
        .unwrap();
    builder.write(&path).unwrap();
    path
}

// =============================================================================
// Raw Archive Construction
// =============================================================================

/// Archive member written byte for byte, bypassing the checks `tar::Builder`
/// applies to names.
struct RawMember<'a> {
    name: &'a str,
    entry_type: tar::EntryType,
    data: &'a [u8],
    link: Option<&'a str>,
}

impl<'a> RawMember<'a> {
    fn file(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            entry_type: tar::EntryType::Regular,
            data,
            link: None,
        }
    }

    fn special(name: &'a str, entry_type: tar::EntryType) -> Self {
        Self {
            name,
            entry_type,
            data: b"",
            link: None,
        }
    }

    fn link(name: &'a str, entry_type: tar::EntryType, target: &'a str) -> Self {
        Self {
            name,
            entry_type,
            data: b"",
            link: Some(target),
        }
    }
}

fn write_raw_archive(path: &Path, members: &[RawMember<'_>]) {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    for member in members {
        let mut header = tar::Header::new_old();
        {
            let old = header.as_old_mut();
            old.name[..member.name.len()].copy_from_slice(member.name.as_bytes());
            if let Some(link) = member.link {
                old.linkname[..link.len()].copy_from_slice(link.as_bytes());
            }
        }
        header.set_entry_type(member.entry_type);
        header.set_mode(0o644);
        header.set_size(member.data.len() as u64);
        header.set_cksum();
        builder.append(&header, member.data).unwrap();
    }
    builder.into_inner().unwrap();
}

const MINIMAL_DESCRIPTOR: &[u8] =
    br#"{"name": "ROOT", "type": "directory", "subdirectories": {}, "files": {}}"#;

fn malicious_package(dir: &Path, member: RawMember<'_>) -> PathBuf {
    let path = dir.join("malicious.pkg");
    write_raw_archive(
        &path,
        &[RawMember::file(".vfs", MINIMAL_DESCRIPTOR), member],
    );
    path
}

fn assert_threat(result: Result<(), VfsError>) {
    assert!(
        matches!(result, Err(VfsError::ThreatDetected { .. })),
        "expected a threat, got {result:?}"
    );
}

// =============================================================================
// Local Directories
// =============================================================================

#[test]
fn register_plain_directory() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    write_file(&tmp.path().join("vfstest.json"), r#"{"test": "value"}"#);
    write_file(&tmp.path().join("sub/vfstest.txt"), "test");
    fs::create_dir_all(tmp.path().join("empty")).unwrap();

    let mut vfs = Vfs::new();
    vfs.register_source(tmp.path()).unwrap();

    assert!(vfs.has_node("vfstest.json"));
    assert!(vfs.has_node("/sub/vfstest.txt"));
    assert!(vfs.get_node("empty").unwrap().is_dir());

    let json = vfs.get_content("vfstest.json", None).unwrap();
    assert_eq!(json.as_json().unwrap()["test"], "value");
    assert_eq!(vfs.read_text("sub/vfstest.txt").unwrap(), "test");

    let resource = vfs.get_node("sub/vfstest.txt").unwrap().latest().unwrap();
    assert_eq!(resource.version(), ResourceVersion::LATEST);
    assert_eq!(resource.resource_type(), ResourceType::LocalFile);
}

#[test]
fn register_directory_with_descriptor() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    write_file(&tmp.path().join("settings.json"), r#"{"debug": true}"#);
    write_file(
        &tmp.path().join(".vfs"),
        r#"{
            "name": "ROOT",
            "type": "directory",
            "subdirectories": {
                "config": {
                    "name": "config",
                    "type": "directory",
                    "subdirectories": {},
                    "files": {
                        "settings.json": {
                            "name": "settings.json",
                            "type": "file",
                            "resource": [{
                                "version": 3,
                                "descriptor": {
                                    "type": "localfile",
                                    "path": "settings.json",
                                    "contenttype": "application/json"
                                }
                            }]
                        }
                    }
                }
            },
            "files": {}
        }"#,
    );

    let mut vfs = Vfs::new();
    vfs.register_source(tmp.path()).unwrap();

    // Only the described tree is mounted, not the directory listing.
    assert!(!vfs.has_node("settings.json"));
    assert!(!vfs.has_node(".vfs"));

    #[derive(serde::Deserialize)]
    struct Settings {
        debug: bool,
    }
    let settings: Settings = vfs.read_json("config/settings.json").unwrap();
    assert!(settings.debug);
    assert!(
        vfs.get_node("config/settings.json")
            .unwrap()
            .has_resource(version(3))
    );
}

#[test]
fn yaml_files_read_as_typed_values() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(
        &tmp.path().join("config/app.yaml"),
        "name: murasame\nworkers: 4\nfeatures:\n  - packages\n  - versions\n",
    );

    let mut vfs = Vfs::new();
    vfs.register_source(tmp.path()).unwrap();

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct AppConfig {
        name: String,
        workers: u32,
        features: Vec<String>,
    }
    let config: AppConfig = vfs.read_json("config/app.yaml").unwrap();
    assert_eq!(
        config,
        AppConfig {
            name: "murasame".into(),
            workers: 4,
            features: vec!["packages".into(), "versions".into()],
        }
    );
}

#[test]
fn invalid_descriptor_fails_registration() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(&tmp.path().join(".vfs"), "{ not json");

    let mut vfs = Vfs::new();
    assert!(matches!(
        vfs.register_source(tmp.path()),
        Err(VfsError::Deserialization(_))
    ));
}

#[test]
fn custom_descriptor_file_name() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(
        &tmp.path().join("tree.json"),
        r#"{"name": "ROOT", "type": "directory", "subdirectories": {
            "only": {"name": "only", "type": "directory"}
        }}"#,
    );
    write_file(&tmp.path().join("ignored.txt"), "x");

    let mut vfs = Vfs::with_config(VfsConfig::default().with_descriptor_file("tree.json"));
    vfs.register_source(tmp.path()).unwrap();

    assert!(vfs.has_node("only"));
    assert!(!vfs.has_node("ignored.txt"));
}

// =============================================================================
// Packages
// =============================================================================

#[test]
fn register_package_serves_content() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();

    for (name, compressed) in [("plain.pkg", false), ("compressed.pkg", true)] {
        let path = build_package(tmp.path(), name, compressed);

        let mut vfs = Vfs::new();
        vfs.register_source(&path).unwrap();

        assert_eq!(vfs.packages().len(), 1);
        assert_eq!(vfs.packages()[0].path(), path.as_path());
        assert!(vfs.has_node("directory1/file1.txt"));
        assert!(vfs.has_node("directory2/file2.txt"));

        let resource = vfs.get_node("directory1/file1.txt").unwrap().latest().unwrap();
        let ResourceDescriptor::PackageFile(file) = resource.descriptor() else {
            panic!("expected a package file descriptor");
        };
        assert_eq!(file.package_path.as_deref(), Some(path.as_path()));

        assert_eq!(vfs.read_text("directory1/file1.txt").unwrap(), "file1");
        assert_eq!(vfs.read_text("directory2/file2.txt").unwrap(), "file2");
        let app: serde_json::Value = vfs.read_json("config/app.json").unwrap();
        assert_eq!(app["source"], "package");
    }
}

#[test]
fn register_same_package_twice_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let path = build_package(tmp.path(), "base.pkg", false);

    let mut vfs = Vfs::new();
    vfs.register_source(&path).unwrap();
    assert!(matches!(
        vfs.register_source(&path),
        Err(VfsError::AlreadyExists { .. })
    ));
}

#[test]
fn non_archive_file_fails_registration() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("notes.txt");
    write_file(&path, "hello");

    let mut vfs = Vfs::new();
    assert!(vfs.register_source(&path).is_err());
    assert!(vfs.packages().is_empty());
}

#[test]
fn local_files_shadow_package_files() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let package = build_package(tmp.path(), "base.pkg", true);
    let overrides = tmp.path().join("overrides");
    write_file(
        &overrides.join("config/app.json"),
        r#"{"source": "local"}"#,
    );

    let mut vfs = Vfs::new();
    vfs.register_source(&package).unwrap();
    vfs.register_source(&overrides).unwrap();

    let node = vfs.get_node("config/app.json").unwrap();
    assert_eq!(node.num_resources(), 2);

    let latest = vfs.get_content("config/app.json", None).unwrap();
    assert_eq!(latest.as_json().unwrap()["source"], "local");

    let packaged = vfs.get_content("config/app.json", Some(version(1))).unwrap();
    assert_eq!(packaged.as_json().unwrap()["source"], "package");

    // Untouched package files remain reachable.
    assert_eq!(vfs.read_text("directory2/file2.txt").unwrap(), "file2");
}

#[test]
fn failed_registration_mounts_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("clash.pkg");
    let mut builder = PackageBuilder::new();
    builder
        .add_file("alpha/x.txt", version(1), None, b"x".to_vec())
        .unwrap();
    builder.add_file("zeta", version(1), None, b"z".to_vec()).unwrap();
    builder.write(&path).unwrap();

    let mut vfs = Vfs::new();
    vfs.add_node(Node::new("zeta", NodeType::Directory).unwrap(), None)
        .unwrap();

    assert!(matches!(
        vfs.register_source(&path),
        Err(VfsError::TypeMismatch { ref name, .. }) if name == "zeta"
    ));
    assert!(vfs.packages().is_empty());
    assert!(!vfs.has_node("alpha/x.txt"));
    assert!(matches!(
        vfs.get_content("alpha/x.txt", None),
        Err(VfsError::NodeNotFound { .. })
    ));

    let local = tmp.path().join("local");
    write_file(&local.join("beta/y.txt"), "y");
    write_file(&local.join("zeta"), "z");
    assert!(vfs.register_source(&local).is_err());
    assert!(!vfs.has_node("beta/y.txt"));
    assert!(vfs.get_node("zeta").unwrap().is_dir());
}

#[test]
fn newer_package_versions_win() {
    let tmp = tempfile::tempdir().unwrap();

    let base = tmp.path().join("base.pkg");
    let mut builder = PackageBuilder::new();
    builder
        .add_file("strings/en.txt", version(1), None, b"hello".to_vec())
        .unwrap();
    builder.write(&base).unwrap();

    let patch = tmp.path().join("patch.pkg");
    let mut builder = PackageBuilder::new();
    builder
        .add_file("strings/en.txt", version(2), None, b"hello, world".to_vec())
        .unwrap();
    builder.write(&patch).unwrap();

    let mut vfs = Vfs::new();
    vfs.register_source(&patch).unwrap();
    vfs.register_source(&base).unwrap();

    assert_eq!(vfs.read_text("strings/en.txt").unwrap(), "hello, world");
    assert_eq!(
        vfs.get_content("strings/en.txt", Some(version(1)))
            .unwrap()
            .as_text(),
        Some("hello")
    );
    assert_eq!(vfs.packages().len(), 2);
}

#[test]
fn package_round_trip_from_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    write_file(&source.join("a/b/deep.txt"), "deep");
    write_file(&source.join("top.json"), "[1, 2, 3]");

    let mut builder = PackageBuilder::new().compressed(true);
    builder.add_directory(&source).unwrap();
    let path = tmp.path().join("dir.pkg");
    builder.write(&path).unwrap();

    let mut vfs = Vfs::new();
    vfs.register_source(&path).unwrap();

    assert_eq!(vfs.read_text("a/b/deep.txt").unwrap(), "deep");
    let top: Vec<u32> = vfs.read_json("top.json").unwrap();
    assert_eq!(top, vec![1, 2, 3]);
}

#[test]
fn extract_package_members() {
    let tmp = tempfile::tempdir().unwrap();
    let path = build_package(tmp.path(), "base.pkg", true);
    let archive = SecureArchive::open(&path, PackageLimits::default()).unwrap();

    let single = tmp.path().join("single");
    let extracted = archive.extract("/directory1/file1.txt", &single).unwrap();
    assert_eq!(fs::read_to_string(&extracted).unwrap(), "file1");

    let all = tmp.path().join("all");
    let count = archive.extract_all(&all).unwrap();
    assert_eq!(count, archive.members().len());
    assert_eq!(
        fs::read_to_string(all.join("directory2/file2.txt")).unwrap(),
        "file2"
    );
    assert!(all.join(".vfs").is_file());

    assert!(matches!(
        archive.extract("missing.txt", &single),
        Err(VfsError::NotFound { .. })
    ));
}

// =============================================================================
// TarBomb Protection
// =============================================================================

#[test]
fn rejects_path_traversal() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let path = malicious_package(tmp.path(), RawMember::file("../evil.txt", b"evil"));

    let mut vfs = Vfs::new();
    assert_threat(vfs.register_source(&path));
    assert!(vfs.packages().is_empty());

    let archive = SecureArchive::open(&path, PackageLimits::default()).unwrap();
    let dest = tmp.path().join("out");
    assert!(archive.extract_all(&dest).is_err());
    assert!(!tmp.path().join("evil.txt").exists());
}

#[test]
fn rejects_escaping_symlink() {
    let tmp = tempfile::tempdir().unwrap();
    let path = malicious_package(
        tmp.path(),
        RawMember::link("dir/passwd", tar::EntryType::Symlink, "../../etc/passwd"),
    );
    assert_threat(Vfs::new().register_source(&path));
}

#[test]
fn rejects_absolute_symlink() {
    let tmp = tempfile::tempdir().unwrap();
    let path = malicious_package(
        tmp.path(),
        RawMember::link("passwd", tar::EntryType::Symlink, "/etc/passwd"),
    );
    assert_threat(Vfs::new().register_source(&path));
}

#[test]
fn accepts_internal_symlink() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("links.pkg");
    write_raw_archive(
        &path,
        &[
            RawMember::file(".vfs", MINIMAL_DESCRIPTOR),
            RawMember::file("dir/real.txt", b"real"),
            RawMember::link("dir/alias.txt", tar::EntryType::Symlink, "real.txt"),
        ],
    );
    Vfs::new().register_source(&path).unwrap();
}

#[test]
fn rejects_escaping_hard_link() {
    let tmp = tempfile::tempdir().unwrap();
    let path = malicious_package(
        tmp.path(),
        RawMember::link("shadow", tar::EntryType::Link, "../../etc/shadow"),
    );
    assert_threat(Vfs::new().register_source(&path));
}

#[test]
fn rejects_device_files() {
    let tmp = tempfile::tempdir().unwrap();
    for entry_type in [tar::EntryType::Char, tar::EntryType::Block] {
        let path = malicious_package(tmp.path(), RawMember::special("dev/sda", entry_type));
        assert_threat(Vfs::new().register_source(&path));
    }
}

#[test]
fn rejects_nested_archives() {
    let tmp = tempfile::tempdir().unwrap();
    for name in ["payload.zip", "payload.tar", "payload.gz", "payload.7z"] {
        let path = malicious_package(tmp.path(), RawMember::file(name, b"PK"));
        assert_threat(Vfs::new().register_source(&path));
    }
}

#[test]
fn rejects_oversized_member() {
    let tmp = tempfile::tempdir().unwrap();
    let path = malicious_package(tmp.path(), RawMember::file("big.bin", &[0u8; 2048]));

    let limits = PackageLimits::default().with_max_member_size(1024);
    let mut vfs = Vfs::with_config(VfsConfig::default().with_limits(limits));
    assert!(matches!(
        vfs.register_source(&path),
        Err(VfsError::FileSizeExceeded { limit: 1024, .. })
    ));
}

#[test]
fn rejects_oversized_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("total.pkg");
    write_raw_archive(
        &path,
        &[
            RawMember::file(".vfs", MINIMAL_DESCRIPTOR),
            RawMember::file("a.bin", &[0u8; 600]),
            RawMember::file("b.bin", &[0u8; 600]),
        ],
    );

    let limits = PackageLimits::default().with_max_total_size(1024);
    assert!(matches!(
        SecureArchive::open(&path, limits.clone()),
        Err(VfsError::FileSizeExceeded { limit: 1024, .. })
    ));

    let archive = SecureArchive::open(&path, PackageLimits::default()).unwrap();
    assert!(archive.validate(Path::new("/tmp/out")).is_ok());
}

#[test]
fn rejects_compressed_bomb_from_headers() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bomb.pkg");

    // The header claims far more data than the stream holds.
    let mut header = tar::Header::new_gnu();
    header.set_path("payload.bin").unwrap();
    header.set_size(1 << 40);
    header.set_mode(0o644);
    header.set_cksum();
    let mut encoder = flate2::write::GzEncoder::new(
        File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(header.as_bytes()).unwrap();
    encoder.write_all(&[0u8; 4096]).unwrap();
    encoder.finish().unwrap();

    let mut vfs = Vfs::new();
    assert!(matches!(
        vfs.register_source(&path),
        Err(VfsError::FileSizeExceeded { .. })
    ));
}

#[test]
fn rejects_local_file_resources_in_package() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let secret = tmp.path().join("secret.txt");
    write_file(&secret, "HOST SECRET");

    let descriptor = format!(
        r#"{{"name": "ROOT", "type": "directory", "files": {{
            "leak.txt": {{"name": "leak.txt", "type": "file", "resource": [
                {{"version": 1, "descriptor": {{"type": "localfile", "path": "{}"}}}}
            ]}}
        }}}}"#,
        secret.display()
    );
    let path = tmp.path().join("leak.pkg");
    write_raw_archive(&path, &[RawMember::file(".vfs", descriptor.as_bytes())]);

    let mut vfs = Vfs::new();
    assert_threat(vfs.register_source(&path));
    assert!(!vfs.has_node("leak.txt"));
    assert!(vfs.packages().is_empty());
}

#[test]
fn rejects_too_many_members() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("many.pkg");
    let names: Vec<String> = (0..5).map(|i| format!("file{i}.txt")).collect();
    let mut members = vec![RawMember::file(".vfs", MINIMAL_DESCRIPTOR)];
    members.extend(names.iter().map(|name| RawMember::file(name, b"x")));
    write_raw_archive(&path, &members);

    let limits = PackageLimits::default().with_max_member_count(3);
    assert!(matches!(
        SecureArchive::open(&path, limits.clone()),
        Err(VfsError::MemberCountExceeded { limit: 3, .. })
    ));

    let mut vfs = Vfs::with_config(VfsConfig::default().with_limits(limits));
    assert!(matches!(
        vfs.register_source(&path),
        Err(VfsError::MemberCountExceeded { .. })
    ));
}

// =============================================================================
// Tree Operations
// =============================================================================

#[test]
fn get_all_files_after_registration() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(&tmp.path().join("loc/en.json"), "{}");
    write_file(&tmp.path().join("loc/hu.json"), "{}");
    write_file(&tmp.path().join("loc/readme.txt"), "x");
    write_file(&tmp.path().join("loc/extra/de.json"), "{}");

    let mut vfs = Vfs::new();
    vfs.register_source(tmp.path()).unwrap();

    assert_eq!(vfs.get_all_files("loc", false, None).len(), 3);
    assert_eq!(vfs.get_all_files("loc", false, Some(".json")).len(), 2);
    assert_eq!(vfs.get_all_files("loc", true, Some(".json")).len(), 3);
    assert!(vfs.get_all_files("loc/en.json", true, None).is_empty());
    assert!(vfs.get_all_files("missing", true, None).is_empty());
}

#[test]
fn add_merge_and_remove_nodes() {
    let mut vfs = Vfs::new();

    let mut first = Node::new("shared", NodeType::Directory).unwrap();
    first
        .add_node(Node::new("a.txt", NodeType::File).unwrap())
        .unwrap();
    let mut second = Node::new("shared", NodeType::Directory).unwrap();
    second
        .add_node(Node::new("b.txt", NodeType::File).unwrap())
        .unwrap();

    vfs.add_node(first, None).unwrap();
    vfs.add_node(second, None).unwrap();
    assert!(vfs.has_node("shared/a.txt"));
    assert!(vfs.has_node("shared/b.txt"));

    assert!(matches!(
        vfs.add_node(Node::new("shared", NodeType::File).unwrap(), None),
        Err(VfsError::TypeMismatch { .. })
    ));

    let removed = vfs.remove_node("shared/a.txt").unwrap();
    assert_eq!(removed.name(), "a.txt");
    assert!(!vfs.has_node("shared/a.txt"));
    assert!(vfs.has_node("shared"));
}

#[test]
fn tree_survives_descriptor_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = build_package(tmp.path(), "base.pkg", false);
    let mut vfs = Vfs::new();
    vfs.register_source(&path).unwrap();

    let value = vfs.root().to_value().unwrap();
    let parsed = Node::from_value(&value).unwrap();
    assert_eq!(&parsed, vfs.root());
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn concurrent_reads_share_cached_content() {
    let tmp = tempfile::tempdir().unwrap();
    let path = build_package(tmp.path(), "base.pkg", true);
    let mut vfs = Vfs::new();
    vfs.register_source(&path).unwrap();
    let vfs = Arc::new(vfs);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let vfs = Arc::clone(&vfs);
            std::thread::spawn(move || vfs.read_text("directory1/file1.txt").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "file1");
    }
    assert!(
        vfs.get_node("directory1/file1.txt")
            .unwrap()
            .latest()
            .unwrap()
            .is_loaded()
    );
}

#[test]
fn usable_through_trait_object() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(&tmp.path().join("a.txt"), "through dyn");

    let mut vfs: Box<dyn VfsApi> = Box::new(Vfs::new());
    vfs.register_source(tmp.path()).unwrap();
    assert_eq!(vfs.read_text("a.txt").unwrap(), "through dyn");
}
