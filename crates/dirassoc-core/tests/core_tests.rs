use dirassoc_core::{AssociationTree, NodeId, TreeConfig, TreeError};
use std::collections::HashSet;
use std::fs;
use std::path::MAIN_SEPARATOR;
use tempfile::TempDir;

fn backslash() -> TreeConfig {
    TreeConfig::builder().separator('\\').build().unwrap()
}

fn slash() -> TreeConfig {
    TreeConfig::builder().separator('/').build().unwrap()
}

/// Join segments with the platform separator.
fn native(segments: &[&str]) -> String {
    segments.join(&MAIN_SEPARATOR.to_string())
}

#[test]
fn test_path_reconstruction_with_base_directory() {
    let mut tree = AssociationTree::with_config("C:\\data", &backslash());
    tree.add_file("archive\\2020\\jan\\report.csv", 42u32, true)
        .unwrap();

    let jan = tree.find_directory("archive\\2020\\jan").unwrap();
    assert_eq!(tree.directory(jan), "C:\\data\\archive\\2020\\jan");
    assert_eq!(tree.node(jan).file("report.csv"), Some(&42));
    assert_eq!(tree.files(jan), vec!["report.csv"]);
}

#[test]
fn test_case_insensitive_paths() {
    let mut tree = AssociationTree::with_config("", &backslash());
    tree.add_file("Archive\\Jan\\Report.CSV", "first", true)
        .unwrap();

    let upper = tree.find_directory("ARCHIVE\\JAN").unwrap();
    let lower = tree.find_directory("archive\\jan").unwrap();
    assert_eq!(upper, lower);
    assert_eq!(tree.get_file("archive\\jan\\report.csv"), Some(&"first"));

    tree.add_file("archive\\jan\\report.csv", "second", false)
        .unwrap();
    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.files(lower), vec!["report.csv"]);
    assert_eq!(tree.get_file("Archive\\Jan\\Report.CSV"), Some(&"second"));
}

#[test]
fn test_idempotent_overwrite() {
    let mut tree = AssociationTree::with_config("", &slash());
    tree.add_file("docs/readme.txt", 1, false).unwrap();
    tree.add_file("docs/readme.txt", 2, false).unwrap();

    let docs = tree.find_directory("docs").unwrap();
    assert_eq!(tree.node(docs).file_count(), 1);
    assert_eq!(tree.get_file("docs/readme.txt"), Some(&2));
}

#[test]
fn test_duplicate_rejection() {
    let mut tree = AssociationTree::with_config("", &slash());
    tree.add_file("docs/readme.txt", 1, true).unwrap();

    let err = tree.add_file("DOCS/README.TXT", 2, true).unwrap_err();
    assert!(matches!(err, TreeError::DuplicateEntry { .. }));
    assert!(err.to_string().contains("DOCS/README.TXT"));
    assert_eq!(tree.get_file("docs/readme.txt"), Some(&1));
}

#[test]
fn test_empty_path_rejected() {
    let mut tree: AssociationTree<u8> = AssociationTree::new("");
    assert!(matches!(tree.add_file("", 0, false), Err(TreeError::EmptyPath)));
    assert!(matches!(
        tree.add_file_at(NodeId::ROOT, "", 0, false),
        Err(TreeError::EmptyPath)
    ));
}

#[test]
fn test_invalid_characters_rejected() {
    let mut tree = AssociationTree::with_config("", &slash());
    assert!(matches!(
        tree.add_file("docs/bad\0name.txt", 0, false),
        Err(TreeError::InvalidFileName { .. })
    ));
    assert!(matches!(
        tree.add_file("do\0cs/readme.txt", 0, false),
        Err(TreeError::InvalidName { .. })
    ));
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn test_uniqueness_invariant() {
    let mut tree = AssociationTree::with_config("", &slash());
    let paths = [
        "a/x.txt",
        "A/X.TXT",
        "a/b/y.txt",
        "A/B/Y.txt",
        "a/c/z.txt",
        "b/x.txt",
        "B/b/x.txt",
    ];
    for path in paths {
        tree.add_file(path, path.len(), false).unwrap();
    }

    for id in tree.iter() {
        let node = tree.node(id);
        let names: HashSet<&str> = node
            .children()
            .iter()
            .map(|&child| tree.node(child).name())
            .collect();
        assert_eq!(names.len(), node.child_count());

        let files: HashSet<String> = node.files().iter().map(|f| f.to_lowercase()).collect();
        assert_eq!(files.len(), node.file_count());
    }
    assert_eq!(tree.stats().total_files, 5);
}

#[test]
fn test_scenario_docs_readme() {
    let path = native(&["docs", "readme.txt"]);
    let mut tree = AssociationTree::new("");
    tree.add_file(&path, "v1".to_string(), false).unwrap();

    let docs = tree.find_directory("docs").unwrap();
    assert_eq!(tree.directory(docs), "docs");
    assert_eq!(tree.files(docs), vec!["readme.txt"]);
    assert_eq!(
        tree.node(docs).file("readme.txt").map(String::as_str),
        Some("v1")
    );
}

#[test]
fn test_associator_receives_original_path() {
    let mut tree = AssociationTree::with_config("", &slash());
    tree.add_file_with("Music/Song.MP3", |path| path.to_string(), true)
        .unwrap();

    assert_eq!(
        tree.get_file("music/song.mp3").map(String::as_str),
        Some("Music/Song.MP3")
    );
}

#[test]
fn test_pre_order_export_file() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("export.txt");

    let mut tree = AssociationTree::with_config("", &slash());
    tree.add_file("a.txt", "A", true).unwrap();
    tree.add_file("sub/b.txt", "B", true).unwrap();
    tree.export_file(&out, ';').unwrap();

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Directory;File;Association",
            ";;",
            ";a.txt;A",
            "sub;;",
            "sub;b.txt;B",
        ]
    );
}

#[test]
fn test_export_file_truncates_existing() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("export.txt");
    fs::write(&out, "stale content that is much longer than the export\n".repeat(10)).unwrap();

    let tree: AssociationTree<u8> = AssociationTree::with_config("root", &slash());
    tree.export_file(&out, ',').unwrap();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "Directory,File,Association\nroot,,\n"
    );
}

#[test]
fn test_export_file_reports_path_on_failure() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("missing").join("export.txt");

    let tree: AssociationTree<u8> = AssociationTree::new("");
    let err = tree.export_file(&out, ',').unwrap_err();
    assert!(matches!(err, TreeError::Io { .. }));
}

#[test]
fn test_persisted_round_trip() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("tree.json");

    let inserted = [
        ("archive\\2020\\jan\\report.csv", 1u64),
        ("archive\\2020\\feb\\report.csv", 2),
        ("archive\\notes.txt", 3),
        ("top.txt", 4),
    ];
    let mut tree = AssociationTree::with_config("C:\\data", &backslash());
    for (path, value) in inserted {
        tree.add_file(path, value, true).unwrap();
    }
    tree.set_directory_association("archive\\2020", 2020).unwrap();
    tree.save(&file).unwrap();

    let loaded: AssociationTree<u64> = AssociationTree::load(&file).unwrap();
    assert_eq!(loaded.base_directory(), "C:\\data");
    assert_eq!(loaded.separator(), '\\');
    assert_eq!(loaded.node_count(), tree.node_count());

    for (path, value) in inserted {
        let (dir, file_name) = path.rsplit_once('\\').unwrap_or(("", path));
        let id = loaded.find_directory(dir).unwrap();
        let rebuilt = format!("{}\\{}", loaded.directory(id), file_name);
        assert_eq!(rebuilt, format!("C:\\data\\{path}"));
        assert_eq!(loaded.node(id).file(file_name), Some(&value));
    }

    let year = loaded.find_directory("archive\\2020").unwrap();
    assert_eq!(loaded.node(year).directory_association(), Some(&2020));
}

#[test]
fn test_relocate_loaded_tree() {
    let mut tree = AssociationTree::with_config("/mnt/old", &slash());
    tree.add_file("photos/cat.jpg", (), false).unwrap();

    let mut json = Vec::new();
    tree.to_writer(&mut json).unwrap();
    let mut loaded: AssociationTree<()> = AssociationTree::from_reader(json.as_slice()).unwrap();
    loaded.set_base_directory("/srv/new");

    let photos = loaded.find_directory("photos").unwrap();
    assert_eq!(loaded.directory(photos), "/srv/new/photos");
}

#[test]
fn test_load_missing_file() {
    let temp = TempDir::new().unwrap();
    let result = AssociationTree::<String>::load(temp.path().join("nope.json"));
    assert!(matches!(result, Err(TreeError::Io { .. })));
}

#[test]
fn test_load_malformed_json() {
    let result = AssociationTree::<String>::from_reader("{ not json".as_bytes());
    assert!(matches!(result, Err(TreeError::Serialization(_))));
}
