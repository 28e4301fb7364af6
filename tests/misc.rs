use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use visiondeck::models::MODEL_FILES;

fn thirdparty_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("3rdparty")
}

/// Returns the file paths listed in the first column of the attribution table.
fn attributed_files() -> HashSet<String> {
    let file = fs::read_to_string(thirdparty_dir().join("README.md")).unwrap();

    let mut present = HashSet::new();
    let mut in_table = false;
    for line in file.lines() {
        if in_table {
            if line.starts_with('|') {
                let rest = &line[line.find('`').unwrap() + 1..];
                let path = &rest[..rest.find('`').unwrap()];
                assert!(present.insert(path.to_string()), "`{path}` listed twice");
            } else {
                break;
            }
        } else if line.starts_with("|---") {
            in_table = true;
        }
    }
    present
}

#[test]
fn every_model_is_attributed() {
    let attributed = attributed_files();
    let models = MODEL_FILES
        .iter()
        .map(|name| format!("onnx/{name}"))
        .collect::<HashSet<_>>();
    assert_eq!(attributed, models);
}

#[test]
fn thirdparty_files_are_attributed() {
    let attributed = attributed_files();
    let dir = thirdparty_dir();
    for path in walkdir(&dir) {
        let path = path.strip_prefix(&dir).unwrap().to_str().unwrap();
        if path == "README.md" {
            continue;
        }
        assert!(
            attributed.contains(path),
            "3rdparty file `{path}` is not attributed in readme"
        );
    }
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut vec = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();

        if entry.file_name().into_string().unwrap().starts_with('.') {
            continue;
        }

        if entry.file_type().unwrap().is_dir() {
            vec.extend(walkdir(entry.path().as_path()));
        } else {
            vec.push(entry.path());
        }
    }
    vec
}
