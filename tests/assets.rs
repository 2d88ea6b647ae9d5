extern crate placeholder_icons;

use placeholder_icons::{IdatPayload, PngFile, ICON_FILE_NAME, PNG_TARGETS};
use std::fs;
use std::path::{Path, PathBuf};

//===========================================================================//

#[test]
fn write_icon_file() {
    let dir = scratch_dir("write_icon_file");
    let path = placeholder_icons::write_icon(&dir).unwrap();
    assert_eq!(path, dir.join(ICON_FILE_NAME));
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 4158);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn write_png_files() {
    let dir = scratch_dir("write_png_files");
    let paths =
        placeholder_icons::write_placeholders(&dir, IdatPayload::Stub)
            .unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["32x32.png", "128x128.png", "128x128@2x.png"]);
    for (path, target) in paths.iter().zip(PNG_TARGETS.iter()) {
        let png = PngFile::read(fs::File::open(path).unwrap()).unwrap();
        let header = png.header().unwrap();
        assert_eq!(header.width, target.width);
        assert_eq!(header.height, target.height);
    }
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn outputs_are_idempotent() {
    let dir = scratch_dir("outputs_are_idempotent");
    let first = write_all(&dir);
    let second = write_all(&dir);
    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn write_into_missing_nested_dir() {
    let dir = scratch_dir("write_into_missing_nested_dir");
    let nested = dir.join("icons").join("generated");
    placeholder_icons::write_icon(&nested).unwrap();
    assert!(nested.join(ICON_FILE_NAME).is_file());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn write_fails_when_dir_is_a_file() {
    let dir = scratch_dir("write_fails_when_dir_is_a_file");
    fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();
    assert!(placeholder_icons::write_icon(&blocker).is_err());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn inspect_continues_past_bad_files() {
    let dir = scratch_dir("inspect_continues_past_bad_files");
    let icon = placeholder_icons::write_icon(&dir).unwrap();
    let corrupt = dir.join("corrupt.ico");
    // A directory entry claiming 4 GiB of image data.
    let mut bytes = fs::read(&icon).unwrap();
    bytes[14..18].copy_from_slice(&u32::MAX.to_le_bytes());
    fs::write(&corrupt, &bytes).unwrap();
    let missing = dir.join("missing.png");
    let pngs =
        placeholder_icons::write_placeholders(&dir, IdatPayload::Stub)
            .unwrap();
    let paths = vec![corrupt, missing, icon, pngs[0].clone()];
    let mut out = Vec::new();
    let num_failed =
        placeholder_icons::inspect_files(&paths, &mut out).unwrap();
    assert_eq!(num_failed, 2);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("  error: ").count(), 2);
    assert!(text.contains("ICO, 4158 bytes, 1 entries"));
    assert!(text.contains("PNG, 70 bytes, 32x32"));
    fs::remove_dir_all(&dir).unwrap();
}

//===========================================================================//

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "placeholder-icons-{}-{}",
        std::process::id(),
        name
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn write_all(dir: &Path) -> Vec<Vec<u8>> {
    let mut paths = vec![placeholder_icons::write_icon(dir).unwrap()];
    paths.extend(
        placeholder_icons::write_placeholders(dir, IdatPayload::Stub)
            .unwrap(),
    );
    paths.iter().map(|path| fs::read(path).unwrap()).collect()
}

//===========================================================================//
