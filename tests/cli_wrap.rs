//! CLI integration tests for the `tilepack wrap` command.

use image::{Rgba, RgbaImage};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run tilepack wrap in `dir` and return (stdout, stderr, exit code).
fn run_wrap(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tilepack"))
        .current_dir(dir)
        .env_remove("TILEPACK_VERBOSE")
        .arg("wrap")
        .args(args)
        .output()
        .expect("Failed to execute tilepack");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

/// Image whose pixel rows carry their y coordinate in the red channel.
fn write_striped(dir: &TempDir, name: &str, width: u32, height: u32) {
    let image = RgbaImage::from_fn(width, height, |_, y| Rgba([y as u8, 0, 0, 255]));
    image.save(dir.path().join(name)).unwrap();
}

#[test]
fn test_step_one_down() {
    let dir = TempDir::new().unwrap();
    write_striped(&dir, "t.png", 8, 8);

    let (stdout, stderr, code) = run_wrap(dir.path(), &["t.png", "--", "out.png", "64", "1"]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert_eq!(
        stdout.trim(),
        "New image \"out.png\" created from 1 original tiles, resulting in a total of 8 tiles in a 64x8 configuration."
    );

    let sheet = image::open(dir.path().join("out.png")).unwrap().to_rgba8();
    assert_eq!(sheet.dimensions(), (64, 8));
    for k in 0..8u32 {
        for i in 0..8u32 {
            let expected = (i as i64 - k as i64).rem_euclid(8) as u8;
            assert_eq!(sheet.get_pixel(k * 8, i)[0], expected, "frame {} row {}", k, i);
        }
    }
}

#[test]
fn test_without_separator_and_up() {
    let dir = TempDir::new().unwrap();
    write_striped(&dir, "t.png", 16, 8);

    let (stdout, stderr, code) =
        run_wrap(dir.path(), &["--direction", "up", "t.png", "out.png", "16", "4"]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("from 2 original tiles, resulting in a total of 4 tiles in a 16x16"));

    let sheet = image::open(dir.path().join("out.png")).unwrap().to_rgba8();
    // Second cell is the first tile shifted up by four rows
    assert_eq!(sheet.get_pixel(8, 0)[0], 4);
    assert_eq!(sheet.get_pixel(8, 4)[0], 0);
}

#[test]
fn test_blend_and_frame_order() {
    let dir = TempDir::new().unwrap();
    write_striped(&dir, "t.png", 8, 16);

    let (_, stderr, code) = run_wrap(
        dir.path(),
        &["--blend", "--order", "frame", "t.png", "--", "out.png", "16", "4"],
    );
    assert_eq!(code, 0, "stderr: {}", stderr);

    let sheet = image::open(dir.path().join("out.png")).unwrap().to_rgba8();
    // Frame order: two originals, then both tiles shifted down by four
    assert_eq!(sheet.get_pixel(0, 0)[0], 0);
    assert_eq!(sheet.get_pixel(8, 0)[0], 8);
    assert_eq!(sheet.get_pixel(0, 8)[0], 12);
    assert_eq!(sheet.get_pixel(8, 8)[0], 4);
}

#[test]
fn test_invalid_step() {
    let dir = TempDir::new().unwrap();
    write_striped(&dir, "t.png", 8, 8);

    let (_, stderr, code) = run_wrap(dir.path(), &["t.png", "--", "out.png", "64", "3"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("step should be 1, 2 or 4"));
    assert!(!dir.path().join("out.png").exists());
}

#[test]
fn test_invalid_width() {
    let dir = TempDir::new().unwrap();
    write_striped(&dir, "t.png", 8, 8);

    let (_, stderr, code) = run_wrap(dir.path(), &["t.png", "--", "out.png", "60", "1"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("multiple of the tile width 8"));
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_wrap(dir.path(), &["none.png", "--", "out.png", "64", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("File none.png not found"));
}

#[test]
fn test_unaligned_input() {
    let dir = TempDir::new().unwrap();
    write_striped(&dir, "t.png", 8, 12);

    let (_, stderr, code) = run_wrap(dir.path(), &["t.png", "--", "out.png", "64", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not a multiple of the 8x8 tile size"));
}
