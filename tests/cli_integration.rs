//! Black-box tests for the `trajc` binary, driven as an external process.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// Locate the `trajc` binary produced by Cargo.
fn trajc_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_trajc") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("trajc");
    p
}

/// Writes a small binary frame file: `num_traj` little-endian f64s per frame.
fn make_binary_input(dir: &TempDir, num_traj: usize, num_frames: usize) -> (PathBuf, Vec<Vec<f64>>) {
    let path = dir.path().join("input.bin");
    let mut file = fs::File::create(&path).unwrap();
    let mut frames = Vec::with_capacity(num_frames);
    for i in 0..num_frames {
        let frame: Vec<f64> = (0..num_traj).map(|j| ((i + j) as f64 * 0.01).sin() * 3.0).collect();
        for &x in &frame {
            file.write_all(&x.to_le_bytes()).unwrap();
        }
        frames.push(frame);
    }
    (path, frames)
}

#[test]
fn compress_decompress_roundtrip_via_binary_files() {
    let dir = TempDir::new().unwrap();
    let num_traj = 4;
    let (input, frames) = make_binary_input(&dir, num_traj, 500);
    let compressed = dir.path().join("output.trajc");
    let roundtrip = dir.path().join("roundtrip.bin");

    let status = Command::new(trajc_bin())
        .args([
            "compress",
            "--src",
            input.to_str().unwrap(),
            "--dst",
            compressed.to_str().unwrap(),
            "--format",
            "binary",
            "--num-traj",
            &num_traj.to_string(),
            "--bound",
            "10",
            "--error",
            "0.01",
        ])
        .status()
        .expect("failed to run trajc compress");
    assert!(status.success(), "compress step should exit 0");
    assert!(compressed.exists());

    let status = Command::new(trajc_bin())
        .args([
            "decompress",
            "--src",
            compressed.to_str().unwrap(),
            "--dst",
            roundtrip.to_str().unwrap(),
            "--format",
            "binary",
            "--num-traj",
            &num_traj.to_string(),
            "--bound",
            "10",
            "--error",
            "0.01",
        ])
        .status()
        .expect("failed to run trajc decompress");
    assert!(status.success(), "decompress step should exit 0");

    let recovered_bytes = fs::read(&roundtrip).unwrap();
    assert_eq!(recovered_bytes.len(), frames.len() * num_traj * 8);
    for (i, frame) in frames.iter().enumerate() {
        for (j, &x) in frame.iter().enumerate() {
            let off = (i * num_traj + j) * 8;
            let got = f64::from_le_bytes(recovered_bytes[off..off + 8].try_into().unwrap());
            assert!((got - x).abs() <= 0.01 + 1e-9, "frame {i} traj {j}: {got} vs {x}");
        }
    }
}

#[test]
fn rejects_invalid_configuration_before_touching_files() {
    let dir = TempDir::new().unwrap();
    let (input, _frames) = make_binary_input(&dir, 2, 10);
    let output = dir.path().join("output.trajc");

    let status = Command::new(trajc_bin())
        .args([
            "compress",
            "--src",
            input.to_str().unwrap(),
            "--dst",
            output.to_str().unwrap(),
            "--num-traj",
            "2",
            "--bound",
            "10",
            "--error",
            "-1",
        ])
        .status()
        .expect("failed to run trajc");
    assert!(!status.success(), "a negative error tolerance must be rejected");
    assert!(!output.exists(), "no output should be written on a rejected configuration");
}
