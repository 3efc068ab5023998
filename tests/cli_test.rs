use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAMPLE: &str = "This is a sample text file to demonstrate compression.
This is a sample text file to demonstrate compression.
This is a sample text file to demonstrate compression.
";

fn round_trip_test(method: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("sample.txt");
    let cmp_path = temp_dir.path().join("sample.cmp");
    let out_path = temp_dir.path().join("expanded.txt");
    std::fs::write(&in_path,SAMPLE)?;
    let mut cmd = Command::cargo_bin("cmpr")?;
    cmd.arg("compress")
        .arg("-m").arg(method)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    let mut cmd = Command::cargo_bin("cmpr")?;
    cmd.arg("expand")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    match (std::fs::read(in_path),std::fs::read(out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with original")
    }
    Ok(())
}

#[test]
fn rle_round_trip() -> STDRESULT {
    round_trip_test("rle")
}

#[test]
fn huffman_round_trip() -> STDRESULT {
    round_trip_test("huffman")
}

#[test]
fn lzw_round_trip() -> STDRESULT {
    round_trip_test("lzw")
}

#[test]
fn expansion_names_output_from_stored_extension() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("sample.txt");
    let cmp_path = temp_dir.path().join("packed.cmp");
    std::fs::write(&in_path,SAMPLE)?;
    let mut cmd = Command::cargo_bin("cmpr")?;
    cmd.arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    // no -o here, the name comes from the container's extension hint
    let mut cmd = Command::cargo_bin("cmpr")?;
    cmd.arg("expand")
        .arg("-i").arg(&cmp_path)
        .assert()
        .success();
    let restored = std::fs::read(temp_dir.path().join("packed.txt"))?;
    assert_eq!(restored,SAMPLE.as_bytes());
    Ok(())
}

#[test]
fn foreign_files_are_rejected() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("not_compressed.txt");
    std::fs::write(&in_path,SAMPLE)?;
    let mut cmd = Command::cargo_bin("cmpr")?;
    cmd.arg("expand")
        .arg("-i").arg(&in_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("magic"));
    Ok(())
}
