//! End-to-end determinism and substitution scenarios (S1, S2, S3, S5)
//! from the testable-properties section: the keystream a child
//! observes through its entropy reads must match
//! `ChaCha20(KDF(passphrase), nonce=0)` exactly, regardless of which
//! API (`read`, `getrandom`) or how many opens/closes it went through.
use std::io::Write;

use assert_cmd::Command;

use keyed::kdf::derive_key;
use keyed::keystream::Keystream;

fn keyfile_with(passphrase: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "{}", passphrase).unwrap();
    f
}

fn expected_keystream(passphrase: &str, len: usize) -> Vec<u8> {
    let key = derive_key(passphrase.as_bytes()).unwrap();
    let mut ks = Keystream::new(&key);
    let mut buf = vec![0u8; len];
    ks.fill(&mut buf, len);
    buf
}

#[test]
fn s1_single_urandom_read_matches_keystream_prefix() {
    let keyfile = keyfile_with("test");
    let expected = expected_keystream("test", 32);

    let assert = Command::cargo_bin("keyed")
        .unwrap()
        .arg("-k")
        .arg(keyfile.path())
        .arg(assert_cmd::cargo::cargo_bin("read_urandom"))
        .assert()
        .success();

    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(out.trim(), hex::encode(expected));
}

#[test]
fn s2_two_getrandom_calls_yield_consecutive_segments() {
    let keyfile = keyfile_with("test");
    let expected = expected_keystream("test", 32);

    let assert = Command::cargo_bin("keyed")
        .unwrap()
        .arg("-k")
        .arg(keyfile.path())
        .arg(assert_cmd::cargo::cargo_bin("getrandom_twice"))
        .assert()
        .success();

    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let mut lines = out.lines();
    assert_eq!(lines.next().unwrap(), hex::encode(&expected[..16]));
    assert_eq!(lines.next().unwrap(), hex::encode(&expected[16..]));
}

#[test]
fn s3_close_then_reopen_continues_the_same_keystream() {
    let keyfile = keyfile_with("test");
    let expected = expected_keystream("test", 16);

    let assert = Command::cargo_bin("keyed")
        .unwrap()
        .arg("-k")
        .arg(keyfile.path())
        .arg(assert_cmd::cargo::cargo_bin("open_close_reopen"))
        .assert()
        .success();

    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let mut lines = out.lines();
    assert_eq!(lines.next().unwrap(), hex::encode(&expected[..8]));
    assert_eq!(lines.next().unwrap(), hex::encode(&expected[8..]));
}

#[test]
fn s5_only_the_entropy_read_is_substituted() {
    let keyfile = keyfile_with("test");
    let expected = expected_keystream("test", 4);

    let mut plain_file = tempfile::NamedTempFile::new().unwrap();
    plain_file.write_all(b"\xDE\xAD\xBE\xEF").unwrap();

    let assert = Command::cargo_bin("keyed")
        .unwrap()
        .arg("-k")
        .arg(keyfile.path())
        .arg(assert_cmd::cargo::cargo_bin("read_mixed_sources"))
        .arg(plain_file.path())
        .assert()
        .success();

    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let mut lines = out.lines();
    assert_eq!(lines.next().unwrap(), "deadbeef");
    assert_eq!(lines.next().unwrap(), hex::encode(&expected));
}

#[test]
fn determinism_across_two_runs() {
    let keyfile = keyfile_with("reproducible");

    let run = || {
        let assert = Command::cargo_bin("keyed")
            .unwrap()
            .arg("-k")
            .arg(keyfile.path())
            .arg(assert_cmd::cargo::cargo_bin("read_urandom"))
            .assert()
            .success();
        String::from_utf8(assert.get_output().stdout.clone()).unwrap()
    };

    assert_eq!(run(), run());
}
