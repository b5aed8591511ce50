//! Test fixture (S3): reads 8 bytes from /dev/urandom, closes it, then
//! reads 8 bytes from /dev/random, closing that too. Prints both as
//! hex, one per line.
use std::fs::File;
use std::io::Read;

fn read8(path: &str) -> [u8; 8] {
    let mut f = File::open(path).unwrap_or_else(|e| panic!("open {}: {}", path, e));
    let mut buf = [0u8; 8];
    f.read_exact(&mut buf)
        .unwrap_or_else(|e| panic!("read {}: {}", path, e));
    buf
}

fn main() {
    let first = read8("/dev/urandom");
    let second = read8("/dev/random");
    println!("{}", hex::encode(first));
    println!("{}", hex::encode(second));
}
