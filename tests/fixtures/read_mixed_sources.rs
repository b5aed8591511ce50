//! Test fixture (S5): reads from a plain file (path given as argv[1])
//! and from /dev/urandom, printing both as hex. Only the entropy read
//! should be substituted.
use std::fs::File;
use std::io::Read;

fn main() {
    let plain_path = std::env::args().nth(1).expect("argv[1]: path to plain file");
    let mut plain = File::open(&plain_path).unwrap_or_else(|e| panic!("open {}: {}", plain_path, e));
    let mut plain_buf = [0u8; 4];
    plain
        .read_exact(&mut plain_buf)
        .unwrap_or_else(|e| panic!("read {}: {}", plain_path, e));

    let mut entropy = File::open("/dev/urandom").expect("open /dev/urandom");
    let mut entropy_buf = [0u8; 4];
    entropy
        .read_exact(&mut entropy_buf)
        .expect("read /dev/urandom");

    println!("{}", hex::encode(plain_buf));
    println!("{}", hex::encode(entropy_buf));
}
