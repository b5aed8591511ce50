//! Test fixture (S1): opens /dev/urandom, reads 32 bytes, prints them
//! as hex. Not part of the public crate; exercised only by the
//! integration tests via the real `keyed` binary.
use std::fs::File;
use std::io::Read;

fn main() {
    let mut f = File::open("/dev/urandom").expect("open /dev/urandom");
    let mut buf = [0u8; 32];
    f.read_exact(&mut buf).expect("read /dev/urandom");
    println!("{}", hex::encode(buf));
}
