//! Test fixture (S2): calls getrandom(2) twice with 16-byte buffers
//! and prints each result as hex on its own line.
use std::os::raw::c_void;

fn getrandom(buf: &mut [u8]) -> isize {
    unsafe { libc::getrandom(buf.as_mut_ptr() as *mut c_void, buf.len(), 0) }
}

fn main() {
    let mut first = [0u8; 16];
    let mut second = [0u8; 16];
    assert_eq!(getrandom(&mut first), 16);
    assert_eq!(getrandom(&mut second), 16);
    println!("{}", hex::encode(first));
    println!("{}", hex::encode(second));
}
