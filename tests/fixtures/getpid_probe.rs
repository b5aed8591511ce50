//! Test fixture (S4): prints the process's own pid (via getpid(2)),
//! then a plain write to stdout, to verify that forging getpid()
//! doesn't disturb unrelated syscalls.
fn main() {
    println!("pid={}", std::process::id());
    println!("unaffected");
}
