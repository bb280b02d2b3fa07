//! `daotx version` - display version information.

pub fn execute() {
    println!("daotx {}", env!("CARGO_PKG_VERSION"));
}
