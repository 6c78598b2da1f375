#![forbid(unsafe_code)]

/// `embed_migrations!` cannot tell cargo to rerun when only the SQL files
/// change, so the migration directory is tracked here instead.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
