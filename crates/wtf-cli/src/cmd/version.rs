/// Print build version and commit.
pub fn version() {
    println!("wtf {}", env!("WTF_VERSION"));
    println!("Commit: {}", env!("WTF_COMMIT"));
}
