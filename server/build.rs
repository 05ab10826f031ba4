fn main() {
    println!("cargo:rerun-if-changed=../site-src/redirects");
    println!("cargo:rerun-if-changed=../site-src/redirects.toml");
    println!("cargo:rerun-if-changed=../redirects/src");
    println!("cargo:rerun-if-changed=../redirects/templates");
    redirects::compile("../site-src", "../site").unwrap();
}
