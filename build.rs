fn main() {
    println!("cargo:rerun-if-env-changed=ROSLYN_MCP_VERSION");
    if let Ok(version) = std::env::var("ROSLYN_MCP_VERSION") {
        println!("cargo:rustc-env=CARGO_PKG_VERSION={version}");
    }
}
