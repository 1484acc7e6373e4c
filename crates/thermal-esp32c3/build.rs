fn main() {
    // Rebuild when the device configuration changes.
    println!("cargo:rerun-if-changed=cfg.toml");
}
