use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // The RTC is seeded from the build instant when it reports power loss.
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    println!("cargo:rustc-env=AQUAFEED_BUILD_EPOCH={epoch}");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
