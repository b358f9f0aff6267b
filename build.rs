//! Build script for mcucalc
//!
//! Embeds build-time information (git commit, dirty status, build timestamp)
//! shown by `mcucalc --version`.

fn main() {
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build info");
}
