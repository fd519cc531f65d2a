//! Generates Swift and Kotlin bindings for `applock-core` built with the `ffi` feature.

fn main() {
    uniffi::uniffi_bindgen_main();
}
