fn main() {
    // Host test builds run with `--no-default-features` and have no
    // ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
