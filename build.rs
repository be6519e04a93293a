fn main() {
    // Only the ESP-IDF backend needs the sysenv exported by embuild
    #[cfg(feature = "esp")]
    embuild::espidf::sysenv::output();
}
