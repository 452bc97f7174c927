fn main() {
    // Only the device build links against ESP-IDF; host builds (tests,
    // fuzzing) have nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
