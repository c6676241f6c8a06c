//! Configuration access port trait.

/// Raw key lookup; typed parsing and validation happen in the domain layer
/// so that a bad value is an error rather than a silent default.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
