pub mod client_actors;
pub mod engine;
pub mod location;
pub mod messages;
pub mod mount_guard;
pub mod remote;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
