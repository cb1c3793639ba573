pub mod client;
pub mod outputs;
pub mod poller;
