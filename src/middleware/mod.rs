pub mod fault;
pub mod latency;
