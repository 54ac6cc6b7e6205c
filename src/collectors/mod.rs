/// Collector script invocation
pub mod script_collector;

pub use script_collector::ScriptCollector;
