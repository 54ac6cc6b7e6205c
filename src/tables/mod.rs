/// Whitespace-delimited table parsing
pub mod table;

/// `ps aux` process table
pub mod process;

/// `df -h` disk usage table
pub mod disk;

/// `vm_stat` memory statistics
pub mod vmstat;

pub use disk::{DiskRecord, DiskTable};
pub use process::{ProcessRecord, ProcessTable};
pub use table::{ParseOptions, Row, Table};
pub use vmstat::VmStats;
