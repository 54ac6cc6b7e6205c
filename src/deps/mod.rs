/// Best-effort installation of external tools
pub mod ensurer;

pub use ensurer::{DependencyEnsurer, InstallOutcome, Installer};
