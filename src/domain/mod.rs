mod entry;
mod ledger;
mod money;
mod window;

pub use entry::*;
pub use ledger::*;
pub use money::*;
pub use window::*;
