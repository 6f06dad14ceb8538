pub mod config;
pub mod data;
pub mod expense;
pub mod period;
pub mod report;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(period::definitions())
        .chain(expense::definitions())
        .chain(report::definitions())
        .chain(data::definitions())
        .chain(config::definitions())
    {
        registry.register(entry);
    }
}
