use texpat_syntax::StrResult;

use crate::args::StylesCommand;
use crate::load;

/// Execute a styles command.
pub fn styles(command: &StylesCommand) -> StrResult<()> {
    let registry = load::registry(&command.styles)?;
    for info in registry.packages() {
        println!(
            "{}: {} symbols, {} commands, {} environments",
            info.name, info.symbols, info.commands, info.environments,
        );
    }
    Ok(())
}
