use agriguard::cli;
use anyhow::Result;

// Main function
fn main() -> Result<()> {
    // Start the program
    let (action, globals) = cli::start()?;

    // Handle the action
    action.execute(&globals)?;

    Ok(())
}
