use anyhow::Result;

fn main() -> Result<()> {
    ckg_cli::main_entry()
}
