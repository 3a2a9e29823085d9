use anyhow::Result;

fn main() -> Result<()> {
    modshelf::cli::run()
}
