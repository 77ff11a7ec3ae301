use anyhow::Result;

fn main() -> Result<()> {
    nbcollection_ci::cli::run()
}
