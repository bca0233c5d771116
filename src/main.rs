use std::path::PathBuf;
use tradevolve::config::ConfigManager;
use tradevolve::Population;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => manager.load_from_file(&path)?,
        None => manager.load_from_env()?,
    }
    let config = manager.get();

    let population = Population::open(&config)?;
    println!("Organisms - {}", population.count()?);
    println!("{}", population.stats()?);
    Ok(())
}
