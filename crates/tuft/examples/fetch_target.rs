use std::env;
use std::fs;
use std::path::PathBuf;

use tuft::client::{ClientConfig, RepoManager};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 && args.len() != 6 {
        eprintln!(
            "Usage: {} <repos-root> <pet-name> <target> [<root.json> <mirror-uri>]",
            args[0]
        );
        std::process::exit(1);
    }
    let repos_root = PathBuf::from(&args[1]);
    let pet_name = &args[2];
    let target = &args[3];

    let mut manager = RepoManager::new(ClientConfig::new(repos_root))?;
    if args.len() == 6 {
        let root = fs::read(&args[4])?;
        manager.add(pet_name, &root, vec![args[5].clone()])?;
        println!("Registered {} from {}", pet_name, args[5]);
    }

    let mut repo = manager.get(pet_name)?;
    repo.update()?;
    println!("{} lists {} targets", pet_name, repo.target_names()?.len());

    let path = repo.get_target_path(target)?;
    println!("{} -> {}", target, path.display());
    Ok(())
}
