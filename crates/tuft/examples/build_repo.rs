use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tuft::crypto::{KeyPair, SigningScheme};
use tuft::repo::{RepoLayout, SigningKey};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = env::args().collect();
    let simple = args.iter().any(|a| a == "--simple");
    args.retain(|a| a != "--simple");

    if args.len() < 3 {
        eprintln!(
            "Usage: {} [--simple] <repo-dir> <key.pk8> [<file>...]",
            args[0]
        );
        std::process::exit(1);
    }
    let repo_dir = PathBuf::from(&args[1]);
    let key_path = PathBuf::from(&args[2]);

    let key = load_or_generate_key(&key_path)?;

    let mut files = Vec::new();
    for arg in &args[3..] {
        let path = Path::new(arg);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| format!("not a file name: {arg}"))?
            .to_string();
        println!("Adding {} as {}", path.display(), name);
        files.push((name, fs::read(path)?));
    }

    let layout = RepoLayout::new(&repo_dir, "json");
    let report = tuft::publish(&layout, Arc::new(key), !simple, files)?;

    println!("Published to {}", repo_dir.display());
    println!("  root:      v{}", report.root);
    println!("  targets:   v{}", report.targets);
    println!("  snapshot:  v{}", report.snapshot);
    println!("  timestamp: v{}", report.timestamp);
    Ok(())
}

/// Read an Ed25519 PKCS#8 key, creating one on first use
fn load_or_generate_key(path: &Path) -> Result<SigningKey, Box<dyn std::error::Error>> {
    let scheme = SigningScheme::Ed25519;
    if !path.exists() {
        println!("Generating new signing key at {}", path.display());
        fs::write(path, KeyPair::generate_pkcs8(scheme)?)?;
    }
    Ok(SigningKey::from_pkcs8(scheme, &fs::read(path)?)?)
}
