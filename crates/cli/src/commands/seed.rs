use std::path::PathBuf;

use serde_json::json;
use shelfrec_core::{DemoArtifacts, SeedError};

use crate::commands::{load_config, CommandResult};

pub fn run(dir: Option<PathBuf>, force: bool) -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let mut artifacts = config.artifacts;
    if let Some(dir) = dir {
        artifacts.dir = dir;
    }

    match DemoArtifacts.write_to(&artifacts, force) {
        Ok(written) => {
            let demo = DemoArtifacts;
            let files: Vec<String> =
                written.iter().map(|path| path.display().to_string()).collect();
            CommandResult::success_with(
                "seed",
                format!(
                    "demo artifacts written to `{}` ({} users, {} items)",
                    artifacts.dir.display(),
                    demo.users().len(),
                    demo.products().len()
                ),
                Some(json!({
                    "files": files,
                    "sample_users": demo.users().iter().take(3).collect::<Vec<_>>(),
                    "sample_items": demo
                        .products()
                        .iter()
                        .take(3)
                        .map(|product| product.item_id)
                        .collect::<Vec<_>>(),
                })),
            )
        }
        Err(error @ SeedError::AlreadyExists(_)) => {
            CommandResult::failure("seed", "artifacts_exist", error.to_string(), 3)
        }
        Err(error @ SeedError::Write { .. }) => {
            CommandResult::failure("seed", "seed_write", error.to_string(), 4)
        }
        Err(error @ SeedError::Encode(_)) => {
            CommandResult::failure("seed", "seed_encode", error.to_string(), 5)
        }
    }
}
