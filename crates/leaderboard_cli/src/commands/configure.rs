use crate::config::Config;

/// Save the GitHub token used for code search.
///
/// An empty token is written as-is and disables code search, even when
/// `GITHUB_TOKEN` is set in the environment.
pub(crate) fn handle_configure(github_token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let token = github_token.trim();
    let path = Config::save_github_token(token)?;

    if token.is_empty() {
        println!("Code search disabled. Saved to {}", path.display());
        println!("Only repositories tagged with the topic will be discovered.");
    } else {
        println!("GitHub token saved to {}", path.display());
        println!("Code search is enabled for the next sync.");
    }

    Ok(())
}
