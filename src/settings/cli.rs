use super::Parser;

/// Issues, refreshes and revokes access/refresh token pairs.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Path to the settings file. Defaults to `settings/dev.toml` in debug
    /// builds and `settings/release.toml` in release builds.
    #[arg(long)]
    pub settings: Option<String>,

    /// Overrides `http.address` from the settings file.
    #[arg(long)]
    pub address: Option<String>,
}
