// ghprofile command-line shell.
// Reads commands from stdin and prints profiles and follow lists as they are published.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ghprofile::cache::ExpiringCache;
use ghprofile::fetch::{FetchCoordinator, OfflineSwitch, TcpProbe};
use ghprofile::github::{FollowEntry, GitHubClient, UserProfile};
use ghprofile::state::ProfileViewModel;
use ghprofile::{Config, FetchError, Result};

#[derive(Parser, Debug)]
#[command(name = "ghprofile", version, about = "Look up GitHub users, their followers and who they follow")]
struct Cli {
    /// Serve everything from the in-memory cache.
    #[arg(long)]
    offline: bool,

    /// Config file (defaults to the per-user config directory).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How long fetched data stays available offline, in seconds.
    #[arg(long, value_name = "SECS")]
    entry_lifetime: Option<u64>,

    /// GitHub REST API base URL.
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,
}

const HELP: &str = "\
commands:
  user <name>      look up a profile
  followers        list followers of the last profile
  following        list accounts the last profile follows
  offline on|off   force cache-only mode
  help             show this text
  quit             exit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ghprofile=warn")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.offline {
        config.offline = true;
    }
    if let Some(secs) = cli.entry_lifetime {
        config.entry_lifetime = Duration::from_secs(secs);
    }
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    config.validate()?;
    info!(?config, "starting");

    let reachability = Arc::new(OfflineSwitch::new(
        TcpProbe::new(config.probe_host.clone(), config.probe_timeout),
        config.offline,
    ));
    let coordinator = FetchCoordinator::new(
        Arc::new(GitHubClient::from_config(&config)?),
        reachability.clone(),
        Arc::new(ExpiringCache::with_lifetime(config.entry_lifetime)),
        Arc::new(ExpiringCache::with_lifetime(config.entry_lifetime)),
    )
    .with_api_base(config.api_base.clone());
    let api_base = config.api_base.clone();

    let mut vm = ProfileViewModel::new(Arc::new(coordinator));
    bind_output(&mut vm);

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        match (command, words.next()) {
            ("quit" | "exit", _) => break,
            ("help", _) => println!("{}", HELP),
            ("user", Some(name)) => {
                if vm.find_user_profile(name) {
                    vm.next_update().await;
                }
            }
            ("user", None) => println!("usage: user <name>"),
            ("followers" | "following", _) => {
                let target = vm.profile_store.value().as_ref().and_then(|profile| {
                    if command == "followers" {
                        profile.followers_target()
                    } else {
                        profile.following_target_at(&api_base)
                    }
                });
                match target {
                    Some(url) if vm.fetch_follows(&url) => vm.next_update().await,
                    _ => println!("nothing to list; look up a user with followers first"),
                }
            }
            ("offline", Some(mode @ ("on" | "off"))) => {
                reachability.set_forced_offline(mode == "on");
                println!("offline mode {}", mode);
            }
            _ => println!("unknown command; type `help`"),
        }
    }

    Ok(())
}

/// Print whatever the stores publish. The initial replay carries `None` and prints nothing.
fn bind_output(vm: &mut ProfileViewModel) {
    vm.profile_store.bind(|profile: &Option<UserProfile>| {
        if let Some(profile) = profile {
            print_profile(profile);
        }
    });

    vm.follows_store.bind(|entries: &Option<Vec<FollowEntry>>| {
        if let Some(entries) = entries {
            print_follows(entries);
        }
    });

    vm.error_store.bind(|error: &Option<FetchError>| match error {
        Some(FetchError::NotFound) => println!("User not found"),
        Some(error) => {
            warn!(%error, "fetch failed");
            println!("Request failed: {}", error);
        }
        None => {}
    });
}

fn print_profile(profile: &UserProfile) {
    println!("{}", profile.username);
    if let Some(name) = &profile.display_name {
        println!("  name:      {}", name);
    }
    if let Some(avatar) = &profile.avatar_url {
        println!("  avatar:    {}", avatar);
    }
    println!("  followers: {}", profile.followers_count);
    println!("  following: {}", profile.following_count);
    println!("  about:     {}", profile.about());
}

fn print_follows(entries: &[FollowEntry]) {
    if entries.is_empty() {
        println!("(empty)");
    }
    for entry in entries {
        println!("  {:<24} {}", entry.username, entry.avatar_url);
    }
}
