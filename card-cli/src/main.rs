mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use card_collection::CollectionStore;
use card_fetch::{CardFetcher, DEFAULT_SET_QUERY};
use card_model::Card;
use card_profiles::ProfilesStore;
use fs_prefs::FilePrefs;

use crate::error::AppError;

#[derive(Parser, Debug)]
#[clap(name = "card-cli")]
#[clap(about = "Open booster packs and manage per-profile card collections", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage profiles and the active-profile pointer
    #[clap(subcommand)]
    Profile(ProfileCommand),

    /// Open a pack and add the pulls to the active profile's collection
    Open {
        #[clap(long, default_value_t = 6)]
        size: usize,

        #[clap(long, default_value = DEFAULT_SET_QUERY)]
        query: String,
    },

    /// Show the active profile's collection, merged and sorted
    List,

    /// Total copies held of a card, matched by folded name
    Count { name: String },

    /// Remove copies of a card, matched by folded name
    Delete {
        name: String,

        #[clap(long, default_value_t = 1)]
        quantity: u32,
    },

    /// Drop every entry in the active profile's collection
    Clear,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Create {
        email: String,

        #[clap(long, default_value = "")]
        username: String,
    },
    List,
    Switch { email: String },
    Delete { email: String },
}

fn data_dir() -> Result<PathBuf, AppError> {
    let dir = dirs::data_dir()
        .ok_or(AppError::DataDirNotFound)?
        .join("card-binder");
    log::debug!("cli: using data dir {}", dir.display());
    Ok(dir)
}

fn profiles_store() -> Result<ProfilesStore<FilePrefs>, AppError> {
    let prefs = FilePrefs::new(
        "Profiles".to_string(),
        &data_dir()?.join("profiles.json"),
    )?;
    Ok(ProfilesStore::new("Profiles".to_string(), prefs))
}

fn collection_store() -> Result<CollectionStore<FilePrefs>, AppError> {
    let prefs = FilePrefs::new(
        "Collection".to_string(),
        &data_dir()?.join("collection.json"),
    )?;
    Ok(CollectionStore::new("Collection".to_string(), prefs))
}

/// Identity matching only looks at the folded name, so a bare name is
/// enough to address a card in the collection.
fn probe_card(name: &str) -> Card {
    Card {
        id: String::new(),
        name: name.to_string(),
        faces: None,
        image_uris: None,
        rarity: String::new(),
    }
}

fn find_profile(
    store: &ProfilesStore<FilePrefs>,
    email: &str,
) -> Result<card_model::ProfileRecord, AppError> {
    store
        .load_all()
        .into_iter()
        .find(|p| p.email.to_lowercase() == email.to_lowercase())
        .ok_or_else(|| AppError::ProfileNotFound(email.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(cli.command).await?;
    Ok(())
}

async fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Profile(command) => run_profile(command),
        Command::Open { size, query } => {
            let profiles = profiles_store()?;
            let active = profiles.active_id();
            let fetcher = CardFetcher::public_api()?;

            println!("Cracking a pack of {size}...");
            let pulls = fetcher.fetch_pack(size, &query).await;
            if pulls.len() < size {
                println!("({} draws failed and were skipped)", size - pulls.len());
            }
            for card in &pulls {
                println!("  {} [{}]", card.name, card.rarity);
            }

            let mut collection = collection_store()?;
            collection.append(active, pulls)?;
            Ok(())
        }
        Command::List => {
            let profiles = profiles_store()?;
            let mut collection = collection_store()?;
            let entries = collection.normalized_sorted(profiles.active_id());
            if entries.is_empty() {
                println!("No boosters cracked yet.");
                return Ok(());
            }
            for entry in entries {
                println!("{:>4}x {} [{}]", entry.count, entry.card.name, entry.card.rarity);
            }
            Ok(())
        }
        Command::Count { name } => {
            let profiles = profiles_store()?;
            let mut collection = collection_store()?;
            let count = collection.count_for(profiles.active_id(), &probe_card(&name));
            println!("{count}");
            Ok(())
        }
        Command::Delete { name, quantity } => {
            let profiles = profiles_store()?;
            let mut collection = collection_store()?;
            let removed =
                collection.delete(profiles.active_id(), &probe_card(&name), quantity)?;
            if removed == 0 {
                println!("Nothing to delete.");
            } else {
                println!("Removed {removed} copies of {name}.");
            }
            Ok(())
        }
        Command::Clear => {
            let profiles = profiles_store()?;
            let mut collection = collection_store()?;
            collection.clear(profiles.active_id())?;
            println!("Collection cleared.");
            Ok(())
        }
    }
}

fn run_profile(command: ProfileCommand) -> Result<(), AppError> {
    let mut profiles = profiles_store()?;
    match command {
        ProfileCommand::Create { email, username } => {
            let record = profiles.upsert(None, &email, &username, None)?;
            println!("Active profile: {} <{}>", record.username, record.email);
            Ok(())
        }
        ProfileCommand::List => {
            let active = profiles.active_id();
            let all = profiles.load_all();
            if all.is_empty() {
                println!("No profiles yet.");
                return Ok(());
            }
            for profile in all {
                let marker = if Some(profile.id) == active { "*" } else { " " };
                println!("{marker} {} <{}>", profile.username, profile.email);
            }
            Ok(())
        }
        ProfileCommand::Switch { email } => {
            let record = find_profile(&profiles, &email)?;
            profiles.set_active(Some(record.id))?;
            println!("Active profile: {} <{}>", record.username, record.email);
            Ok(())
        }
        ProfileCommand::Delete { email } => {
            let record = find_profile(&profiles, &email)?;
            profiles.delete(record.id)?;
            println!("Deleted profile {}.", record.email);
            Ok(())
        }
    }
}
