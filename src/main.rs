//! rbac-admin - operator console for account permissions
//!
//! Lists the permission catalog and grants, denies or revokes explicit
//! permissions of accounts.

use account_rbac::auth::rbac::{
    AccountListing, CatalogDocument, CatalogSource, FileCatalogSource, PermissionId,
    PermissionListing, PermissionStore, RbacCommands, RbacManager, RealmScope, SecurityLevel,
};
use account_rbac::config::{CatalogSourceKind, Config};
use account_rbac::storage::MemoryPermissionStore;
use account_rbac::storage::database::{Database, DatabaseCatalogSource};
use account_rbac::utils::logging::init_logging;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "rbac-admin", version, about = "Manage account permissions")]
struct Cli {
    /// Configuration file; environment variables are used when omitted
    #[arg(short, long, env = "RBAC_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all permissions, or one permission with its links
    Permissions {
        #[arg(long)]
        id: Option<PermissionId>,
    },
    /// Inspect or change the permissions of an account
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Maintain the catalog tables
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Show granted, denied and effective permissions
    List(TargetArgs),
    /// Grant a permission
    Grant(ChangeArgs),
    /// Deny a permission
    Deny(ChangeArgs),
    /// Remove a permission from the granted and denied lists
    Revoke(ChangeArgs),
    /// Check whether a permission is in force
    Check {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        permission: PermissionId,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Replace the catalog tables with a YAML catalog
    Import {
        path: PathBuf,
        /// Realm the default permissions apply to
        #[arg(long, default_value = "global")]
        realm: RealmScope,
    },
    /// Print the loaded catalog as YAML
    Export,
    /// Row counts of the RBAC tables
    Stats,
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Account id
    #[arg(long)]
    account: u32,
    /// Account name, for messages
    #[arg(long, default_value = "")]
    name: String,
    /// Security level of the account
    #[arg(long, default_value = "player")]
    level: SecurityLevel,
}

#[derive(Args, Debug)]
struct ChangeArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Permission id
    #[arg(long)]
    permission: PermissionId,
    /// `global` or a realm id
    #[arg(long, default_value = "global")]
    realm: RealmScope,
    /// Security level of the operator issuing the command
    #[arg(long = "as", default_value = "console")]
    invoker: SecurityLevel,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::from_env()?,
    };
    init_logging(&config.logging)?;

    let database = if config.storage.database.enabled {
        let db = Database::new(&config.storage.database)
            .await
            .context("Failed to connect to the database")?;
        db.migrate().await?;
        Some(Arc::new(db))
    } else {
        None
    };

    if let Command::Catalog {
        command: CatalogCommand::Import { path, realm },
    } = &cli.command
    {
        let db = database.context("Catalog import requires storage.database.enabled")?;
        let catalog = FileCatalogSource::new(path).load().await?;
        db.import_rbac_catalog(&catalog, *realm).await?;
        println!(
            "Imported {} permissions and {} default permissions",
            catalog.permissions.len(),
            catalog.defaults.len()
        );
        return Ok(());
    }

    let store: Arc<dyn PermissionStore> = match &database {
        Some(db) => db.clone(),
        None => {
            warn!("No database configured; permission changes are lost on exit");
            Arc::new(MemoryPermissionStore::new())
        }
    };

    let source: Box<dyn CatalogSource> = match config.rbac.catalog.source {
        CatalogSourceKind::File => Box::new(FileCatalogSource::new(&config.rbac.catalog.path)),
        CatalogSourceKind::Database => {
            let db = database
                .clone()
                .context("A database catalog requires storage.database.enabled")?;
            Box::new(DatabaseCatalogSource::new(db, config.rbac.realm_id))
        }
    };
    let manager = RbacManager::new(&config.rbac, source.as_ref(), store)
        .await
        .context("Failed to load the permission catalog")?;
    let commands = RbacCommands::new(Arc::new(manager));

    match cli.command {
        Command::Permissions { id } => {
            let listings = commands.list_permissions(id)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&listings)?);
            } else {
                print_permissions(&listings);
            }
        }
        Command::Account { command } => run_account(&commands, command, cli.json).await?,
        Command::Catalog { command } => match command {
            // Imported before the catalog is loaded
            CatalogCommand::Import { .. } => {}
            CatalogCommand::Export => {
                let document = CatalogDocument::from_catalog(&commands.manager().catalog());
                println!("{}", serde_yaml::to_string(&document)?);
            }
            CatalogCommand::Stats => {
                let db = database.context("Stats require storage.database.enabled")?;
                let stats = db.stats().await?;
                println!("permissions:         {}", stats.permissions);
                println!("linked permissions:  {}", stats.linked_permissions);
                println!("default permissions: {}", stats.default_permissions);
                println!("account permissions: {}", stats.account_permissions);
            }
        },
    }

    Ok(())
}

async fn run_account(
    commands: &RbacCommands,
    command: AccountCommand,
    json: bool,
) -> anyhow::Result<()> {
    let manager = commands.manager();
    match command {
        AccountCommand::List(target) => {
            let account = manager
                .account(target.account, &target.name, target.level)
                .await?;
            let listing = commands.account_list(&account);
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print_account(&listing);
            }
        }
        AccountCommand::Check { target, permission } => {
            let allowed = manager
                .has_permission(target.account, target.level, permission)
                .await?;
            println!(
                "Account {} {} permission {}",
                target.account,
                if allowed { "has" } else { "does not have" },
                permission
            );
        }
        AccountCommand::Grant(args) => {
            let mut account = manager
                .account(args.target.account, &args.target.name, args.target.level)
                .await?;
            let message = commands
                .account_grant(args.invoker, &mut account, args.permission, args.realm)
                .await?;
            println!("{}", message);
        }
        AccountCommand::Deny(args) => {
            let mut account = manager
                .account(args.target.account, &args.target.name, args.target.level)
                .await?;
            let message = commands
                .account_deny(args.invoker, &mut account, args.permission, args.realm)
                .await?;
            println!("{}", message);
        }
        AccountCommand::Revoke(args) => {
            let mut account = manager
                .account(args.target.account, &args.target.name, args.target.level)
                .await?;
            let message = commands
                .account_revoke(args.invoker, &mut account, args.permission, args.realm)
                .await?;
            println!("{}", message);
        }
    }
    Ok(())
}

fn print_permissions(listings: &[PermissionListing]) {
    for listing in listings {
        if listing.linked.is_empty() {
            println!("{:>6}  {}", listing.id, listing.name);
        } else {
            let linked: Vec<String> = listing.linked.iter().map(|id| id.to_string()).collect();
            println!("{:>6}  {}  -> {}", listing.id, listing.name, linked.join(", "));
        }
    }
}

fn print_account(listing: &AccountListing) {
    println!(
        "Account {} ({}), security level {}",
        listing.name, listing.account_id, listing.security_level
    );
    for (title, entries) in [
        ("Granted", &listing.granted),
        ("Denied", &listing.denied),
        ("Effective", &listing.effective),
    ] {
        println!("{}:", title);
        if entries.is_empty() {
            println!("  (none)");
        }
        for entry in entries.iter() {
            println!("  {:>6}  {}", entry.id, entry.name);
        }
    }
}
