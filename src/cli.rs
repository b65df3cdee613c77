//! Administrative command line.
//!
//! Everything besides `serve` operates directly on the PostgreSQL database
//! named by `DATABASE_URL`:
//!
//! ```text
//! status_dashboard user add alice
//! status_dashboard service add "Public API" --description "REST API" --order 1
//! status_dashboard service edit 3 --active false
//! status_dashboard update post 3 down --problem "Database unreachable" --as alice
//! status_dashboard key create "Deploy bot" --created-by alice
//! status_dashboard key revoke 7
//! ```

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};

use crate::{
    config::Config,
    error::AppError,
    models::{
        service::{NewService, ServiceChanges},
        status_update::ServiceStatus,
    },
    services::{
        auth_service,
        ingestion::{self, AdminUpdate},
        resolver,
    },
    store::StatusStore,
};

#[derive(Debug, Parser)]
#[command(name = "status_dashboard", version, about = "Service status dashboard backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Manage administrators
    #[command(subcommand)]
    User(UserCommand),

    /// Manage tracked services
    #[command(subcommand)]
    Service(ServiceCommand),

    /// Record status updates
    #[command(subcommand)]
    Update(UpdateCommand),

    /// Manage API keys
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register an administrator
    Add { username: String },
}

#[derive(Debug, Subcommand)]
pub enum ServiceCommand {
    /// Create a service
    Add {
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Display order, lower first
        #[arg(long, default_value_t = 0)]
        order: i32,

        /// Create hidden from the status page
        #[arg(long)]
        inactive: bool,
    },

    /// Edit a service; `--active false` hides it without deleting history
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        order: Option<i32>,

        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,
    },

    /// List services with their current status
    List {
        /// Include inactive services
        #[arg(long)]
        all: bool,
    },

    /// Permanently delete a service and its whole history
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum UpdateCommand {
    /// Record a status update for a service
    Post {
        service_id: i64,

        /// One of: stable, degraded, partial, down, maintenance
        status: ServiceStatus,

        #[arg(long, default_value = "")]
        problem: String,

        #[arg(long, default_value = "")]
        plan: String,

        #[arg(long, default_value = "")]
        comments: String,

        /// Username of the acting administrator
        #[arg(long = "as")]
        acting_user: Option<String>,

        /// Backdate the update (RFC 3339)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Issue a new API key; the key is printed once
    Create {
        name: String,

        #[arg(long)]
        created_by: Option<String>,
    },

    /// List API keys
    List,

    /// Deactivate an API key
    Revoke { id: i64 },
}

/// Run an administrative command against the configured database.
pub async fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for administrative commands")?;
    let store = crate::connect_pg(config, database_url).await?;

    execute(command, &store).await
}

async fn execute(command: Command, store: &dyn StatusStore) -> anyhow::Result<()> {
    match command {
        Command::Serve => Ok(()),
        Command::User(UserCommand::Add { username }) => {
            let user = store.create_user(&username).await?;
            println!("Created user {} ({})", user.username, user.id);
            Ok(())
        }
        Command::Service(command) => execute_service(command, store).await,
        Command::Update(UpdateCommand::Post {
            service_id,
            status,
            problem,
            plan,
            comments,
            acting_user,
            at,
        }) => {
            let update = ingestion::record_admin_update(
                store,
                AdminUpdate {
                    service_id,
                    status,
                    problem,
                    plan,
                    comments,
                    acting_user,
                    created_at: at,
                },
            )
            .await?;
            println!(
                "Recorded update {} for {}: {}",
                update.id,
                update.service_name,
                update.status.display_name()
            );
            Ok(())
        }
        Command::Key(command) => execute_key(command, store).await,
    }
}

async fn execute_service(command: ServiceCommand, store: &dyn StatusStore) -> anyhow::Result<()> {
    match command {
        ServiceCommand::Add {
            name,
            description,
            order,
            inactive,
        } => {
            let service = store
                .create_service(&NewService {
                    name,
                    description,
                    order,
                    is_active: !inactive,
                })
                .await?;
            println!("Created service {} ({})", service.name, service.id);
        }
        ServiceCommand::Edit {
            id,
            name,
            description,
            order,
            active,
        } => {
            let changes = ServiceChanges {
                name,
                description,
                order,
                is_active: active,
            };
            let service = store.update_service(id, &changes).await?;
            println!(
                "Updated service {} ({}), active: {}",
                service.name, service.id, service.is_active
            );
        }
        ServiceCommand::List { all } => {
            for service in store.list_services(!all).await? {
                let current = resolver::current_status(store, service.id).await?;
                let status = current
                    .map(|update| {
                        format!("{} {}", update.status.badge_hex(), update.status.display_name())
                    })
                    .unwrap_or_else(|| "No status".to_string());
                let hidden = if service.is_active { "" } else { " [inactive]" };
                println!(
                    "{:>5}  {:<30} {:>4}  {}{}",
                    service.id, service.name, service.order, status, hidden
                );
            }
        }
        ServiceCommand::Delete { id } => {
            if !store.delete_service(id).await? {
                return Err(AppError::ServiceNotFound.into());
            }
            println!("Deleted service {id} and its status history");
        }
    }

    Ok(())
}

async fn execute_key(command: KeyCommand, store: &dyn StatusStore) -> anyhow::Result<()> {
    match command {
        KeyCommand::Create { name, created_by } => {
            let issued = auth_service::issue_api_key(store, &name, created_by.as_deref()).await?;
            println!("Created API key {} ({})", issued.record, issued.record.id);
            println!("{}", issued.key);
            println!("Store this key now; it cannot be shown again.");
        }
        KeyCommand::List => {
            for key in store.list_api_keys().await? {
                let last_used = key
                    .last_used_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                let label = key.to_string();
                println!(
                    "{:>5}  {}...  {:<30} last used: {}",
                    key.id, key.key_prefix, label, last_used
                );
            }
        }
        KeyCommand::Revoke { id } => {
            let key = store.deactivate_api_key(id).await?;
            println!("Revoked {}", key);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn parses_update_post() {
        let cli = Cli::try_parse_from([
            "status_dashboard",
            "update",
            "post",
            "3",
            "down",
            "--problem",
            "Database unreachable",
            "--as",
            "alice",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Update(UpdateCommand::Post {
                service_id,
                status,
                acting_user,
                ..
            })) => {
                assert_eq!(service_id, 3);
                assert_eq!(status, ServiceStatus::Down);
                assert_eq!(acting_user.as_deref(), Some("alice"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(Cli::try_parse_from(["status_dashboard", "update", "post", "3", "bogus"]).is_err());
    }

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["status_dashboard"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_explicit_active_flag() {
        let cli =
            Cli::try_parse_from(["status_dashboard", "service", "edit", "2", "--active", "false"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Service(ServiceCommand::Edit { id: 2, active: Some(false), .. }))
        ));
    }

    #[tokio::test]
    async fn deleting_unknown_service_fails() {
        let store = MemoryStore::new();
        let result = execute(Command::Service(ServiceCommand::Delete { id: 42 }), &store).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn soft_disable_through_edit() {
        let store = MemoryStore::new();
        let service = store.create_service(&NewService::named("API")).await.unwrap();

        execute(
            Command::Service(ServiceCommand::Edit {
                id: service.id,
                name: None,
                description: None,
                order: None,
                active: Some(false),
            }),
            &store,
        )
        .await
        .unwrap();

        let stored = store.get_service(service.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
    }
}
