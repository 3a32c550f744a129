use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use common::dates::TimeSource;
use common::utils::logging::{self, LogTarget};
use configs::AppConfig;
use serde_json::{json, Value};
use service::cat::domain::{parse_sort_params, CatFilter, CatID, Page, PartialUpdateCat, UnsavedCat};
use service::cat::repo::seaorm::SeaOrmCatRepository;
use service::cat::{CatRepository, CatService};
use service::errors::ServiceError;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "cats", about = "Manage cat records")]
struct Cli {
    /// Path to a config.toml; defaults to CONFIG_PATH, then ./config.toml if present
    #[arg(long, global = true)]
    config: Option<String>,

    /// Emit JSON logs regardless of the configured format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a cat
    Create { name: String },
    /// Show the first cat matching the filter
    Get {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// List cats
    List {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Sort keys in priority order, e.g. `name:asc,ctime:desc`
        #[arg(long, default_value = "")]
        sort: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    /// Delete a cat by id
    Delete { id: String },
    /// Set the image URL of a cat
    SetUrl { id: String, url: String },
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run one subcommand against the service and return what should be printed.
async fn execute<R, C>(svc: &CatService<R, C>, command: Command) -> anyhow::Result<Value>
where
    R: CatRepository,
    C: TimeSource,
{
    let output = match command {
        Command::Create { name } => {
            serde_json::to_value(svc.create_cat(UnsavedCat::new(name)).await?)?
        }
        Command::Get { id, name } => {
            let filter = CatFilter { cat_id: id.map(CatID::from), name };
            let cat = svc.find_one(filter).await?.ok_or_else(|| ServiceError::not_found("cat"))?;
            serde_json::to_value(cat)?
        }
        Command::List { id, name, sort, page, per_page } => {
            let filter = CatFilter { cat_id: id.map(CatID::from), name };
            let sort = parse_sort_params(&sort)?;
            serde_json::to_value(svc.find_many(filter, sort, Page::new(page, per_page)).await?)?
        }
        Command::Delete { id } => {
            let cat_id = CatID::from(id);
            svc.delete_one(cat_id.clone()).await?;
            json!({ "deleted": cat_id })
        }
        Command::SetUrl { id, url } => {
            let upd = PartialUpdateCat::url(url);
            serde_json::to_value(svc.update_cat_metadata(CatID::from(id), upd).await?)?
        }
    };
    Ok(output)
}

async fn run(cfg: AppConfig, command: Command) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::create_schema(&db).await?;
    let svc = CatService::with_system_clock(Arc::new(SeaOrmCatRepository::new(db)));
    print_json(&execute(&svc, command).await?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match AppConfig::load_and_validate(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("invalid configuration: {e:#}");
            return ExitCode::from(2);
        }
    };

    // stdout carries the JSON results
    if cli.json_logs {
        logging::init_logging_json(LogTarget::Stderr);
    } else {
        logging::init_logging(&cfg.logging, LogTarget::Stderr);
    }
    info!(
        service = "cats",
        event = "start",
        version = env!("CARGO_PKG_VERSION"),
        "cats cli starting"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(
                service = "cats",
                event = "runtime_build_failed",
                error = %e,
                "failed to build tokio runtime"
            );
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cfg, cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.downcast_ref::<ServiceError>().map(ServiceError::code);
            error!(service = "cats", event = "command_failed", error = %e, code, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::cat::repository::mock::MockCatRepository;

    fn svc() -> CatService<MockCatRepository> {
        CatService::with_system_clock(Arc::new(MockCatRepository::default()))
    }

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("cats").chain(args.iter().copied())).unwrap().command
    }

    async fn exec(svc: &CatService<MockCatRepository>, args: &[&str]) -> anyhow::Result<Value> {
        execute(svc, parse(args)).await
    }

    fn service_code(err: &anyhow::Error) -> Option<u16> {
        err.downcast_ref::<ServiceError>().map(ServiceError::code)
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let args = ["cats", "list", "--json-logs", "--config", "cats.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.json_logs);
        assert_eq!(cli.config.as_deref(), Some("cats.toml"));
        assert!(Cli::try_parse_from(["cats", "set-url", "only-id"]).is_err());
    }

    #[tokio::test]
    async fn create_prints_the_stored_cat() {
        let svc = svc();
        let out = exec(&svc, &["create", "Tom"]).await.unwrap();
        assert_eq!(out["name"], "Tom");
        assert_eq!(out["id"].as_str().unwrap().len(), 24);
        assert_eq!(out["ctime"], out["mtime"]);
        assert!(out.get("url").is_none());
    }

    #[tokio::test]
    async fn get_without_match_is_not_found() {
        let svc = svc();
        exec(&svc, &["create", "Tom"]).await.unwrap();

        let err = exec(&svc, &["get", "--name", "Nobody"]).await.unwrap_err();
        assert_eq!(service_code(&err), Some(1003));

        let out = exec(&svc, &["get", "--name", "Tom"]).await.unwrap();
        assert_eq!(out["name"], "Tom");
    }

    #[tokio::test]
    async fn list_rejects_unknown_sort_key() {
        let err = exec(&svc(), &["list", "--sort", "colour:up"]).await.unwrap_err();
        assert_eq!(service_code(&err), Some(1001));
    }

    #[tokio::test]
    async fn list_sorts_and_pages() {
        let svc = svc();
        for name in ["Tom", "Felix", "Garfield"] {
            exec(&svc, &["create", name]).await.unwrap();
        }
        let args = ["list", "--sort", "name:desc", "--page", "2", "--per-page", "2"];
        let out = exec(&svc, &args).await.unwrap();
        let names: Vec<_> = out.as_array().unwrap().iter().map(|c| c["name"].clone()).collect();
        assert_eq!(names, [json!("Felix")]);
    }

    #[tokio::test]
    async fn set_url_and_delete_output_shapes() {
        let svc = svc();
        let created = exec(&svc, &["create", "Tom"]).await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let url = "http://placekitten.com/200/300";
        let updated = exec(&svc, &["set-url", id.as_str(), url]).await.unwrap();
        assert_eq!(updated, json!({ "count": 1 }));
        let missing = exec(&svc, &["set-url", "ffffffffffffffffffffffff", "x"]).await.unwrap();
        assert_eq!(missing, json!({ "count": 0 }));

        let deleted = exec(&svc, &["delete", id.as_str()]).await.unwrap();
        assert_eq!(deleted, json!({ "deleted": &id }));
        let gone = exec(&svc, &["get", "--id", id.as_str()]).await.unwrap_err();
        assert_eq!(service_code(&gone), Some(1003));
    }
}
