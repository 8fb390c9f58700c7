use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use preparedness::config::{ClientConfig, ConfigError};
use preparedness::net::api::{ApiClient, ApiError, HouseholdLookup};
use preparedness::net::types::{CreateHouseholdRequest, RegisterRequest};
use preparedness::router::guard::Decision;
use preparedness::router::{Navigation, NavigationError, Router};
use preparedness::state::session::{SessionError, SessionStore};
use preparedness::storage::FileStorage;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not logged in; run `preparedness login` first")]
    NotLoggedIn,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "preparedness", about = "Crisis-preparedness client: session, household and route checks")]
struct Cli {
    /// Overrides `PREP_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `PREP_SESSION_FILE`.
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PREP_PASSWORD")]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PREP_PASSWORD")]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    Logout,
    Whoami,
    /// List routes and their access requirements.
    Routes,
    /// Run the navigation guard for a path.
    Navigate {
        path: String,
        /// Route the navigation starts from.
        #[arg(long)]
        from: Option<String>,
    },
    Household(HouseholdCommand),
}

#[derive(Args, Debug)]
struct HouseholdCommand {
    #[command(subcommand)]
    command: HouseholdSubcommand,
}

#[derive(Subcommand, Debug)]
enum HouseholdSubcommand {
    Show,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        population: Option<u32>,
    },
    Leave,
}

struct CliContext {
    api: ApiClient,
    router: Router<FileStorage>,
}

impl CliContext {
    fn authorized_api(&self) -> Result<ApiClient, CliError> {
        let token = self.router.session().token().ok_or(CliError::NotLoggedIn)?;
        Ok(self.api.with_bearer(token))
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url.trim_end_matches('/').to_owned();
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = session_file;
    }

    let api = ApiClient::from_config(&config)?;
    let lookup: Arc<dyn HouseholdLookup> = Arc::new(api.clone());
    let session = SessionStore::new(FileStorage::new(config.session_file.clone()));
    let mut router = Router::from_config(&config, session, lookup);
    router.start();
    let mut ctx = CliContext { api, router };

    match cli.command {
        Command::Login { email, password } => {
            let token = ctx.api.login(&email, &password).await?;
            finish_login(&mut ctx, &token)
        }
        Command::Register { email, password, first_name, last_name } => {
            let request = RegisterRequest { email, password, first_name, last_name };
            let token = ctx.api.register(&request).await?;
            finish_login(&mut ctx, &token)
        }
        Command::Logout => {
            ctx.router.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(&ctx),
        Command::Routes => {
            run_routes(&ctx);
            Ok(())
        }
        Command::Navigate { path, from } => run_navigate(&mut ctx, &path, from.as_deref()).await,
        Command::Household(household) => run_household(&mut ctx, household).await,
    }
}

fn finish_login(ctx: &mut CliContext, token: &str) -> Result<(), CliError> {
    ctx.router.login(token)?;
    let session = ctx.router.session();
    println!(
        "logged in as {} (user {})",
        session.role().map_or("unknown", |r| r.as_str()),
        session.user_id().unwrap_or("-")
    );
    Ok(())
}

fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let session = ctx.router.session();
    if !session.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    println!("role:    {}", session.role().map_or("-", |r| r.as_str()));
    println!("user id: {}", session.user_id().unwrap_or("-"));
    println!("admin:   {}", session.is_admin_user());
    println!("super:   {}", session.is_super_admin_user());
    Ok(())
}

fn run_routes(ctx: &CliContext) {
    for route in ctx.router.table().routes() {
        let access = if route.name.is_public() {
            "public".to_owned()
        } else {
            route.meta.required_role().map_or_else(|| "session".to_owned(), |r| r.to_string())
        };
        println!("{:<36} {:<24} {access}", route.pattern, route.name.as_str());
    }
}

async fn run_navigate(ctx: &mut CliContext, path: &str, from: Option<&str>) -> Result<(), CliError> {
    if let Some(from) = from {
        let nav = ctx.router.push(from).await?;
        println!("start:");
        print_navigation(&nav);
    }
    let nav = ctx.router.push(path).await?;
    print_navigation(&nav);
    Ok(())
}

fn print_navigation(nav: &Navigation) {
    for step in &nav.steps {
        let decision = match step.verdict.decision {
            Decision::Allow => "allow".to_owned(),
            Decision::Block => "block".to_owned(),
            Decision::Redirect(name) => format!("redirect -> {name}"),
        };
        println!("  {:<28} {:?} => {decision}", step.route.path, step.verdict.state);
    }
    let landed = nav.landed.as_ref().map_or("(nowhere)", |r| r.path.as_str());
    println!("{:?}: {} -> {landed}", nav.outcome, nav.requested.path);
}

async fn run_household(ctx: &mut CliContext, household: HouseholdCommand) -> Result<(), CliError> {
    match household.command {
        HouseholdSubcommand::Show => {
            if ctx.router.session().token().is_none() {
                return Err(CliError::NotLoggedIn);
            }
            match ctx.router.refresh_household().await? {
                Some(household) => println!("{}", serde_json::to_string_pretty(&household)?),
                None => println!("no household"),
            }
            Ok(())
        }
        HouseholdSubcommand::Create { name, address, population } => {
            let request = CreateHouseholdRequest { name, address, population_count: population };
            let created = ctx.authorized_api()?.create_household(&request).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
            Ok(())
        }
        HouseholdSubcommand::Leave => {
            ctx.authorized_api()?.leave_household().await?;
            ctx.router.refresh_household().await?;
            println!("left household");
            Ok(())
        }
    }
}
