//! Tradeboard CLI: render the dashboard for a user from a data folder.
//!
//! Commands:
//! - `render`: assemble the page for a user and print it as HTML
//! - `view`: print the view model built for a user and day
//! - `project`: project one view-model file into an empty page
//! - `fingerprint`: print the fingerprint of the assembled page

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tradeboard_core::{
    ComponentModel, DashboardConfig, DayId, DayStore, DirSource, FieldLabels, HttpSource,
    JsonSource, User, UserRegistry,
};
use tradeboard_render::{Page, PageOutcome, RenderContext, TemplateRegistry};

#[derive(Parser)]
#[command(name = "tradeboard", about = "Tradeboard CLI: trading dashboard renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the dashboard page and print it as HTML.
    Render(DataArgs),
    /// Print the view model for a user and day as JSON.
    View(DataArgs),
    /// Project a single view-model file into an empty page.
    Project {
        /// Component to instantiate (e.g., market-status).
        #[arg(long)]
        component: String,

        /// JSON file holding the component's view model.
        #[arg(long)]
        model: PathBuf,

        /// JSON file holding field labels for the component.
        #[arg(long)]
        labels: Option<PathBuf>,

        /// JSON template library replacing built-in templates.
        #[arg(long)]
        templates: Option<PathBuf>,
    },
    /// Print the fingerprint of the assembled page.
    Fingerprint(DataArgs),
}

#[derive(Args)]
struct DataArgs {
    /// Data folder or web root (http/https). Overrides the config file.
    #[arg(long)]
    data: Option<String>,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Registered user id.
    #[arg(long)]
    user: Option<String>,

    /// Trading day id. Defaults to the latest day in the index.
    #[arg(long)]
    day: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => {
            let page = run_assemble(&args)?;
            println!("{}", page.to_html());
            Ok(())
        }
        Commands::View(args) => run_view(&args),
        Commands::Project {
            component,
            model,
            labels,
            templates,
        } => run_project(&component, &model, labels.as_deref(), templates.as_deref()),
        Commands::Fingerprint(args) => {
            let page = run_assemble(&args)?;
            println!("{}", page.fingerprint());
            Ok(())
        }
    }
}

/// Config, data source, users and loaded days for one invocation.
struct Session {
    config: DashboardConfig,
    users: UserRegistry,
    store: Option<DayStore>,
}

impl Session {
    fn open(args: &DataArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        let source = open_source(args.data.as_deref(), &config)?;

        let users = match source.fetch_json(&config.paths.users, config.cache.bust_users) {
            Ok(doc) => UserRegistry::from_value(doc).context("invalid user registry")?,
            Err(e) => {
                log::warn!("user registry unavailable: {e}");
                UserRegistry::default()
            }
        };

        let mut store = DayStore::try_build(source.as_ref(), &config);
        if let (Some(store), Some(user)) = (store.as_mut(), users.current_user(args.user.as_deref())) {
            let loaded = store.load_history(source.as_ref(), user, config.load_history);
            if loaded > 0 {
                log::info!("loaded {loaded} historical day(s)");
            }
        }

        Ok(Self {
            config,
            users,
            store,
        })
    }

    fn user(&self, args: &DataArgs) -> Option<&User> {
        self.users.current_user(args.user.as_deref())
    }

    fn day(&self, args: &DataArgs) -> Option<DayId> {
        match &args.day {
            Some(day) => Some(DayId::new(day.as_str())),
            None => self.store.as_ref().and_then(DayStore::today).cloned(),
        }
    }

    fn render_context(&self) -> Result<RenderContext> {
        load_context(self.config.templates.as_deref())
    }
}

fn open_source(data: Option<&str>, config: &DashboardConfig) -> Result<Box<dyn JsonSource>> {
    let location = match (data, &config.url_root, &config.data_dir) {
        (Some(data), _, _) => data.to_string(),
        (None, Some(url), _) => url.clone(),
        (None, None, Some(dir)) => dir.display().to_string(),
        (None, None, None) => bail!("no data location: pass --data or set url_root/data_dir in the config"),
    };

    if location.starts_with("http://") || location.starts_with("https://") {
        let mut root = location;
        if !root.ends_with('/') {
            root.push('/');
        }
        Ok(Box::new(HttpSource::new(root)?))
    } else {
        Ok(Box::new(DirSource::new(location)))
    }
}

fn load_context(templates: Option<&Path>) -> Result<RenderContext> {
    match templates {
        Some(path) => Ok(RenderContext::dashboard_with(TemplateRegistry::from_file(path)?)),
        None => Ok(RenderContext::dashboard()),
    }
}

fn run_assemble(args: &DataArgs) -> Result<Page> {
    let session = Session::open(args)?;
    let ctx = session.render_context()?;
    let day = session.day(args);

    let mut page = Page::new();
    let outcome = page.assemble_day(&ctx, session.user(args), session.store.as_ref(), day.as_ref())?;

    match &outcome {
        PageOutcome::Unauthorised => log::warn!("user not registered, rendered sign-in notice only"),
        PageOutcome::Pending => log::warn!("no trading data available yet"),
        PageOutcome::Rendered { day, instances } => {
            log::info!("rendered {instances} component instances for day {day}")
        }
    }
    Ok(page)
}

fn run_view(args: &DataArgs) -> Result<()> {
    let session = Session::open(args)?;
    let Some(user) = session.user(args) else {
        bail!("unknown user; pass --user with a registered id");
    };
    let Some(store) = session.store.as_ref() else {
        bail!("no trading data available");
    };
    let Some(day) = session.day(args) else {
        bail!("day index is empty");
    };

    let view = store.view(&day, user)?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn run_project(
    component: &str,
    model_path: &Path,
    labels_path: Option<&Path>,
    templates: Option<&Path>,
) -> Result<()> {
    let model: ComponentModel = read_json(model_path)?;
    let labels: Option<FieldLabels> = labels_path.map(read_json::<FieldLabels>).transpose()?;

    let mut ctx = load_context(templates)?;
    if !ctx.components.contains(component) {
        ctx.register_component(component)?;
    }

    let mut page = Page::new();
    let main = page.main;
    ctx.project(&mut page.document, component, main, &model, labels.as_ref())?;
    println!("{}", page.to_html());
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}
