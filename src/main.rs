use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use branchdesk::config::{self, DeskConfig};
use branchdesk::db::models::{NewComment, NewEvent, NewPost, NewTask, NewTransfer, NewUser};
use branchdesk::db::Database;
use branchdesk::error::DeskError;
use branchdesk::filter::{self, Column, FilterRequest, Period};
use branchdesk::output::{json as json_out, table};
use branchdesk::tasks::TaskFilter;

#[derive(Parser)]
#[command(name = "branchdesk", version, about = "Branch dashboard: sales reports, kanban tasks, transfers and events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to database file (default: ~/.branchdesk/branchdesk.db)
    #[arg(long, global = true, env = "BRANCHDESK_DB")]
    db: Option<PathBuf>,

    /// Path to config file (default: ~/.branchdesk/config.toml)
    #[arg(long, global = true, env = "BRANCHDESK_CONFIG")]
    config: Option<PathBuf>,
}

/// Time window flags shared by filtered commands.
#[derive(Args, Debug, Clone, Default)]
struct PeriodArgs {
    /// Period: today, week (Monday-Sunday), month, year, custom, none
    #[arg(long)]
    period: Option<String>,

    /// Start of a custom range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    from: Option<String>,

    /// End of a custom range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    to: Option<String>,
}

impl PeriodArgs {
    /// Build the filter request. Without --period, explicit dates imply a
    /// custom range and otherwise `default` applies.
    fn request(&self, default: Period) -> Result<FilterRequest, DeskError> {
        let mut request =
            FilterRequest::from_params(self.period.as_deref(), self.from.as_deref(), self.to.as_deref(), None)?;
        if self.period.is_none() {
            request.period = if request.start.is_some() || request.end.is_some() {
                Period::Custom
            } else {
                default
            };
        }
        Ok(request)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sales and lead reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// Kanban tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Inter-branch inventory transfers
    #[command(subcommand)]
    Transfer(TransferCommand),

    /// Calendar events
    #[command(subcommand)]
    Event(EventCommand),

    /// Company feed posts
    #[command(subcommand)]
    Post(PostCommand),

    /// Stories visible for 24 hours
    #[command(subcommand)]
    Story(StoryCommand),

    /// Leave a feedback comment
    Comment {
        #[arg(long)]
        full_name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,
    },

    /// Manual invoice lookup
    Invoices {
        /// Branch ID
        #[arg(long)]
        branch: Option<i64>,

        /// Filter by client name (partial match)
        #[arg(long)]
        client: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Staff accounts
    #[command(subcommand)]
    User(UserCommand),

    /// Show the WHERE condition a filter produces
    Condition {
        #[command(flatten)]
        period: PeriodArgs,

        /// Temporal column to filter on (default: created_at)
        #[arg(long)]
        column: Option<String>,

        /// Exact match, as column=value (repeatable)
        #[arg(long, value_parser = parse_pair)]
        exact: Vec<(String, String)>,

        /// Substring match, as column=value (repeatable)
        #[arg(long, value_parser = parse_pair)]
        contains: Vec<(String, String)>,
    },

    /// Show row counts per table
    Stats,

    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Corporate sales totals by type
    Sales {
        #[arg(long)]
        branch: Option<i64>,
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Branch sales totals by category
    BranchSales {
        #[arg(long)]
        branch: Option<i64>,
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Leads sent per branch
    Leads {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Daily sales for the last few days
    Trend {
        #[arg(long)]
        branch: Option<i64>,

        /// Window in days (default from config)
        #[arg(long)]
        days: Option<u32>,
    },

    /// This month's sales against target
    Target {
        #[arg(long)]
        branch: Option<i64>,
    },

    /// Set this month's sales target
    SetTarget {
        #[arg(long)]
        branch: Option<i64>,

        #[arg(long)]
        amount: f64,
    },
}

#[derive(Args, Debug, Clone)]
struct TaskArgs {
    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Board column, e.g. todo, doing, done
    #[arg(long)]
    status: String,

    /// Owning branch name
    #[arg(long)]
    owner: String,

    /// Branch ID
    #[arg(long)]
    branch: Option<i64>,

    #[arg(long)]
    start_date: Option<String>,

    #[arg(long)]
    due_date: Option<String>,

    #[arg(long)]
    label: Option<String>,

    #[arg(long)]
    color: Option<String>,
}

impl TaskArgs {
    fn into_task(self, branch_id: i64) -> NewTask {
        NewTask {
            title: self.title,
            description: self.description,
            status: self.status,
            owner: self.owner,
            start_date: self.start_date,
            due_date: self.due_date,
            label: self.label,
            color: self.color,
            branch_id: Some(branch_id),
        }
    }
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Create a task
    Add(TaskArgs),

    /// List an owner's tasks
    List {
        /// Owning branch name
        #[arg(long)]
        owner: Option<String>,
    },

    /// Filter an owner's tasks
    Filter {
        #[arg(long)]
        owner: Option<String>,

        /// Title contains
        #[arg(long)]
        title: Option<String>,

        /// Description contains
        #[arg(long)]
        description: Option<String>,

        /// Label contains
        #[arg(long)]
        label: Option<String>,

        /// Exact status
        #[arg(long)]
        status: Option<String>,

        /// Exact start date
        #[arg(long)]
        start_date: Option<String>,

        /// Exact due date
        #[arg(long)]
        due_date: Option<String>,

        // period over created_at
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Show one task
    Show { id: i64 },

    /// Replace a task's fields
    Update {
        id: i64,
        #[command(flatten)]
        task: TaskArgs,
    },

    /// Delete a task
    Delete { id: i64 },

    /// List known branches
    Branches,
}

#[derive(Args, Debug, Clone)]
struct TransferArgs {
    #[arg(long)]
    item_code: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value = "1")]
    quantity: i64,

    #[arg(long = "from-location")]
    from_location: String,

    #[arg(long = "to-location")]
    to_location: String,

    #[arg(long, default_value = "0")]
    cost: f64,

    #[arg(long, default_value = "pending")]
    status: String,

    #[arg(long, default_value = "")]
    notes: String,
}

impl From<TransferArgs> for NewTransfer {
    fn from(a: TransferArgs) -> Self {
        NewTransfer {
            item_code: a.item_code,
            description: a.description,
            quantity: a.quantity,
            from_location: a.from_location,
            to_location: a.to_location,
            cost: a.cost,
            status: a.status,
            notes: a.notes,
        }
    }
}

#[derive(Subcommand)]
enum TransferCommand {
    /// List transfers
    List {
        /// Exact status
        #[arg(long)]
        status: Option<String>,

        // period over creation_date
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Request a transfer
    Add(TransferArgs),

    /// Replace a transfer's fields
    Update {
        id: i64,
        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Delete a transfer
    Delete { id: i64 },

    /// Branches a transfer can go to
    Branches {
        /// Branch name to leave out (usually your own)
        #[arg(long)]
        exclude: Option<String>,
    },
}

#[derive(Subcommand)]
enum EventCommand {
    /// List events
    List {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Add an event (editor role only)
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Start (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        start: String,

        #[arg(long)]
        end: Option<String>,

        /// Role of the person adding the event
        #[arg(long, env = "BRANCHDESK_ROLE")]
        role: String,
    },

    /// Move an event to a new start
    Move {
        id: i64,

        #[arg(long)]
        start: String,
    },
}

#[derive(Subcommand)]
enum PostCommand {
    /// Publish a post (editor role only)
    Add {
        /// Display name of the author
        #[arg(long)]
        username: String,

        #[arg(long)]
        text: String,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        #[arg(long, env = "BRANCHDESK_ROLE")]
        role: String,
    },

    /// List posts, newest first
    List,

    /// Like a post
    Like { id: i64 },

    /// Replace a post's text and image (editor role only)
    Edit {
        id: i64,

        #[arg(long)]
        text: String,

        #[arg(long)]
        image: Option<String>,

        #[arg(long, env = "BRANCHDESK_ROLE")]
        role: String,
    },

    /// Delete a post (editor role only)
    Delete {
        id: i64,

        #[arg(long, env = "BRANCHDESK_ROLE")]
        role: String,
    },
}

#[derive(Subcommand)]
enum StoryCommand {
    /// Add a story (editor role only)
    Add {
        /// Image URL
        #[arg(long)]
        image: String,

        #[arg(long, env = "BRANCHDESK_ROLE")]
        role: String,
    },

    /// List stories from the last 24 hours
    List,

    /// Delete expired stories
    Cleanup,
}

#[derive(Subcommand)]
enum UserCommand {
    /// Add a staff account
    Add {
        /// Branch name
        #[arg(long)]
        branch: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        role: String,

        #[arg(long)]
        branch_id: i64,
    },

    /// List staff accounts
    List,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a commented config template if none exists
    Init,
    /// Show the effective config
    Show,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{s}'"))?;
    Ok((k.trim().to_string(), v.to_string()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;
    let config_path = cli.config.as_deref();

    if let Commands::Config(cmd) = &cli.command {
        return match cmd {
            ConfigCommand::Init => {
                if config::init_config(config_path)? {
                    println!("Created config template");
                } else {
                    println!("Config already exists");
                }
                Ok(())
            }
            ConfigCommand::Show => {
                let cfg = DeskConfig::load(config_path)?;
                print!("{}", cfg.display()?);
                Ok(())
            }
        };
    }

    let cfg = DeskConfig::load(config_path)?;
    let db_path = match cli.db {
        Some(p) => p,
        None => Database::default_db_path()?,
    };
    let db = Database::open(&db_path)?;

    match cli.command {
        Commands::Report(cmd) => run_report(&db, &cfg, cmd, json_output)?,
        Commands::Task(cmd) => run_task(&db, &cfg, cmd, json_output)?,
        Commands::Transfer(cmd) => run_transfer(&db, cmd, json_output)?,
        Commands::Event(cmd) => run_event(&db, &cfg, cmd, json_output)?,
        Commands::Post(cmd) => run_post(&db, &cfg, cmd, json_output)?,
        Commands::Story(cmd) => run_story(&db, &cfg, cmd, json_output)?,

        Commands::Comment {
            full_name,
            email,
            message,
        } => {
            let comment = db.submit_comment(&NewComment {
                full_name,
                email,
                message,
            })?;
            if json_output {
                json_out::print_created("comment", comment.id)?;
            } else {
                println!("Thanks, {}. Your comment was recorded.", comment.full_name);
            }
        }

        Commands::Invoices {
            branch,
            client,
            period,
        } => {
            let branch = cfg.scope.branch(branch)?;
            let request = period.request(Period::None)?;
            let invoices = db.manual_invoices(branch, client.as_deref(), &request)?;
            if json_output {
                json_out::print_json(&invoices)?;
            } else {
                table::print_invoices(&invoices);
            }
        }

        Commands::User(UserCommand::Add {
            branch,
            email,
            role,
            branch_id,
        }) => {
            let user = db.add_user(&NewUser {
                branch,
                email,
                role,
                branch_id,
            })?;
            if json_output {
                json_out::print_json(&user)?;
            } else {
                println!("Added user {} ({})", user.email, user.id);
            }
        }

        Commands::User(UserCommand::List) => {
            let users = db.list_users()?;
            if json_output {
                json_out::print_json(&users)?;
            } else {
                table::print_users(&users);
            }
        }

        Commands::Condition {
            period,
            column,
            exact,
            contains,
        } => {
            let mut request = period.request(Period::None)?;
            if let Some(column) = column.as_deref() {
                request = request.on(Column::new(column).map_err(DeskError::from)?);
            }
            for (col, value) in exact {
                request = request.exact(Column::new(&col).map_err(DeskError::from)?, Some(value));
            }
            for (col, value) in contains {
                request = request.contains(Column::new(&col).map_err(DeskError::from)?, Some(value));
            }
            let cond = filter::build(&request, db.today());
            if json_output {
                json_out::print_json(&cond)?;
            } else {
                table::print_condition(&cond);
            }
        }

        Commands::Stats => {
            let stats = db.stats()?;
            if json_output {
                json_out::print_json(&stats)?;
            } else {
                table::print_stats(&stats);
            }
        }

        Commands::Config(_) => {}
    }

    Ok(())
}

fn run_report(db: &Database, cfg: &DeskConfig, cmd: ReportCommand, json_output: bool) -> Result<()> {
    let default_period = cfg.reports.default_period();

    match cmd {
        ReportCommand::Sales { branch, period } => {
            let branch = cfg.scope.branch(branch)?;
            let totals = db.corporate_sales(branch, &period.request(default_period)?)?;
            if json_output {
                json_out::print_json(&totals)?;
            } else {
                table::print_totals("type", &totals);
            }
        }

        ReportCommand::BranchSales { branch, period } => {
            let branch = cfg.scope.branch(branch)?;
            let totals = db.branch_sales(branch, &period.request(default_period)?)?;
            if json_output {
                json_out::print_json(&totals)?;
            } else {
                table::print_totals("category", &totals);
            }
        }

        ReportCommand::Leads { period } => {
            let leads = db.leads_by_branch(&period.request(default_period)?)?;
            if json_output {
                json_out::print_json(&leads)?;
            } else {
                table::print_leads(&leads);
            }
        }

        ReportCommand::Trend { branch, days } => {
            let branch = cfg.scope.concrete_branch(branch)?;
            let trend = db.sales_trend(branch, days.unwrap_or(cfg.reports.trend_days))?;
            if json_output {
                json_out::print_json(&trend)?;
            } else {
                table::print_trend(&trend);
            }
        }

        ReportCommand::Target { branch } => {
            let branch = cfg.scope.concrete_branch(branch)?;
            let progress = db.target_progress(branch, cfg.reports.default_sales_target)?;
            if json_output {
                json_out::print_json(&progress)?;
            } else {
                table::print_target(&progress);
            }
        }

        ReportCommand::SetTarget { branch, amount } => {
            let branch = cfg.scope.concrete_branch(branch)?;
            db.set_sales_target(branch, amount)?;
            println!("Monthly target for branch {branch} set to {amount:.2}");
        }
    }

    Ok(())
}

fn run_task(db: &Database, cfg: &DeskConfig, cmd: TaskCommand, json_output: bool) -> Result<()> {
    match cmd {
        TaskCommand::Add(args) => {
            let branch = cfg.scope.concrete_branch(args.branch)?;
            let task = db.create_task(&args.into_task(branch))?;
            if json_output {
                json_out::print_json(&task)?;
            } else {
                println!("Created task {}: {}", task.id, task.title);
            }
        }

        TaskCommand::List { owner } => {
            let owner = cfg.scope.owner(owner.as_deref())?;
            let tasks = db.list_tasks(owner.as_deref())?;
            if json_output {
                json_out::print_json(&tasks)?;
            } else {
                table::print_tasks(&tasks);
            }
        }

        TaskCommand::Filter {
            owner,
            title,
            description,
            label,
            status,
            start_date,
            due_date,
            period,
        } => {
            let owner = cfg.scope.owner(owner.as_deref())?;
            let fields = TaskFilter {
                title,
                description,
                label,
                status,
                start_date,
                due_date,
            };
            let request = fields.apply(period.request(Period::None)?);
            let tasks = db.filter_tasks(owner.as_deref(), &request)?;
            if json_output {
                json_out::print_json(&tasks)?;
            } else {
                table::print_tasks(&tasks);
            }
        }

        TaskCommand::Show { id } => {
            let task = db
                .get_task(id)?
                .ok_or(DeskError::NotFound { kind: "task", id })?;
            if json_output {
                json_out::print_json(&task)?;
            } else {
                table::print_task_detail(&task);
            }
        }

        TaskCommand::Update { id, task } => {
            let branch = cfg.scope.concrete_branch(task.branch)?;
            let updated = db
                .update_task(id, &task.into_task(branch))?
                .ok_or(DeskError::NotFound { kind: "task", id })?;
            if json_output {
                json_out::print_json(&updated)?;
            } else {
                println!("Updated task {}: {}", updated.id, updated.title);
            }
        }

        TaskCommand::Delete { id } => {
            if !db.delete_task(id)? {
                return Err(DeskError::NotFound { kind: "task", id }.into());
            }
            println!("Task deleted");
        }

        TaskCommand::Branches => {
            let branches = db.task_branches()?;
            if json_output {
                json_out::print_json(&branches)?;
            } else {
                table::print_branches(&branches);
            }
        }
    }

    Ok(())
}

fn run_transfer(db: &Database, cmd: TransferCommand, json_output: bool) -> Result<()> {
    match cmd {
        TransferCommand::List { status, period } => {
            let transfers = db.list_transfers(status.as_deref(), &period.request(Period::None)?)?;
            if json_output {
                json_out::print_json(&transfers)?;
            } else {
                table::print_transfers(&transfers);
            }
        }

        TransferCommand::Add(args) => {
            let id = db.create_transfer(&args.into())?;
            if json_output {
                json_out::print_created("transfer", id)?;
            } else {
                println!("Created transfer {id}");
            }
        }

        TransferCommand::Update { id, transfer } => {
            if !db.update_transfer(id, &transfer.into())? {
                return Err(DeskError::NotFound { kind: "transfer", id }.into());
            }
            println!("Updated transfer {id}");
        }

        TransferCommand::Delete { id } => {
            if !db.delete_transfer(id)? {
                return Err(DeskError::NotFound { kind: "transfer", id }.into());
            }
            println!("Deleted transfer {id}");
        }

        TransferCommand::Branches { exclude } => {
            let branches = db.transfer_branches(exclude.as_deref())?;
            if json_output {
                json_out::print_json(&branches)?;
            } else {
                for b in branches {
                    println!("  {b}");
                }
            }
        }
    }

    Ok(())
}

fn run_event(db: &Database, cfg: &DeskConfig, cmd: EventCommand, json_output: bool) -> Result<()> {
    match cmd {
        EventCommand::List { period } => {
            let events = db.list_events(&period.request(Period::None)?)?;
            if json_output {
                json_out::print_json(&events)?;
            } else {
                table::print_events(&events);
            }
        }

        EventCommand::Add {
            title,
            description,
            start,
            end,
            role,
        } => {
            let event = db.add_event(
                &role,
                &cfg.events.editor_role,
                &NewEvent {
                    title,
                    description,
                    starts_at: start,
                    ends_at: end,
                },
            )?;
            if json_output {
                json_out::print_json(&event)?;
            } else {
                println!("Added event {}: {}", event.id, event.title);
            }
        }

        EventCommand::Move { id, start } => {
            let event = db
                .reschedule_event(id, &start)?
                .with_context(|| format!("Event not found: {id}"))?;
            if json_output {
                json_out::print_json(&event)?;
            } else {
                println!("Moved event {} to {}", event.id, event.starts_at);
            }
        }
    }

    Ok(())
}

fn run_post(db: &Database, cfg: &DeskConfig, cmd: PostCommand, json_output: bool) -> Result<()> {
    let editor = &cfg.feed.editor_role;

    match cmd {
        PostCommand::Add {
            username,
            text,
            image,
            role,
        } => {
            let post = db.add_post(&role, editor, &NewPost { username, text, image })?;
            if json_output {
                json_out::print_json(&post)?;
            } else {
                println!("Published post {}", post.id);
            }
        }

        PostCommand::List => {
            let posts = db.list_posts()?;
            if json_output {
                json_out::print_json(&posts)?;
            } else {
                table::print_posts(&posts);
            }
        }

        PostCommand::Like { id } => {
            let post = db
                .like_post(id)?
                .ok_or(DeskError::NotFound { kind: "post", id })?;
            if json_output {
                json_out::print_json(&post)?;
            } else {
                println!("Post {} now has {} likes", post.id, post.likes);
            }
        }

        PostCommand::Edit {
            id,
            text,
            image,
            role,
        } => {
            let post = db
                .edit_post(&role, editor, id, &text, image.as_deref())?
                .ok_or(DeskError::NotFound { kind: "post", id })?;
            if json_output {
                json_out::print_json(&post)?;
            } else {
                println!("Edited post {}", post.id);
            }
        }

        PostCommand::Delete { id, role } => {
            if !db.delete_post(&role, editor, id)? {
                return Err(DeskError::NotFound { kind: "post", id }.into());
            }
            println!("Deleted post {id}");
        }
    }

    Ok(())
}

fn run_story(db: &Database, cfg: &DeskConfig, cmd: StoryCommand, json_output: bool) -> Result<()> {
    match cmd {
        StoryCommand::Add { image, role } => {
            let story = db.add_story(&role, &cfg.feed.editor_role, &image)?;
            if json_output {
                json_out::print_json(&story)?;
            } else {
                println!("Added story {}", story.id);
            }
        }

        StoryCommand::List => {
            let stories = db.active_stories()?;
            if json_output {
                json_out::print_json(&stories)?;
            } else {
                table::print_stories(&stories);
            }
        }

        StoryCommand::Cleanup => {
            let removed = db.cleanup_stories()?;
            if json_output {
                json_out::print_json(&serde_json::json!({ "removed": removed }))?;
            } else {
                println!("Removed {removed} expired stor{}", if removed == 1 { "y" } else { "ies" });
            }
        }
    }

    Ok(())
}
