//! Oficina command-line front
//!
//! Thin shell over the desk core: sign in, browse and filter service
//! orders, create orders, change statuses.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use oficina_client::{CachedApi, NetworkHttpClient, OficinaApi};
use oficina_desk::format::{
    format_currency, format_date, format_date_opt, format_document, format_order_number,
    format_percentage, format_phone, parse_money,
};
use oficina_desk::{
    DeskConfig, ItemDraft, LocalStore, Notification, OrderBoard, OrderForm, SessionContext,
    StatusMachine, StatusUpdater, SubmitOutcome, logger,
};
use oficina_desk::validation::{validate_user_create, validate_user_update};
use shared::models::{ServiceOrder, User, UserCreate, UserRole, UserUpdate};
use shared::order::{FinancialStatus, PaymentType, TechnicalStatus};
use shared::request::OrderFilters;

type Api = CachedApi<NetworkHttpClient>;

#[derive(Parser)]
#[command(name = "oficina")]
#[command(about = "Repair-shop service orders")]
#[command(version)]
struct Cli {
    /// API base URL (overrides OFICINA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Local data directory (overrides OFICINA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "OFICINA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Service orders
    #[command(subcommand)]
    Orders(OrderCommands),
    /// Search customers
    Customers {
        #[arg(long)]
        search: Option<String>,
    },
    /// User administration (admin)
    #[command(subcommand)]
    Users(UserCommands),
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List,
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "OFICINA_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_parser = parse_role, default_value = "ATTENDANT")]
        role: UserRole,
    },
    /// Change fields of a user
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "OFICINA_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long, value_parser = parse_role)]
        role: Option<UserRole>,
        /// Activate (`true`) or deactivate (`false`) the account
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a user
    Delete { id: String },
}

#[derive(Subcommand)]
enum OrderCommands {
    /// List orders; filters are remembered between runs
    List(ListArgs),
    /// Show one order
    Show { id: String },
    /// Create an order
    Create(CreateArgs),
    /// Change the technical status
    Status {
        id: String,
        #[arg(value_parser = parse_technical)]
        status: TechnicalStatus,
        /// Enforce the standard transition table
        #[arg(long)]
        strict: bool,
    },
    /// Change the financial status
    Financial {
        id: String,
        #[arg(value_parser = parse_financial)]
        status: FinancialStatus,
        #[arg(long)]
        strict: bool,
    },
    /// Delete an order
    Delete { id: String },
    /// Predict the next order number
    NextNumber,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_technical)]
    status: Option<TechnicalStatus>,
    #[arg(long, value_parser = parse_financial)]
    financial: Option<FinancialStatus>,
    #[arg(long)]
    customer: Option<String>,
    #[arg(long)]
    page: Option<u32>,
    /// Forget the saved filters
    #[arg(long)]
    clear: bool,
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    customer: String,
    #[arg(long)]
    equipment: String,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    defect: Option<String>,
    /// `description;quantity;value[;discount;addition]`, repeatable
    #[arg(long = "item", required = true)]
    items: Vec<String>,
    #[arg(long)]
    discount_pct: Option<String>,
    #[arg(long)]
    addition_pct: Option<String>,
    /// Number of installments (switches payment to installments)
    #[arg(long)]
    installments: Option<u8>,
}

fn parse_technical(value: &str) -> Result<TechnicalStatus, String> {
    TechnicalStatus::parse(value).ok_or_else(|| format!("unknown status: {value}"))
}

fn parse_financial(value: &str) -> Result<FinancialStatus, String> {
    FinancialStatus::parse(value).ok_or_else(|| format!("unknown financial status: {value}"))
}

fn parse_role(value: &str) -> Result<UserRole, String> {
    UserRole::parse(value).ok_or_else(|| format!("unknown role: {value}"))
}

fn parse_item(raw_item: &str) -> anyhow::Result<ItemDraft> {
    let parts: Vec<&str> = raw_item.split(';').map(str::trim).collect();
    if parts.len() < 3 {
        bail!("item must look like `description;quantity;value`: {raw_item}");
    }
    let money = |idx: usize| -> anyhow::Result<_> {
        match parts.get(idx) {
            None => Ok(Default::default()),
            Some(raw) => parse_money(raw).with_context(|| format!("invalid amount: {raw}")),
        }
    };
    Ok(ItemDraft {
        description: parts[0].to_string(),
        quantity: parts[1]
            .parse()
            .with_context(|| format!("invalid quantity: {}", parts[1]))?,
        value: money(2)?,
        discount: money(3)?,
        addition: money(4)?,
    })
}

fn report(note: &Notification) -> anyhow::Result<()> {
    if note.is_error() {
        bail!("{}", note.message);
    }
    println!("{}", note.message);
    Ok(())
}

fn print_order(order: &ServiceOrder) {
    println!("{}  {}", format_order_number(order.order_number), order.equipment);
    if let Some(customer) = &order.customer {
        let document = customer.document.as_deref().map(format_document).unwrap_or_default();
        let phone = customer.phone.as_deref().map(format_phone).unwrap_or_default();
        println!("  Customer:  {} {} {}", customer.name, document, phone);
    }
    println!("  Status:    {} / {}", order.status, order.financial);
    println!("  Entry:     {}", format_date(order.entry_date));
    println!("  Approved:  {}", format_date_opt(order.approval_date));
    println!("  Expected:  {}", format_date_opt(order.expected_delivery_date));
    println!("  Delivered: {}", format_date_opt(order.delivery_date));
    for item in &order.services {
        println!(
            "  - {} x{} @ {} = {}",
            item.description,
            item.quantity,
            format_currency(item.value),
            format_currency(item.total)
        );
    }
    println!("  Services:  {}", format_currency(order.services_sum));
    println!(
        "  Discount:  {} + {}",
        format_currency(order.total_discount),
        format_percentage(order.discount_percentage)
    );
    println!(
        "  Addition:  {} + {}",
        format_currency(order.total_addition),
        format_percentage(order.addition_percentage)
    );
    println!("  Total:     {}", format_currency(order.total_amount));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = DeskConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    logger::init_logger_with_file(Some(level), config.log_dir.as_deref());

    tracing::debug!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "Starting");

    let store = Arc::new(LocalStore::load(&config.data_dir).context("failed to open local storage")?);
    let api: Arc<Api> = Arc::new(CachedApi::new(config.client_config().build_http_client()?));
    let session = SessionContext::initialize(api.clone(), store.clone());

    match cli.command {
        Commands::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Commands::Logout => {
            session.logout().await?;
            println!("Signed out");
        }
        Commands::Whoami => match session.refresh().await? {
            Some(user) => println!("{} <{}> {}", user.name, user.email, user.role.code()),
            None => println!("Not signed in"),
        },
        command => {
            if !session.state().is_authenticated() {
                bail!("not signed in; run `oficina login` first");
            }
            run_authenticated(command, api, store).await?;
        }
    }
    Ok(())
}

async fn run_authenticated(
    command: Commands,
    api: Arc<Api>,
    store: Arc<LocalStore>,
) -> anyhow::Result<()> {
    match command {
        Commands::Orders(cmd) => run_orders(cmd, api, store).await,
        Commands::Customers { search } => {
            for customer in api.list_customers(search.as_deref()).await? {
                let document = customer.document.as_deref().map(format_document).unwrap_or_default();
                println!("{}  {}  {}", customer.id, customer.name, document);
            }
            Ok(())
        }
        Commands::Users(cmd) => run_users(cmd, api).await,
        Commands::Login { .. } | Commands::Logout | Commands::Whoami => Ok(()),
    }
}

fn print_user(user: &User) {
    let active = if user.is_active { "" } else { " (inactive)" };
    println!("{}  {} <{}> {}{active}", user.id, user.name, user.email, user.role.code());
}

async fn run_users(cmd: UserCommands, api: Arc<Api>) -> anyhow::Result<()> {
    match cmd {
        UserCommands::List => {
            for user in api.list_users().await? {
                print_user(&user);
            }
        }
        UserCommands::Create {
            name,
            email,
            password,
            role,
        } => {
            let payload = UserCreate {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password,
                role,
            };
            let errors = validate_user_create(&payload);
            if !errors.is_empty() {
                bail!("invalid user: {errors}");
            }
            print_user(&api.create_user(&payload).await?);
        }
        UserCommands::Update {
            id,
            name,
            email,
            password,
            role,
            active,
        } => {
            let payload = UserUpdate {
                name: name.map(|n| n.trim().to_string()),
                email: email.map(|e| e.trim().to_string()),
                password,
                role,
                is_active: active,
            };
            let errors = validate_user_update(&payload);
            if !errors.is_empty() {
                bail!("invalid user: {errors}");
            }
            print_user(&api.update_user(&id, &payload).await?);
        }
        UserCommands::Delete { id } => {
            api.delete_user(&id).await?;
            println!("User {id} deleted");
        }
    }
    Ok(())
}

async fn run_orders(cmd: OrderCommands, api: Arc<Api>, store: Arc<LocalStore>) -> anyhow::Result<()> {
    match cmd {
        OrderCommands::List(args) => {
            let mut board = OrderBoard::open(api, store);
            if args.clear {
                board.clear_filters();
            }
            if args.search.is_some() || args.status.is_some() || args.financial.is_some() || args.customer.is_some() {
                let current = board.filters().clone();
                board.set_filters(OrderFilters {
                    search: args.search.or(current.search),
                    status: args.status.or(current.status),
                    financial: args.financial.or(current.financial),
                    customer_id: args.customer.or(current.customer_id),
                    ..current
                });
            }
            if let Some(page) = args.page {
                board.set_page(page);
            }
            board.refresh().await.map_err(|n| anyhow::anyhow!(n.message))?;

            for row in board.rows() {
                let order = &row.order;
                println!(
                    "{}  {:<24} {:<20} {:<22} {:<18} {}",
                    format_order_number(order.order_number),
                    row.customer_name.as_deref().unwrap_or("-"),
                    order.equipment,
                    order.status.label(),
                    order.financial.label(),
                    format_currency(order.total_amount)
                );
            }
            println!(
                "page {}/{} ({} orders)",
                board.filters().page,
                board.total_pages().max(1),
                board.total()
            );
            Ok(())
        }
        OrderCommands::Show { id } => {
            print_order(&api.get_order(&id).await?);
            Ok(())
        }
        OrderCommands::Create(args) => {
            let query = format!("?customerId={}", args.customer);
            let mut form = OrderForm::create(api, Some(&query));
            if let Some(number) = form.load_next_number().await {
                println!("Creating {}", format_order_number(number));
            }
            form.draft.equipment = args.equipment;
            form.draft.brand = args.brand.unwrap_or_default();
            form.draft.model = args.model.unwrap_or_default();
            form.draft.reported_defect = args.defect.unwrap_or_default();
            if let Some(raw) = args.discount_pct {
                form.draft.discount_percentage =
                    parse_money(&raw).with_context(|| format!("invalid percentage: {raw}"))?;
            }
            if let Some(raw) = args.addition_pct {
                form.draft.addition_percentage =
                    parse_money(&raw).with_context(|| format!("invalid percentage: {raw}"))?;
            }
            if let Some(n) = args.installments {
                form.draft.payment_type = PaymentType::Installment;
                form.draft.installments = n;
            }
            for raw_item in &args.items {
                form.ledger.draft = parse_item(raw_item)?;
                if let Err(errors) = form.ledger.add_or_update() {
                    bail!("invalid item `{raw_item}`: {errors}");
                }
            }

            match form.submit().await {
                SubmitOutcome::Saved {
                    order,
                    notification,
                    redirect,
                } => {
                    println!("{}", notification.message);
                    print_order(&order);
                    println!("-> {}", redirect.to.path());
                    Ok(())
                }
                SubmitOutcome::Invalid(errors) => bail!("invalid order: {errors}"),
                SubmitOutcome::Failed(note) => bail!("{}", note.message),
            }
        }
        OrderCommands::Status { id, status, strict } => {
            let mut order = api.get_order(&id).await?;
            let machine = if strict { StatusMachine::standard() } else { StatusMachine::permissive() };
            let note = StatusUpdater::new(&*api, machine)
                .update_technical(&mut order, status)
                .await;
            report(&note)
        }
        OrderCommands::Financial { id, status, strict } => {
            let mut order = api.get_order(&id).await?;
            let machine = if strict { StatusMachine::standard() } else { StatusMachine::permissive() };
            let note = StatusUpdater::new(&*api, machine)
                .update_financial(&mut order, status)
                .await;
            report(&note)
        }
        OrderCommands::Delete { id } => {
            let mut board = OrderBoard::open(api, store);
            report(&board.delete(&id).await)
        }
        OrderCommands::NextNumber => {
            let seq = api.get_next_sequence_number().await?;
            println!("{}", format_order_number(seq.predicted_next()));
            Ok(())
        }
    }
}
