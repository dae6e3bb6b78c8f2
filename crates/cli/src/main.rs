use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use daybook_core::models::calendar::CalendarCursor;
use daybook_core::models::date_key::DateKey;
use daybook_core::models::rate::CurrencyCode;
use daybook_core::models::settings::Settings;
use daybook_core::models::transaction::TransactionKind;
use daybook_core::providers::analysis::GeminiAnalyzer;
use daybook_core::providers::backend::HttpLedgerBackend;
use daybook_core::services::converter_service::ConverterService;
use daybook_core::services::ledger_service::Confirmation;
use daybook_core::services::post_service::PostBoard;
use daybook_core::services::remote_service::RemoteDashboard;
use daybook_core::storage::kv::FileStore;
use daybook_core::Daybook;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(name = "daybook", version, about = "Calendar memos, income/expense ledger and rate converter")]
struct Cli {
    /// Data directory (default: $DAYBOOK_HOME, then ~/.daybook)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a month grid (default: current month)
    Calendar {
        /// Month as YYYY-MM
        month: Option<String>,

        /// Highlight a date
        #[arg(long)]
        select: Option<String>,
    },

    /// Read or change the memo of a day
    Memo {
        #[command(subcommand)]
        command: MemoCommand,
    },

    /// Record an income or expense
    Add(AddArgs),

    /// Totals, remaining money and the category breakdown
    Summary,

    /// Everything recorded on one date
    Day { date: String },

    /// Delete all memos or all transactions
    Reset {
        what: ResetTarget,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Print the ledger as JSON
    Export,

    /// Convert an amount between currencies (fiat or BTC/ETH/XRP)
    Convert {
        amount: f64,
        from: String,
        to: String,
    },

    /// Daily rate history for a currency pair
    History {
        from: String,
        to: String,

        /// Number of days (default from config)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Anonymous post board
    Post {
        #[command(subcommand)]
        command: PostCommand,
    },

    /// Dashboard backed by the REST server in `backend_url`
    Remote {
        #[command(subcommand)]
        command: RemoteCommand,
    },

    /// Manage config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MemoCommand {
    Show { date: String },
    Set { date: String, text: String },
    Delete { date: String },
}

#[derive(Args, Debug)]
struct AddArgs {
    kind: KindArg,

    /// Date (YYYY-MM-DD or YYYY-M-D)
    #[arg(long)]
    date: Option<String>,

    /// Category key, e.g. salary, food
    #[arg(long)]
    category: String,

    /// Amount; separators are ignored ("500,000")
    #[arg(long)]
    amount: String,

    #[arg(long)]
    name: Option<String>,
}

/// `remote add`: the backend stores no free-text name.
#[derive(Args, Debug)]
struct RemoteAddArgs {
    kind: KindArg,

    /// Date (YYYY-MM-DD or YYYY-M-D)
    #[arg(long)]
    date: Option<String>,

    /// Category key, e.g. salary, food
    #[arg(long)]
    category: String,

    /// Amount; separators are ignored ("500,000")
    #[arg(long)]
    amount: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResetTarget {
    Memos,
    Transactions,
}

#[derive(Subcommand, Debug)]
enum PostCommand {
    /// Publish a post (HTML allowed)
    Publish { content: String },
    List,
    /// Ask the analyzer about all posts
    Analyze,
}

#[derive(Subcommand, Debug)]
enum RemoteCommand {
    Summary,
    Day { date: String },
    Add(RemoteAddArgs),
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config.toml
    Init,
    /// Print the effective configuration
    Show,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DAYBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let home = config::daybook_home(cli.home)?;
    let settings = config::load_config(&home)?;
    let today = Local::now().date_naive();
    tracing::debug!(home = %home.display(), %today, "daybook starting");

    match cli.command {
        Command::Calendar { month, select } => {
            let mut book = open_daybook(&home, settings, today)?;
            if let Some(month) = month {
                book.set_cursor(parse_month(&month)?);
            }
            if let Some(date) = select {
                book.select_date(parse_date(&date)?);
            }
            print!("{}", render::calendar(&book.month_grid(today)));
        }

        Command::Memo { command } => {
            let mut book = open_daybook(&home, settings, today)?;
            match command {
                MemoCommand::Show { date } => {
                    let key = parse_date(&date)?;
                    match book.memo(&key) {
                        Some(text) if !text.is_empty() => println!("{key}: {text}"),
                        Some(_) => println!("{key}: (blank)"),
                        None => println!("{key}: no memo"),
                    }
                }
                MemoCommand::Set { date, text } => {
                    let key = parse_date(&date)?;
                    book.upsert_memo(key, &text).context("saving memo")?;
                    println!("Saved memo for {key}");
                }
                MemoCommand::Delete { date } => {
                    let key = parse_date(&date)?;
                    match book.delete_memo(&key).context("deleting memo")? {
                        Some(_) => println!("Deleted memo for {key}"),
                        None => println!("{key} had no memo"),
                    }
                }
            }
        }

        Command::Add(args) => {
            let mut book = open_daybook(&home, settings, today)?;
            if let Some(date) = &args.date {
                book.select_date(parse_date(date)?);
            }
            let tx = book.add_transaction(
                args.kind.into(),
                &args.category,
                &args.amount,
                args.name.as_deref(),
            )?;
            println!(
                "Added {} {} on {} ({}) id={}",
                tx.kind,
                tx.amount,
                tx.date,
                tx.label(),
                tx.id
            );
        }

        Command::Summary => {
            let book = open_daybook(&home, settings, today)?;
            print!("{}", render::summary(&book.summary()));
        }

        Command::Day { date } => {
            let book = open_daybook(&home, settings, today)?;
            let key = parse_date(&date)?;
            if let Some(memo) = book.memo(&key).filter(|m| !m.is_empty()) {
                println!("Memo: {memo}");
            }
            print!("{}", render::day_detail(&book.day_detail(&key)));
        }

        Command::Reset { what, yes } => {
            let mut book = open_daybook(&home, settings, today)?;
            let confirmation = Confirmation::from(yes);
            match what {
                ResetTarget::Memos => book.reset_memos(confirmation)?,
                ResetTarget::Transactions => book.reset_transactions(confirmation)?,
            }
            println!("Reset complete");
        }

        Command::Export => {
            let book = open_daybook(&home, settings, today)?;
            println!("{}", book.export_json()?);
        }

        Command::Convert { amount, from, to } => {
            let from = CurrencyCode::parse(&from)?;
            let to = CurrencyCode::parse(&to)?;
            let conversion = ConverterService::default()
                .convert(amount, &from, &to)
                .await
                .context("conversion failed; check the currency pair")?;
            println!("{}", conversion.describe());
        }

        Command::History { from, to, days } => {
            let from = CurrencyCode::parse(&from)?;
            let to = CurrencyCode::parse(&to)?;
            let days = days.unwrap_or(settings.history_days);
            let points = ConverterService::default()
                .history(&from, &to, today, days)
                .await?;
            print!("{}", render::history(&from, &to, &points));
        }

        Command::Post { command } => {
            let mut board = PostBoard::open(open_store(&home)?, settings.clone())?;
            match command {
                PostCommand::Publish { content } => {
                    let post = board.publish_now(&content)?;
                    println!("Published as {}", post.nickname);
                }
                PostCommand::List => print!("{}", render::posts(board.feed())),
                PostCommand::Analyze => {
                    let key = settings
                        .analysis_api_key
                        .clone()
                        .context("analysis_api_key is not set in config.toml")?;
                    let analyzer = GeminiAnalyzer::new(key);
                    let result = board.analyze(&analyzer).await?;
                    print!("{}", render::analysis(&result));
                }
            }
        }

        Command::Remote { command } => {
            let url = settings
                .backend_url
                .clone()
                .context("backend_url is not set in config.toml")?;
            let dashboard = RemoteDashboard::new(HttpLedgerBackend::new(url));
            match command {
                RemoteCommand::Summary => {
                    let outcome = dashboard.summary().await;
                    if let Some(err) = &outcome.error {
                        eprintln!("{err}");
                    }
                    print!("{}", render::summary(&outcome.value));
                }
                RemoteCommand::Day { date } => {
                    let outcome = dashboard.day_detail(&parse_date(&date)?).await;
                    if let Some(err) = &outcome.error {
                        eprintln!("{err}");
                    }
                    print!("{}", render::day_detail(&outcome.value));
                }
                RemoteCommand::Add(args) => {
                    let date = args.date.as_deref().map(parse_date).transpose()?;
                    dashboard
                        .add_transaction(args.kind.into(), date.as_ref(), &args.category, &args.amount)
                        .await
                        .context("adding the transaction on the server failed")?;
                    println!("Added");
                }
                RemoteCommand::Reset { yes } => {
                    dashboard.reset(Confirmation::from(yes)).await?;
                    println!("Server data reset");
                }
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                if config::init_config(&home)? {
                    println!("Wrote {}", config::config_path(&home).display());
                } else {
                    println!("Config already exists: {}", config::config_path(&home).display());
                }
            }
            ConfigCommand::Show => {
                println!("# {}", config::config_path(&home).display());
                print!("{}", config::render_config(&settings)?);
            }
        },
    }

    Ok(())
}

fn open_store(home: &Path) -> Result<FileStore> {
    let dir = config::data_dir(home);
    FileStore::open(&dir).with_context(|| format!("open data directory {}", dir.display()))
}

fn open_daybook(home: &Path, settings: Settings, today: NaiveDate) -> Result<Daybook<FileStore>> {
    Ok(Daybook::open_at(open_store(home)?, settings, today))
}

fn parse_date(input: &str) -> Result<DateKey> {
    Ok(DateKey::parse(input)?)
}

/// `YYYY-MM` → cursor.
fn parse_month(input: &str) -> Result<CalendarCursor> {
    let Some(date) = NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d").ok() else {
        bail!("'{input}' is not a month (expected YYYY-MM)");
    };
    Ok(CalendarCursor::containing(date))
}
