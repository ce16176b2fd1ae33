use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{AppError, ExpenseInput, SessionContext, SplitService};
use crate::domain::{
    ExpenseFilter, PaymentMethod, Session, format_amount, format_cents, parse_cents,
};
use crate::io::{Exporter, ImportOptions, Importer};

/// Roomsplit - Shared expense splitter
#[derive(Parser)]
#[command(name = "roomsplit")]
#[command(about = "A local-first shared-expense splitter and settlement ledger for small groups")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "roomsplit.db")]
    pub database: String,

    /// Session token obtained from `account login`
    #[arg(long, env = "ROOMSPLIT_SESSION", global = true)]
    pub session: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Account and session commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Group member commands
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Expense category commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Expense commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Settlement commands (repayments and debt pay-downs)
    #[command(subcommand)]
    Settle(SettleCommands),

    /// Show the per-member balance summary
    Balances,

    /// Show dashboard totals
    Stats,

    /// Group settings commands
    #[command(subcommand)]
    Group(GroupCommands),

    /// Export data to CSV or JSON
    Export {
        /// What to export: expenses, settlements, balances, snapshot
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import data from CSV
    Import {
        /// What to import: expenses
        import_type: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,

        /// Skip records already present (same date, description, amount)
        #[arg(long)]
        skip_duplicates: bool,

        /// Create profiles and categories that don't exist
        #[arg(long)]
        create_missing: bool,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create an account and its member profile
    Register {
        /// Email address (unique)
        email: String,

        /// Member name shown in balances
        #[arg(short, long)]
        name: String,

        /// Password (stored as an Argon2 hash)
        #[arg(short, long)]
        password: String,
    },

    /// Sign in and print a session token
    Login {
        /// Email address
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Revoke the current session
    Logout,

    /// Show the signed-in account and member
    Whoami,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Add a group member
    Add {
        /// Member name (must be unique)
        name: String,
    },

    /// List all group members
    List,
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add an expense category
    Add {
        /// Category name (must be unique)
        name: String,

        /// Display icon (e.g. an emoji)
        #[arg(long, default_value = "")]
        icon: String,

        /// Display color (e.g. "#ff8800")
        #[arg(long, default_value = "")]
        color: String,
    },

    /// List all categories
    List,

    /// Delete a category (its expenses become uncategorized)
    Delete {
        /// Category name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a shared expense
    Add {
        /// What the expense was for
        description: String,

        /// Amount (e.g. "45.50" or "45")
        amount: String,

        /// Currency tag
        #[arg(short, long, default_value = "AED")]
        currency: String,

        /// Category name
        #[arg(long)]
        category: Option<String>,

        /// Paying member (defaults to the signed-in member)
        #[arg(long)]
        paid_by: Option<String>,

        /// Payment method: cash, credit_card, debit_card, bank_transfer
        #[arg(short, long, default_value = "cash")]
        method: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List expenses, optionally filtered
    List {
        /// Search term matched against description or payer name
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by category name (omit for all)
        #[arg(long)]
        category: Option<String>,
    },

    /// Show expenses grouped into current month and past months
    History {
        /// Search term matched against description or payer name
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by category name (omit for all)
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one expense in full
    Show {
        /// Expense ID
        id: String,
    },

    /// Edit an expense (unset flags keep their current value)
    Edit {
        /// Expense ID
        id: String,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New amount
        #[arg(long)]
        amount: Option<String>,

        /// New currency tag
        #[arg(long)]
        currency: Option<String>,

        /// New category name ("" clears it)
        #[arg(long)]
        category: Option<String>,

        /// New paying member ("" clears it)
        #[arg(long)]
        paid_by: Option<String>,

        /// New payment method
        #[arg(long)]
        method: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SettleCommands {
    /// Record a repayment to another member
    Repay {
        /// Amount (e.g. "30.00" or "30")
        amount: String,

        /// Member being repaid
        #[arg(long)]
        to: String,

        /// Paying member (defaults to the signed-in member)
        #[arg(long)]
        from: Option<String>,

        /// What the repayment is for
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// Date of the repayment (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Record a debt pay-down (a credit against your own tracked debt)
    PayDown {
        /// Amount (e.g. "30.00" or "30")
        amount: String,

        /// Member paying down (defaults to the signed-in member)
        #[arg(long)]
        profile: Option<String>,

        /// What the pay-down is for
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// Date of the pay-down (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List all settlements
    List,

    /// Delete a settlement
    Delete {
        /// Settlement ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Show the current group settings
    Show,

    /// Set how many ways expenses are split
    SetSize {
        /// Number of members sharing every expense (at least 2)
        size: u32,
    },
}

impl Cli {
    /// Resolve the `--session`/env token into a full session context, if any.
    async fn resolve_session(&self, service: &SplitService) -> Result<Option<SessionContext>> {
        let Some(raw) = self.session.as_deref() else {
            return Ok(None);
        };
        let Ok(token) = Uuid::parse_str(raw.trim()) else {
            if self.verbose {
                eprintln!("Ignoring malformed session token");
            }
            return Ok(None);
        };
        Ok(service.current_session(token).await?)
    }

    pub async fn run(self) -> Result<()> {
        match &self.command {
            Commands::Init => {
                SplitService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
                Ok(())
            }
            _ => {
                let service = SplitService::connect(&self.database).await?;
                self.dispatch(&service).await
            }
        }
    }

    async fn dispatch(&self, service: &SplitService) -> Result<()> {
        match &self.command {
            Commands::Init => unreachable!("handled in run"),

            Commands::Account(cmd) => self.run_account_command(service, cmd).await?,

            Commands::Profile(cmd) => run_profile_command(service, cmd).await?,

            Commands::Category(cmd) => run_category_command(service, cmd).await?,

            Commands::Expense(cmd) => self.run_expense_command(service, cmd).await?,

            Commands::Settle(cmd) => self.run_settle_command(service, cmd).await?,

            Commands::Balances => {
                let balances = service.balance_summary().await?;
                if balances.is_empty() {
                    println!("No members yet. Add one with: roomsplit profile add <name>");
                    return Ok(());
                }

                println!("Settlement balances:");
                for member in &balances {
                    println!(
                        "  {:<16} paid {:>10}  share {:>10}  balance {:>10}  ({})",
                        member.name,
                        format_cents(member.paid),
                        format_cents(member.share),
                        format_cents(member.balance),
                        member.standing(),
                    );
                    if self.verbose
                        && (member.settlement_credit != 0
                            || member.repaid != 0
                            || member.received != 0)
                    {
                        println!(
                            "  {:<16} paid down {}  repaid {}  received {}",
                            "",
                            format_cents(member.settlement_credit),
                            format_cents(member.repaid),
                            format_cents(member.received),
                        );
                    }
                }
            }

            Commands::Stats => {
                let stats = service.dashboard(today()).await?;
                println!("Total expenses:  {}", format_cents(stats.total_cents));
                println!("This month:      {}", format_cents(stats.month_cents));
                println!("Expense entries: {}", stats.expense_count);
                println!("Per person:      {}", format_cents(stats.per_person_cents));
            }

            Commands::Group(cmd) => match cmd {
                GroupCommands::Show => {
                    let size = service.group_size().await?;
                    println!("Expenses are split {} ways", size);
                }
                GroupCommands::SetSize { size } => {
                    service.set_group_size(*size).await?;
                    println!("Group size set to {}", size);
                }
            },

            Commands::Export {
                export_type,
                output,
            } => {
                run_export_command(service, export_type, output.as_deref()).await?;
            }

            Commands::Import {
                import_type,
                input,
                dry_run,
                skip_duplicates,
                create_missing,
            } => {
                let options = ImportOptions {
                    dry_run: *dry_run,
                    skip_duplicates: *skip_duplicates,
                    create_missing: *create_missing,
                };
                run_import_command(service, import_type, input.as_deref(), options).await?;
            }
        }

        Ok(())
    }

    async fn run_account_command(
        &self,
        service: &SplitService,
        cmd: &AccountCommands,
    ) -> Result<()> {
        match cmd {
            AccountCommands::Register {
                email,
                name,
                password,
            } => {
                let (account, profile) = service.sign_up(email, password, name).await?;
                println!("Registered {} as member '{}'", account.email, profile.name);
                println!("Sign in with: roomsplit account login {}", account.email);
            }

            AccountCommands::Login { email, password } => {
                let session = service.sign_in(email, password).await?;
                println!("Signed in. Session token (valid {} days):", Session::TTL_DAYS);
                println!("{}", session.token);
                println!(
                    "Export it for later commands: export ROOMSPLIT_SESSION={}",
                    session.token
                );
            }

            AccountCommands::Logout => {
                match self.session.as_deref().map(str::trim).map(Uuid::parse_str) {
                    Some(Ok(token)) => {
                        service.sign_out(token).await?;
                        println!("Signed out.");
                    }
                    _ => println!("No session token provided; nothing to revoke."),
                }
            }

            AccountCommands::Whoami => match self.resolve_session(service).await? {
                Some(ctx) => {
                    println!("Account: {}", ctx.account.email);
                    match ctx.profile_name() {
                        Some(name) => println!("Member:  {}", name),
                        None => println!("Member:  (no linked profile)"),
                    }
                    println!(
                        "Session expires: {}",
                        ctx.session.expires_at.format("%Y-%m-%d %H:%M UTC")
                    );
                }
                None => println!("Not signed in."),
            },
        }
        Ok(())
    }

    async fn run_expense_command(
        &self,
        service: &SplitService,
        cmd: &ExpenseCommands,
    ) -> Result<()> {
        match cmd {
            ExpenseCommands::Add {
                description,
                amount,
                currency,
                category,
                paid_by,
                method,
                date,
            } => {
                let amount_cents =
                    parse_cents(amount).context("Invalid amount format. Use '45.50' or '45'")?;
                let expense_date = parse_date_or_today(date.as_deref())?;
                let payment_method = parse_payment_method(method)?;

                // Fall back to the signed-in member as payer.
                let paid_by = match paid_by {
                    Some(name) => Some(name.clone()),
                    None => self
                        .resolve_session(service)
                        .await?
                        .and_then(|ctx| ctx.profile_name().map(str::to_string)),
                };

                let expense = service
                    .add_expense(ExpenseInput {
                        description: description.clone(),
                        amount_cents,
                        currency: currency.clone(),
                        expense_date: Some(expense_date),
                        category: category.clone(),
                        paid_by,
                        payment_method,
                    })
                    .await?;

                println!(
                    "Recorded expense: {} for {} ({})",
                    expense.description,
                    format_amount(expense.amount_cents, &expense.currency),
                    expense.id
                );
            }

            ExpenseCommands::List { search, category } => {
                let filter = ExpenseFilter {
                    search: search.clone(),
                    category: service.category_filter(category.as_deref()).await?,
                };
                let expenses = service.search_expenses(&filter).await?;
                if expenses.is_empty() {
                    println!("No expenses found.");
                    return Ok(());
                }

                let profiles = service.list_profiles().await?;
                let payer_name = |id: Option<Uuid>| {
                    id.and_then(|id| profiles.iter().find(|p| p.id == id))
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "-".to_string())
                };

                for expense in &expenses {
                    println!(
                        "{}  {:<28} {:>12}  paid by {}",
                        expense.expense_date,
                        expense.description,
                        format_amount(expense.amount_cents, &expense.currency),
                        payer_name(expense.paid_by),
                    );
                    if self.verbose {
                        println!("    id: {}", expense.id);
                    }
                }
                println!("{} expense(s)", expenses.len());
            }

            ExpenseCommands::History { search, category } => {
                let filter = ExpenseFilter {
                    search: search.clone(),
                    category: service.category_filter(category.as_deref()).await?,
                };
                let history = service.monthly_history(&filter, today()).await?;

                println!(
                    "This month: {} expense(s), {}",
                    history.current.len(),
                    format_cents(history.current_total)
                );
                for expense in &history.current {
                    println!(
                        "  {}  {:<28} {:>12}",
                        expense.expense_date,
                        expense.description,
                        format_amount(expense.amount_cents, &expense.currency),
                    );
                }

                if history.past.is_empty() {
                    println!("No historical data.");
                    return Ok(());
                }
                for group in &history.past {
                    println!(
                        "{}: {} expense(s), {}",
                        group.label,
                        group.expenses.len(),
                        format_cents(group.total_cents)
                    );
                    for expense in &group.expenses {
                        println!(
                            "  {}  {:<28} {:>12}",
                            expense.expense_date,
                            expense.description,
                            format_amount(expense.amount_cents, &expense.currency),
                        );
                    }
                }
            }

            ExpenseCommands::Show { id } => {
                let id = parse_id(id, "expense")?;
                let detail = service.get_expense_detail(id).await?;
                let expense = &detail.expense;

                println!("Expense {}", expense.id);
                println!("  Description:    {}", expense.description);
                println!(
                    "  Amount:         {}",
                    format_amount(expense.amount_cents, &expense.currency)
                );
                println!("  Date:           {}", expense.expense_date);
                println!(
                    "  Category:       {}",
                    detail
                        .category
                        .as_ref()
                        .map(|c| c.name.as_str())
                        .unwrap_or("(uncategorized)")
                );
                println!(
                    "  Paid by:        {}",
                    detail
                        .payer
                        .as_ref()
                        .map(|p| p.name.as_str())
                        .unwrap_or("(unknown)")
                );
                println!("  Payment method: {}", expense.payment_method);
                println!(
                    "  Recorded at:    {}",
                    expense.created_at.format("%Y-%m-%d %H:%M UTC")
                );
            }

            ExpenseCommands::Edit {
                id,
                description,
                amount,
                currency,
                category,
                paid_by,
                method,
                date,
            } => {
                let id = parse_id(id, "expense")?;
                let detail = service.get_expense_detail(id).await?;
                let existing = detail.expense;

                let amount_cents = match amount {
                    Some(raw) => {
                        parse_cents(raw).context("Invalid amount format. Use '45.50' or '45'")?
                    }
                    None => existing.amount_cents,
                };
                let expense_date = match date {
                    Some(raw) => parse_date(raw)?,
                    None => existing.expense_date,
                };
                let payment_method = match method {
                    Some(raw) => parse_payment_method(raw)?,
                    None => existing.payment_method,
                };
                // An empty string clears the reference; an unset flag keeps it.
                let category = match category {
                    Some(name) if name.is_empty() => None,
                    Some(name) => Some(name.clone()),
                    None => detail.category.map(|c| c.name),
                };
                let paid_by = match paid_by {
                    Some(name) if name.is_empty() => None,
                    Some(name) => Some(name.clone()),
                    None => detail.payer.map(|p| p.name),
                };

                let updated = service
                    .update_expense(
                        id,
                        ExpenseInput {
                            description: description.clone().unwrap_or(existing.description),
                            amount_cents,
                            currency: currency.clone().unwrap_or(existing.currency),
                            expense_date: Some(expense_date),
                            category,
                            paid_by,
                            payment_method,
                        },
                    )
                    .await?;

                println!(
                    "Updated expense: {} for {}",
                    updated.description,
                    format_amount(updated.amount_cents, &updated.currency)
                );
            }

            ExpenseCommands::Delete { id } => {
                let id = parse_id(id, "expense")?;
                service.delete_expense(id).await?;
                println!("Expense deleted.");
            }
        }
        Ok(())
    }

    async fn run_settle_command(&self, service: &SplitService, cmd: &SettleCommands) -> Result<()> {
        match cmd {
            SettleCommands::Repay {
                amount,
                to,
                from,
                description,
                date,
            } => {
                let amount_cents =
                    parse_cents(amount).context("Invalid amount format. Use '30.00' or '30'")?;
                let settlement_date = parse_date_or_today(date.as_deref())?;
                let from = self.member_or_session(service, from.as_deref()).await?;

                let settlement = service
                    .record_repayment(&from, to, amount_cents, settlement_date, description.clone())
                    .await?;

                println!(
                    "Recorded repayment: {} {} -> {} ({})",
                    format_cents(settlement.amount_cents),
                    from,
                    to,
                    settlement.id
                );
            }

            SettleCommands::PayDown {
                amount,
                profile,
                description,
                date,
            } => {
                let amount_cents =
                    parse_cents(amount).context("Invalid amount format. Use '30.00' or '30'")?;
                let settlement_date = parse_date_or_today(date.as_deref())?;
                let name = self.member_or_session(service, profile.as_deref()).await?;

                let settlement = service
                    .record_pay_down(&name, amount_cents, settlement_date, description.clone())
                    .await?;

                println!(
                    "Recorded pay-down: {} by {} ({})",
                    format_cents(settlement.amount_cents),
                    name,
                    settlement.id
                );
            }

            SettleCommands::List => {
                let settlements = service.list_settlements().await?;
                if settlements.is_empty() {
                    println!("No settlements recorded.");
                    return Ok(());
                }

                for detail in &settlements {
                    let kind = if detail.settlement.is_self_settlement() {
                        format!("{} paid down", detail.from_name)
                    } else {
                        format!("{} -> {}", detail.from_name, detail.to_name)
                    };
                    println!(
                        "{}  {:<28} {:>12}{}",
                        detail.settlement.settlement_date,
                        kind,
                        format_cents(detail.settlement.amount_cents),
                        detail
                            .settlement
                            .description
                            .as_deref()
                            .map(|d| format!("  ({})", d))
                            .unwrap_or_default(),
                    );
                    if self.verbose {
                        println!("    id: {}", detail.settlement.id);
                    }
                }
            }

            SettleCommands::Delete { id } => {
                let id = parse_id(id, "settlement")?;
                service.delete_settlement(id).await?;
                println!("Settlement deleted.");
            }
        }
        Ok(())
    }

    /// An explicitly named member, or the signed-in member as fallback.
    async fn member_or_session(
        &self,
        service: &SplitService,
        explicit: Option<&str>,
    ) -> Result<String> {
        if let Some(name) = explicit {
            return Ok(name.to_string());
        }
        let name = self
            .resolve_session(service)
            .await?
            .and_then(|ctx| ctx.profile_name().map(str::to_string))
            .ok_or(AppError::NotSignedIn)?;
        Ok(name)
    }
}

async fn run_profile_command(service: &SplitService, cmd: &ProfileCommands) -> Result<()> {
    match cmd {
        ProfileCommands::Add { name } => {
            let profile = service.create_profile(name).await?;
            println!("Added member: {}", profile.name);
        }

        ProfileCommands::List => {
            let profiles = service.list_profiles().await?;
            if profiles.is_empty() {
                println!("No members yet.");
                return Ok(());
            }
            for profile in &profiles {
                let linked = if profile.is_linked() { " (registered)" } else { "" };
                println!("{}{}", profile.name, linked);
            }
        }
    }
    Ok(())
}

async fn run_category_command(service: &SplitService, cmd: &CategoryCommands) -> Result<()> {
    match cmd {
        CategoryCommands::Add { name, icon, color } => {
            let category = service.create_category(name, icon, color).await?;
            println!("Added category: {}", category.name);
        }

        CategoryCommands::List => {
            let categories = service.list_categories().await?;
            if categories.is_empty() {
                println!("No categories yet.");
                return Ok(());
            }
            for category in &categories {
                if category.icon.is_empty() {
                    println!("{}", category.name);
                } else {
                    println!("{} {}", category.icon, category.name);
                }
            }
        }

        CategoryCommands::Delete { name } => {
            let category = service.delete_category(name).await?;
            println!(
                "Deleted category: {} (its expenses are now uncategorized)",
                category.name
            );
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &SplitService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    let exporter = Exporter::new(service);

    let mut writer: Box<dyn std::io::Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file '{}'", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    match export_type {
        "expenses" => {
            let count = exporter.export_expenses_csv(&mut writer).await?;
            eprintln!("Exported {} expense(s)", count);
        }
        "settlements" => {
            let count = exporter.export_settlements_csv(&mut writer).await?;
            eprintln!("Exported {} settlement(s)", count);
        }
        "balances" => {
            let count = exporter.export_balances_csv(&mut writer).await?;
            eprintln!("Exported {} balance row(s)", count);
        }
        "snapshot" => {
            exporter.export_snapshot_json(&mut writer).await?;
            eprintln!("Exported database snapshot");
        }
        other => anyhow::bail!(
            "Unknown export type '{}'. Use: expenses, settlements, balances, snapshot",
            other
        ),
    }
    Ok(())
}

async fn run_import_command(
    service: &SplitService,
    import_type: &str,
    input: Option<&str>,
    options: ImportOptions,
) -> Result<()> {
    let importer = Importer::new(service);

    let reader: Box<dyn std::io::Read> = match input {
        Some(path) => Box::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open input file '{}'", path))?,
        ),
        None => Box::new(std::io::stdin()),
    };

    match import_type {
        "expenses" => {
            let dry_run = options.dry_run;
            let result = importer.import_expenses_csv(reader, options).await?;
            let verb = if dry_run { "Would import" } else { "Imported" };
            println!(
                "{} {} expense(s), skipped {}, {} error(s)",
                verb,
                result.imported,
                result.skipped,
                result.errors.len()
            );
            for error in &result.errors {
                match &error.field {
                    Some(field) => eprintln!("  line {} ({}): {}", error.line, field, error.error),
                    None => eprintln!("  line {}: {}", error.line, error.error),
                }
            }
        }
        other => anyhow::bail!("Unknown import type '{}'. Use: expenses", other),
    }
    Ok(())
}

fn parse_id(raw: &str, kind: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).with_context(|| format!("Invalid {} ID '{}'", kind, raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", raw))
}

fn parse_date_or_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(today()),
    }
}

fn parse_payment_method(raw: &str) -> Result<PaymentMethod> {
    PaymentMethod::from_str(raw).with_context(|| {
        format!(
            "Unknown payment method '{}'. Use: cash, credit_card, debit_card, bank_transfer",
            raw
        )
    })
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
