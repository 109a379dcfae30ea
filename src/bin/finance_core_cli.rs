use std::{env, path::PathBuf, process};

use chrono::NaiveDate;
use colored::Colorize;

use finance_core::{
    config::{Config, ConfigManager},
    currency::{format_amount, format_month_label, format_percentage, format_signed_percentage},
    domain::transaction::parse_date,
    init,
    time::SystemClock,
    utils::build_info,
    FinanceError, FinanceManager,
};

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("{} {err}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<(), FinanceError> {
    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_else(|| usage_and_exit());

    match command.as_str() {
        "version" => {
            println!("{}", build_info::current().describe());
        }
        "report" => {
            let manager = open_snapshot(args.next())?;
            let start = args.next().map(|raw| date_arg(&raw)).transpose()?;
            let end = args.next().map(|raw| date_arg(&raw)).transpose()?;
            print_report(&manager, start, end)?;
        }
        "insights" => {
            let manager = open_snapshot(args.next())?;
            print_insights(&manager);
        }
        "upcoming" => {
            let manager = open_snapshot(args.next())?;
            print_upcoming(&manager);
        }
        _ => usage_and_exit(),
    }
    Ok(())
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: finance_core_cli <command>\n\
         Commands:\n  \
         report <snapshot.json> [start YYYY-MM-DD] [end YYYY-MM-DD]\n  \
         insights <snapshot.json>\n  \
         upcoming <snapshot.json>\n  \
         version"
    );
    process::exit(2);
}

fn open_snapshot(path: Option<String>) -> Result<FinanceManager, FinanceError> {
    let path = PathBuf::from(path.unwrap_or_else(|| usage_and_exit()));
    let config = ConfigManager::locate()?.load()?;
    FinanceManager::load(&path, config, Box::new(SystemClock))
}

fn date_arg(raw: &str) -> Result<NaiveDate, FinanceError> {
    parse_date(raw).ok_or_else(|| FinanceError::InvalidInput(format!("`{raw}` is not a date")))
}

struct Money<'a>(&'a Config);

impl Money<'_> {
    fn show(&self, amount: f64) -> String {
        format_amount(amount, &self.0.currency_code(), &self.0.locale_config())
    }
}

fn section(title: &str) {
    println!("\n{}", title.bold().cyan());
}

fn print_report(
    manager: &FinanceManager,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), FinanceError> {
    let dates = manager.transactions().iter().filter_map(|txn| txn.date);
    let first = dates.clone().min();
    let last = dates.max();
    let (Some(start), Some(end)) = (start.or(first), end.or(last)) else {
        println!("{}", "No dated transactions to report on.".yellow());
        return Ok(());
    };
    let report = manager.generate_report(start, end)?;
    let money = Money(manager.config());

    println!("{} {}", "Financial report".bold(), report.period);
    section("Summary");
    println!("  Total income      {}", money.show(report.summary.total_income));
    println!("  Total expenses    {}", money.show(report.summary.total_expenses));
    println!("  Net income        {}", money.show(report.summary.net_income));
    println!("  Savings rate      {}", format_percentage(report.summary.savings_rate));

    section("Categories");
    for category in &report.category_breakdown {
        println!(
            "  {:<18}{:>14}  {:>6}  {:?}",
            category.category,
            money.show(category.total_amount),
            format_percentage(category.percentage),
            category.trend
        );
    }

    section("Months");
    for month in &report.monthly_reports {
        println!(
            "  {:<16}in {:>12}  out {:>12}  net {:>12}",
            format_month_label(&month.month),
            money.show(month.total_income),
            money.show(month.total_expenses),
            money.show(month.net_income)
        );
    }

    section("Trends");
    println!("  Income growth     {}", format_signed_percentage(report.trends.income_growth));
    println!("  Expense growth    {}", format_signed_percentage(report.trends.expense_growth));
    println!("  Savings growth    {}", format_signed_percentage(report.trends.savings_growth));

    section("Cash flow forecast");
    if report.cash_flow_predictions.is_empty() {
        println!("  {}", "Need at least three months of history.".yellow());
    }
    for prediction in &report.cash_flow_predictions {
        println!(
            "  {:<16}balance {:>12}  confidence {:.0}%",
            format_month_label(&prediction.month),
            money.show(prediction.predicted_balance),
            prediction.confidence * 100.0
        );
    }
    Ok(())
}

fn print_insights(manager: &FinanceManager) {
    let insight = manager.insights();
    let money = Money(manager.config());

    println!("{}", "Spending insights".bold());
    println!("  Average monthly spending  {}", money.show(insight.average_monthly_spending));
    println!("  Savings rate              {}", format_percentage(insight.savings_rate));
    println!("  Overall trend             {:?}", insight.spending_trend);

    section("Top categories");
    for pattern in &insight.top_categories {
        println!(
            "  {:<18}avg {:>12}  x{:<3} {:>6}  {:?}",
            pattern.category,
            money.show(pattern.average_amount),
            pattern.frequency,
            format_percentage(pattern.percentage),
            pattern.trend
        );
    }

    section("Recommendations");
    for rec in &insight.recommendations {
        println!("  [{}] {}", rec.priority, rec.title.green());
        println!("      {}", rec.description);
    }
}

fn print_upcoming(manager: &FinanceManager) {
    let upcoming = manager.upcoming_events();
    let money = Money(manager.config());

    println!("{}", "Upcoming events".bold());
    if upcoming.is_empty() {
        println!("  {}", "Nothing scheduled for the next 7 days.".yellow());
    }
    for occurrence in &upcoming {
        let event = &occurrence.event;
        println!(
            "  {}  {:<24}{:>12}  {:?} ({})",
            occurrence.date,
            event.title,
            money.show(event.amount),
            event.kind,
            event.recurrence.label()
        );
    }
}
