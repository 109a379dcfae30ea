use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::analysis::aggregation::{aggregate_by_category, distinct_months, total_for};
use crate::config::MAX_FORECAST_HORIZON_MONTHS;
use crate::domain::common::{month_key, percent_of, shift_month};
use crate::domain::{
    CashFlowPrediction, CategoryAmount, CategoryAnalysis, ChartData, ChartKind, Direction,
    FinancialReport, GrowthTrends, MonthAmount, MonthlyReport, MonthlyTrend, ReportSummary,
    Transaction, TrendPoint,
};
use crate::time::Clock;

/// Months forecast when no horizon is configured.
pub const DEFAULT_FORECAST_HORIZON: u32 = 6;
/// Minimum history, in months, before a cash-flow forecast is produced.
pub const MIN_FORECAST_MONTHS: usize = 3;
const RECENT_MONTHS: usize = 3;
const CATEGORY_TREND_PERCENT: f64 = 10.0;
const MIN_CONFIDENCE: f64 = 0.3;
const CONFIDENCE_DECAY: f64 = 0.1;
const TOP_MONTHLY_CATEGORIES: usize = 5;
const TOP_CHART_CATEGORIES: usize = 10;

pub struct ReportService;

impl ReportService {
    /// Full report over dated transactions inside `[start, end]`.
    pub fn generate_report(
        transactions: &[Transaction],
        start: NaiveDate,
        end: NaiveDate,
        horizon: u32,
        clock: &dyn Clock,
    ) -> FinancialReport {
        let filtered: Vec<Transaction> = transactions
            .iter()
            .filter(|txn| txn.date.is_some_and(|date| date >= start && date <= end))
            .cloned()
            .collect();
        let monthly_reports = Self::monthly_reports(&filtered);
        let trends = Self::calculate_trends(&monthly_reports);
        let cash_flow_predictions = Self::predict_cash_flow(&monthly_reports, horizon, clock);
        tracing::debug!(
            %start,
            %end,
            transactions = filtered.len(),
            months = monthly_reports.len(),
            "generated financial report"
        );
        FinancialReport {
            period: format!("{start} - {end}"),
            start,
            end,
            summary: Self::summary(&filtered),
            category_breakdown: Self::category_breakdown(&filtered),
            monthly_reports,
            trends,
            cash_flow_predictions,
        }
    }

    pub fn summary(transactions: &[Transaction]) -> ReportSummary {
        let total_income = total_for(transactions, Direction::Income);
        let total_expenses = total_for(transactions, Direction::Expense);
        let net_income = total_income - total_expenses;
        let months = distinct_months(transactions).len().max(1) as f64;
        ReportSummary {
            total_income,
            total_expenses,
            net_income,
            savings_rate: percent_of(net_income, total_income),
            average_monthly_income: total_income / months,
            average_monthly_expenses: total_expenses / months,
        }
    }

    /// Every category in the slice, largest total first.
    pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryAnalysis> {
        analyze_categories(transactions.iter())
    }

    /// One report per `YYYY-MM` bucket, ascending. Undated records are skipped.
    pub fn monthly_reports(transactions: &[Transaction]) -> Vec<MonthlyReport> {
        let mut buckets: BTreeMap<String, (i32, Vec<&Transaction>)> = BTreeMap::new();
        for txn in transactions {
            if let Some(date) = txn.date {
                buckets
                    .entry(month_key(date))
                    .or_insert_with(|| (date.year(), Vec::new()))
                    .1
                    .push(txn);
            }
        }
        buckets
            .into_iter()
            .map(|(month, (year, txns))| {
                let total_income: f64 = txns
                    .iter()
                    .filter(|txn| txn.is_income())
                    .map(|txn| txn.amount)
                    .sum();
                let total_expenses: f64 = txns
                    .iter()
                    .filter(|txn| txn.is_expense())
                    .map(|txn| txn.amount)
                    .sum();
                let net_income = total_income - total_expenses;
                let mut top_categories =
                    analyze_categories(txns.iter().copied().filter(|txn| txn.is_expense()));
                top_categories.truncate(TOP_MONTHLY_CATEGORIES);
                MonthlyReport {
                    month,
                    year,
                    total_income,
                    total_expenses,
                    net_income,
                    savings_rate: percent_of(net_income, total_income),
                    top_categories,
                    transaction_count: txns.len(),
                }
            })
            .collect()
    }

    /// Percent change from `earlier` to `later`; zero when `earlier` is not positive.
    pub fn growth_rate(earlier: f64, later: f64) -> f64 {
        if earlier > 0.0 {
            (later - earlier) / earlier * 100.0
        } else {
            0.0
        }
    }

    /// Mean consecutive growth over pairs whose earlier value is positive.
    pub fn average_growth_rate(values: &[f64]) -> f64 {
        let rates: Vec<f64> = values
            .windows(2)
            .filter(|pair| pair[0] > 0.0)
            .map(|pair| Self::growth_rate(pair[0], pair[1]))
            .collect();
        if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        }
    }

    /// Compares the last three months with everything before them.
    pub fn calculate_trends(reports: &[MonthlyReport]) -> GrowthTrends {
        if reports.len() < 2 {
            return GrowthTrends::default();
        }
        let split = reports.len().saturating_sub(RECENT_MONTHS);
        let (older, recent) = reports.split_at(split);
        let averages = |pick: fn(&MonthlyReport) -> f64| {
            let recent_avg = mean(recent.iter().map(pick));
            let older_avg = if older.is_empty() {
                recent_avg
            } else {
                mean(older.iter().map(pick))
            };
            (older_avg, recent_avg)
        };

        let (older_income, recent_income) = averages(|r| r.total_income);
        let (older_expenses, recent_expenses) = averages(|r| r.total_expenses);
        let (older_savings, recent_savings) = averages(|r| r.net_income);
        GrowthTrends {
            income_growth: Self::growth_rate(older_income, recent_income),
            expense_growth: Self::growth_rate(older_expenses, recent_expenses),
            savings_growth: if older_savings != 0.0 {
                (recent_savings - older_savings) / older_savings.abs() * 100.0
            } else {
                0.0
            },
        }
    }

    /// Compounds trailing three-month averages forward `horizon` months.
    ///
    /// Confidence starts at 0.9 and never drops below 0.3. The horizon is
    /// capped at [`MAX_FORECAST_HORIZON_MONTHS`].
    pub fn predict_cash_flow(
        reports: &[MonthlyReport],
        horizon: u32,
        clock: &dyn Clock,
    ) -> Vec<CashFlowPrediction> {
        if reports.len() < MIN_FORECAST_MONTHS {
            return Vec::new();
        }
        let recent = &reports[reports.len() - RECENT_MONTHS..];
        let incomes: Vec<f64> = recent.iter().map(|r| r.total_income).collect();
        let expenses: Vec<f64> = recent.iter().map(|r| r.total_expenses).collect();
        let avg_income = mean(incomes.iter().copied());
        let avg_expenses = mean(expenses.iter().copied());
        let income_rate = Self::average_growth_rate(&incomes);
        let expense_rate = Self::average_growth_rate(&expenses);
        let today = clock.today();
        let horizon = horizon.min(MAX_FORECAST_HORIZON_MONTHS);

        (1..=horizon)
            .map(|step| {
                let exponent = step as i32;
                let predicted_income = avg_income * (1.0 + income_rate / 100.0).powi(exponent);
                let predicted_expenses =
                    avg_expenses * (1.0 + expense_rate / 100.0).powi(exponent);
                CashFlowPrediction {
                    month: month_key(shift_month(today, exponent)),
                    predicted_income,
                    predicted_expenses,
                    predicted_balance: predicted_income - predicted_expenses,
                    confidence: (1.0 - CONFIDENCE_DECAY * step as f64).max(MIN_CONFIDENCE),
                }
            })
            .collect()
    }

    /// Presentation series over the whole history.
    pub fn chart_data(transactions: &[Transaction], kind: ChartKind) -> ChartData {
        match kind {
            ChartKind::Income => ChartData::Income(monthly_series(transactions, Direction::Income)),
            ChartKind::Expenses => {
                ChartData::Expenses(monthly_series(transactions, Direction::Expense))
            }
            ChartKind::Categories => {
                let mut groups = aggregate_by_category(transactions, Transaction::is_expense);
                groups.sort_by(|a, b| b.total.total_cmp(&a.total));
                ChartData::Categories(
                    groups
                        .into_iter()
                        .take(TOP_CHART_CATEGORIES)
                        .map(|group| CategoryAmount {
                            category: group.label,
                            amount: group.total,
                        })
                        .collect(),
                )
            }
            ChartKind::Trends => ChartData::Trends(
                Self::monthly_reports(transactions)
                    .into_iter()
                    .map(|report| TrendPoint {
                        month: report.month,
                        income: report.total_income,
                        expenses: report.total_expenses,
                        savings: report.net_income,
                        savings_rate: report.savings_rate,
                    })
                    .collect(),
            ),
        }
    }
}

fn analyze_categories<'a>(
    transactions: impl Iterator<Item = &'a Transaction> + Clone,
) -> Vec<CategoryAnalysis> {
    let grand_total: f64 = transactions.clone().map(|txn| txn.amount).sum();
    let mut analyses: Vec<CategoryAnalysis> = aggregate_by_category(transactions, |_| true)
        .into_iter()
        .map(|group| {
            let monthly_data = group.monthly_amounts();
            CategoryAnalysis {
                trend: monthly_trend(&monthly_data),
                average_amount: group.average(),
                percentage: percent_of(group.total, grand_total),
                total_amount: group.total,
                transaction_count: group.count,
                category: group.label,
                monthly_data,
            }
        })
        .collect();
    analyses.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
    analyses
}

/// Up or down when the last three months differ from the older ones by more than 10%.
fn monthly_trend(monthly: &[MonthAmount]) -> MonthlyTrend {
    if monthly.len() < 2 {
        return MonthlyTrend::Stable;
    }
    let split = monthly.len().saturating_sub(RECENT_MONTHS);
    let (older, recent) = monthly.split_at(split);
    if older.is_empty() {
        return MonthlyTrend::Stable;
    }
    let older_avg = mean(older.iter().map(|m| m.amount));
    let change = ReportService::growth_rate(older_avg, mean(recent.iter().map(|m| m.amount)));
    if change > CATEGORY_TREND_PERCENT {
        MonthlyTrend::Up
    } else if change < -CATEGORY_TREND_PERCENT {
        MonthlyTrend::Down
    } else {
        MonthlyTrend::Stable
    }
}

fn monthly_series(transactions: &[Transaction], direction: Direction) -> Vec<MonthAmount> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for txn in transactions.iter().filter(|txn| txn.direction == direction) {
        if let Some(month) = txn.month_key() {
            *months.entry(month).or_insert(0.0) += txn.amount;
        }
    }
    months
        .into_iter()
        .map(|(month, amount)| MonthAmount { month, amount })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
