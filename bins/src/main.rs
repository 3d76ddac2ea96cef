use std::env;

use chrono::Local;
use dotenv::dotenv;
use ledger::{reports::YearChart, Ledger};
use log::info;
use model::period::Month;
use storage::JsonStore;

const DEFAULT_DATA_PATH: &str = "visitflow.json";

fn main() -> eyre::Result<()> {
    if let Err(err) = dotenv() {
        info!("Failed to load .env file: {}", err);
    }
    pretty_env_logger::init();
    color_eyre::install()?;

    let path = env::var("VISITFLOW_DATA").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
    info!("Opening document {path}");
    let ledger = Ledger::open(JsonStore::new(path))?;

    let today = Local::now().date_naive();
    let month = Month::of(today);
    print_month_report(&ledger, month, today);
    print_year_chart(ledger.year_chart(month.year));

    ledger.flush();
    if let Some(err) = ledger.take_save_error() {
        eyre::bail!("Failed to persist the document: {err}");
    }
    Ok(())
}

fn print_month_report(ledger: &Ledger, month: Month, today: chrono::NaiveDate) {
    let report = ledger.month_report(month);

    println!("Отчет за {}", month.label());
    println!(
        "  Общая прибыль:      {:>12} ₽",
        report.cards.realized_total
    );
    println!("  Чистая прибыль:     {:>12} ₽", report.cards.net_profit);
    println!(
        "  Средняя тренировка: {:>12} ₽",
        report.cards.avg_training_cost
    );
    println!(
        "  Доход (оплаты):     {:>12} ₽",
        report.cards.collected_income
    );
    println!();

    println!("Участники:");
    for row in &report.rows {
        let participant = ledger
            .state()
            .participant(row.id)
            .map(|participant| ledger.standing(participant, today));
        let balance = match participant {
            Some(ledger::standing::Standing::Time {
                active_until,
                expired,
            }) => format!(
                "до {}{}",
                active_until,
                if expired { " (истек)" } else { "" }
            ),
            Some(ledger::standing::Standing::Count { remaining, .. }) => {
                format!("осталось {remaining}")
            }
            None => String::new(),
        };
        println!(
            "  {:<24} {:<22} {:>8} ₽  посещений: {:>2}  реализация: {:>10} ₽  {}",
            row.name, row.block_label, row.cost_per_training, row.attended, row.realized, balance
        );
    }
    println!();
}

fn print_year_chart(chart: YearChart) {
    println!("Динамика за {} год", chart.year);
    for point in &chart.points {
        let marker = if point.net_profit.is_negative() {
            " (убыток)"
        } else {
            ""
        };
        println!(
            "  {:<4} доход: {} ₽   прибыль: {} ₽   посещений: {}{marker}",
            point.label, point.income, point.net_profit, point.attended
        );
    }
    println!(
        "  Итого (прибыльные месяцы): доход {} ₽, прибыль {} ₽",
        chart.positive_income_total, chart.positive_profit_total
    );
}
