//! The `proceeds show` command.

use crate::args::ShowArgs;
use crate::commands::Out;
use crate::model::{Amount, TOTAL_ROW};
use crate::store::ProjectStore;
use crate::table::ProceedsTable;
use crate::{Config, Result};

/// Loads a project, builds its table, and prints it as a markdown table with
/// row totals, column totals, loan payment lines, and category subtotals.
pub async fn show(config: Config, args: ShowArgs) -> Result<Out<()>> {
    let project = config.store().load(args.project()).await?;
    let table = ProceedsTable::new(&project);

    println!("{}", render(&table));

    let message = format!(
        "Project '{}' ({}): {} rows x {} columns",
        table.project_name(),
        table.project_id(),
        table.rows().len(),
        table.columns().len()
    );
    Ok(Out::new_message(message))
}

/// Renders the table in the display contract: whole-dollar US currency,
/// computed from unrounded values.
pub(crate) fn render(table: &ProceedsTable) -> String {
    let mut lines: Vec<String> = Vec::new();
    let title = if table.project_name().is_empty() {
        table.project_id()
    } else {
        table.project_name()
    };
    lines.push(format!("# Use of Proceeds: {title}"));
    lines.push(String::new());

    let column_names: Vec<&str> = table
        .columns()
        .data()
        .iter()
        .map(|c| c.column_name())
        .collect();

    let mut header = vec!["Category".to_string(), "Overall Category".to_string()];
    header.extend(column_names.iter().map(|n| n.to_string()));
    header.push("Total".to_string());
    lines.push(markdown_row(&header));
    lines.push(markdown_separator(header.len()));

    for row in table.rows().non_total() {
        let mut cells = vec![
            row.row_name().to_string(),
            row.overall_category().to_string(),
        ];
        cells.extend(
            column_names
                .iter()
                .map(|column| table.cell(row.row_name(), column).to_string()),
        );
        cells.push(table.row_total(row.row_name()).to_string());
        lines.push(markdown_row(&cells));
    }

    // The TOTAL row is computed, never read from cells.
    let mut totals = vec![TOTAL_ROW.to_string(), String::new()];
    totals.extend(
        column_names
            .iter()
            .map(|column| table.column_total(column).to_string()),
    );
    let grand_total = column_names
        .iter()
        .map(|column| table.column_total(column))
        .sum::<Amount>();
    totals.push(grand_total.to_string());
    lines.push(markdown_row(&totals));

    let loan_columns: Vec<_> = table
        .columns()
        .data()
        .iter()
        .filter(|c| c.is_loan() && c.monthly_payment().is_some())
        .collect();
    if !loan_columns.is_empty() {
        lines.push(String::new());
        lines.push("Loan payments:".to_string());
        for column in loan_columns {
            let rate = column.interest_rate().unwrap_or_default();
            let months = column.amortization_months().unwrap_or_default();
            let monthly = column.monthly_payment().unwrap_or_default();
            let annual = column.annual_payment().unwrap_or_default();
            lines.push(format!(
                "- {}: {rate}% over {months} months, {monthly}/mo, {annual}/yr",
                column.column_name()
            ));
        }
    }

    let categories = table.categories();
    if !categories.is_empty() {
        lines.push(String::new());
        lines.push("Category subtotals:".to_string());
        let mut header = vec!["Overall Category".to_string()];
        header.extend(column_names.iter().map(|n| n.to_string()));
        lines.push(markdown_row(&header));
        lines.push(markdown_separator(header.len()));
        for category in categories {
            let mut cells = vec![category.to_string()];
            cells.extend(
                column_names
                    .iter()
                    .map(|column| table.category_total(category, column).to_string()),
            );
            lines.push(markdown_row(&cells));
        }
    }

    lines.join("\n")
}

fn markdown_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn markdown_separator(width: usize) -> String {
    format!("|{}", " --- |".repeat(width))
}
