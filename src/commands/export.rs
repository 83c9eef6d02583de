//! The `proceeds export` command.

use crate::args::ExportArgs;
use crate::commands::Out;
use crate::model::TOTAL_ROW;
use crate::store::ProjectStore;
use crate::table::ProceedsTable;
use crate::{utils, Config, Result};
use anyhow::Context;

/// Writes the computed grid as CSV, one row per spending category plus the
/// TOTAL row, to stdout or to `--output`.
///
/// Values are exported unrounded; currency formatting is a display concern
/// and does not belong in data files.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<()>> {
    let project = config.store().load(args.project()).await?;
    let table = ProceedsTable::new(&project);
    let csv = to_csv(&table)?;

    let message = match args.output() {
        Some(path) => {
            utils::write(path, &csv).await?;
            format!("Exported project '{}' to {}", args.project(), path.display())
        }
        None => {
            print!("{csv}");
            format!("Exported project '{}'", args.project())
        }
    };
    Ok(Out::new_message(message))
}

pub(crate) fn to_csv(table: &ProceedsTable) -> Result<String> {
    let column_names: Vec<&str> = table
        .columns()
        .data()
        .iter()
        .map(|c| c.column_name())
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Category".to_string(), "Overall Category".to_string()];
    header.extend(column_names.iter().map(|n| n.to_string()));
    header.push("Total".to_string());
    writer.write_record(&header)?;

    for row in table.rows().non_total() {
        let mut record = vec![
            row.row_name().to_string(),
            row.overall_category().to_string(),
        ];
        record.extend(
            column_names
                .iter()
                .map(|column| table.cell(row.row_name(), column).value().to_string()),
        );
        record.push(table.row_total(row.row_name()).value().to_string());
        writer.write_record(&record)?;
    }

    let mut totals = vec![TOTAL_ROW.to_string(), String::new()];
    let mut grand_total = crate::model::Amount::ZERO;
    for column in &column_names {
        let total = table.column_total(column);
        grand_total += total;
        totals.push(total.value().to_string());
    }
    totals.push(grand_total.value().to_string());
    writer.write_record(&totals)?;

    let bytes = writer
        .into_inner()
        .context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}
