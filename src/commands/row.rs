//! Row commands: add and delete spending-category rows.

use crate::args::{RowAddArgs, RowDeleteArgs};
use crate::commands::Out;
use crate::model::Row;
use crate::store::ProjectStore;
use crate::table::ProceedsTable;
use crate::{Config, Result};
use anyhow::{bail, Context};

/// Adds a row ahead of the TOTAL row and persists the project.
pub async fn row_add(config: Config, args: RowAddArgs) -> Result<Out<Row>> {
    let store = config.store();
    let project = store.load(args.project()).await?;
    let mut table = ProceedsTable::new(&project);

    let Some(row_id) = table.add_row(args.category(), args.name()) else {
        bail!("a row name cannot be blank");
    };
    store.save(&table.to_project_data()).await?;

    let row = table
        .rows()
        .find_by_id(&row_id)
        .context("the added row is missing from the registry")?
        .clone();
    let message = format!(
        "Added row '{}' under '{}' to project '{}'",
        row.row_name(),
        row.overall_category(),
        args.project()
    );
    Ok(Out::new(message, row))
}

/// Deletes the first row matching the given name and persists the project.
///
/// Asking for the TOTAL row is refused without an error, mirroring the
/// table's own behavior; an unknown name is an error.
pub async fn row_delete(config: Config, args: RowDeleteArgs) -> Result<Out<()>> {
    let store = config.store();
    let project = store.load(args.project()).await?;
    let mut table = ProceedsTable::new(&project);

    let Some(row) = table.rows().find_by_name(args.name()) else {
        bail!("no row named '{}' in project '{}'", args.name(), args.project());
    };
    if row.is_total() {
        return Ok(Out::new_message("Refused to delete the TOTAL row"));
    }

    let row_id = row.row_id().to_string();
    table.delete_row(&row_id);
    store.save(&table.to_project_data()).await?;

    Ok(Out::new_message(format!(
        "Deleted row '{}' from project '{}'",
        args.name(),
        args.project()
    )))
}
