//! The `proceeds set` command.

use crate::args::SetArgs;
use crate::commands::Out;
use crate::model::ProceedsRecord;
use crate::store::ProjectStore;
use crate::table::ProceedsTable;
use crate::{Config, Result};
use std::sync::Arc;

/// Applies one or more cell assignments through an edit session and saves the
/// project.
///
/// Values are normalized leniently (unparseable input becomes 0, matching
/// what the table does with any hand-typed cell). Assignments against the
/// TOTAL row are refused by the session and simply do not count. A failed
/// save leaves the project file untouched apart from its pre-save backup.
pub async fn set(config: Config, args: SetArgs) -> Result<Out<Vec<ProceedsRecord>>> {
    let store = Arc::new(config.store());
    let project = store.load(args.project()).await?;
    let mut table = ProceedsTable::new(&project).with_store(store);

    table.edit();
    for cell in args.cells() {
        table.set_cell(cell.key().row(), cell.key().column(), cell.raw_value());
    }
    let count = table.save().await?;

    let message = format!(
        "Updated {} cell{} in project '{}'",
        count,
        if count == 1 { "" } else { "s" },
        args.project()
    );
    Ok(Out::new(message, table.records().to_vec()))
}
