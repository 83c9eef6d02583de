//! Column commands: add and delete funding-source columns.

use crate::args::{ColumnAddArgs, ColumnDeleteArgs};
use crate::commands::Out;
use crate::model::{Column, NewColumn};
use crate::store::ProjectStore;
use crate::table::ProceedsTable;
use crate::{Config, Result};
use anyhow::bail;

/// Adds a funding-source column and persists the project. Giving both a rate
/// and a term makes it a loan column; its payments are derived as soon as
/// dollars are allocated to it.
pub async fn column_add(config: Config, args: ColumnAddArgs) -> Result<Out<Column>> {
    let store = config.store();
    let project = store.load(args.project()).await?;
    let mut table = ProceedsTable::new(&project);

    let is_loan = args.rate().is_some() && args.term().is_some();
    let column_id = table.add_column(NewColumn {
        column_name: args.name().map(str::to_string),
        is_loan,
        interest_rate: args.rate(),
        term_years: args.term(),
        amortization_months: args.term().map(|years| years * 12),
    });
    store.save(&table.to_project_data()).await?;

    let column = table
        .columns()
        .find_by_id(&column_id)
        .cloned()
        .unwrap_or_default();
    let message = format!(
        "Added {} column '{}' to project '{}'",
        if is_loan { "loan" } else { "funding" },
        column.column_name(),
        args.project()
    );
    Ok(Out::new(message, column))
}

/// Deletes the column with the given name and persists the project.
///
/// The registry deletes unconditionally; protecting the first column is this
/// layer's policy, so the table always keeps at least its leading
/// funding-source column (the landing spot for legacy records).
pub async fn column_delete(config: Config, args: ColumnDeleteArgs) -> Result<Out<()>> {
    let store = config.store();
    let project = store.load(args.project()).await?;
    let mut table = ProceedsTable::new(&project);

    if table.columns().first_column_name() == Some(args.name()) {
        bail!(
            "the first column '{}' cannot be deleted",
            args.name()
        );
    }
    let Some(column) = table.columns().find_by_name(args.name()) else {
        bail!(
            "no column named '{}' in project '{}'",
            args.name(),
            args.project()
        );
    };

    let column_id = column.column_id().to_string();
    table.delete_column(&column_id);
    store.save(&table.to_project_data()).await?;

    Ok(Out::new_message(format!(
        "Deleted column '{}' from project '{}'",
        args.name(),
        args.project()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, BORROWER_EQUITY};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_column_add_loan_column() {
        let env = TestEnv::new().await;
        env.seed_project("proj-1").await;

        let args = ColumnAddArgs::new(
            "proj-1",
            Some("Seller Note".to_string()),
            Some(8.0),
            Some(5),
        );
        let out = column_add(env.config(), args).await.unwrap();
        let column = out.structure().unwrap();
        assert!(column.is_loan());
        assert_eq!(column.amortization_months(), Some(60));

        let loaded = env.config().store().load("proj-1").await.unwrap();
        assert!(loaded.columns().iter().any(|c| c.column_name() == "Seller Note"));
    }

    #[tokio::test]
    async fn test_column_add_defaults_name() {
        let env = TestEnv::new().await;
        env.seed_project("proj-1").await;

        let args = ColumnAddArgs::new("proj-1", None, None, None);
        let out = column_add(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap().column_name(), "New Column");
        assert!(!out.structure().unwrap().is_loan());
    }

    #[tokio::test]
    async fn test_column_delete() {
        let env = TestEnv::new().await;
        env.seed_project("proj-1").await;

        let args = ColumnDeleteArgs::new("proj-1", "SBA 7(a)");
        column_delete(env.config(), args).await.unwrap();

        let loaded = env.config().store().load("proj-1").await.unwrap();
        assert!(!loaded.columns().iter().any(|c| c.column_name() == "SBA 7(a)"));
        // Records for the deleted column stay in the file; the grid just no
        // longer shows them.
        let table = ProceedsTable::new(&loaded);
        assert!(table.cell("Working Capital", "SBA 7(a)").is_zero());
        assert_eq!(
            table.cell("Inventory", BORROWER_EQUITY),
            Amount::lenient("40000")
        );
    }

    #[tokio::test]
    async fn test_column_delete_first_is_refused() {
        let env = TestEnv::new().await;
        env.seed_project("proj-1").await;

        let args = ColumnDeleteArgs::new("proj-1", BORROWER_EQUITY);
        let err = column_delete(env.config(), args).await.unwrap_err();
        assert!(err.to_string().contains("cannot be deleted"));
    }

    #[tokio::test]
    async fn test_column_delete_unknown_is_an_error() {
        let env = TestEnv::new().await;
        env.seed_project("proj-1").await;
        let args = ColumnDeleteArgs::new("proj-1", "No Such Column");
        assert!(column_delete(env.config(), args).await.is_err());
    }
}
