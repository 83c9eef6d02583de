//! The `proceeds new` command.

use crate::args::NewArgs;
use crate::commands::Out;
use crate::model::{Loan, LoanSpec, ProjectData};
use crate::store::ProjectStore;
use crate::table::ProceedsTable;
use crate::{utils, Config, Result};
use anyhow::{bail, Context};

/// Creates a new project file with the default row taxonomy, the default
/// funding-source columns, and one loan column per loan.
///
/// Loans can be given on the command line or in a JSON file; the file may be
/// in the current shape or the legacy `loan_types` shape. The project is
/// written through the table orchestrator so that the file already carries
/// seeded rows, columns, and derived payment figures.
pub async fn new_project(config: Config, args: NewArgs) -> Result<Out<ProjectData>> {
    let store = config.store();
    if store.exists(args.project()) {
        bail!(
            "project '{}' already exists at {}",
            args.project(),
            store.path(args.project()).display()
        );
    }

    let mut loans: Vec<LoanSpec> = args
        .loans()
        .iter()
        .map(|loan| {
            LoanSpec::from(&Loan::new(
                loan.loan_type(),
                loan.amount(),
                loan.rate(),
                loan.term_years(),
            ))
        })
        .collect();
    if let Some(path) = args.loans_file() {
        let from_file: Vec<LoanSpec> = utils::deserialize(path)
            .await
            .context("Unable to read the loans file")?;
        loans.extend(from_file);
    }

    let seed = ProjectData::new(args.project(), args.name(), loans);
    let table = ProceedsTable::new(&seed);
    let project = table.to_project_data();
    store.save(&project).await?;

    let message = format!(
        "Created project '{}' ({}) with {} loan{}",
        args.name(),
        args.project(),
        table.loans().len(),
        if table.loans().len() == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Wrapper {
        #[clap(flatten)]
        args: NewArgs,
    }

    fn parse(argv: &[&str]) -> NewArgs {
        let mut full = vec!["wrapper"];
        full.extend_from_slice(argv);
        Wrapper::parse_from(full).args
    }

    #[tokio::test]
    async fn test_new_project_seeds_rows_and_columns() {
        let env = TestEnv::new().await;
        let args = parse(&[
            "--project",
            "proj-1",
            "--name",
            "Main Street Bakery",
            "--loan",
            "SBA 7(a):500000:6.0:10",
        ]);
        let out = new_project(env.config(), args).await.unwrap();
        let project = out.structure().unwrap();

        assert_eq!(project.project_id(), "proj-1");
        assert!(project.rows().last().unwrap().is_total());
        // Two defaults plus one loan column.
        assert_eq!(project.columns().len(), 3);
        assert!(project.columns()[2].is_loan());

        let loaded = env.config().store().load("proj-1").await.unwrap();
        assert_eq!(&loaded, project);
    }

    #[tokio::test]
    async fn test_new_project_refuses_duplicate_id() {
        let env = TestEnv::new().await;
        let args = parse(&["--project", "proj-1", "--name", "First"]);
        new_project(env.config(), args).await.unwrap();

        let again = parse(&["--project", "proj-1", "--name", "Second"]);
        let err = new_project(env.config(), again).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_new_project_reads_legacy_loans_file() {
        let env = TestEnv::new().await;
        let loans_path = env.config().root().join("loans.json");
        utils::write(
            &loans_path,
            r#"[{"type": "Conventional", "amount": 250000, "rate": 7.0, "term": 20}, "Seller Note"]"#,
        )
        .await
        .unwrap();

        let args = parse(&[
            "--project",
            "proj-2",
            "--name",
            "Legacy",
            "--loans-file",
            loans_path.to_str().unwrap(),
        ]);
        let out = new_project(env.config(), args).await.unwrap();
        let project = out.structure().unwrap();
        // Two defaults plus two loan columns.
        assert_eq!(project.columns().len(), 4);
        assert_eq!(project.columns()[2].column_name(), "Conventional");
        assert_eq!(project.columns()[3].column_name(), "Seller Note");
    }
}
