//! These structs provide the CLI interface for the proceeds CLI.

use crate::model::Amount;
use crate::table::CellKey;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// proceeds: A command-line tool for building Use of Proceeds tables.
///
/// The purpose of this program is to manage the Use of Proceeds table for a
/// business-loan project: the grid mapping funding sources (loans, borrower
/// equity) against spending categories (working capital, construction, and
/// so on). Projects are stored as JSON files in a local data directory and
/// edited through subcommands; loan columns carry their rate and term, and
/// the implied monthly payment is recomputed whenever allocations change.
///
/// Start with `proceeds init`, create a project with `proceeds new`, then
/// use `show`, `set`, `row`, `column` and `export`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the data
    /// directory is $HOME/proceeds; pass --proceeds-home (or set
    /// PROCEEDS_HOME) to put it somewhere else.
    Init,
    /// Create a new project file.
    New(NewArgs),
    /// Print a project's Use of Proceeds table with totals and payments.
    Show(ShowArgs),
    /// Stage one or more cell edits and save the project.
    Set(SetArgs),
    /// Add or delete spending-category rows.
    Row(RowArgs),
    /// Add or delete funding-source columns.
    Column(ColumnArgs),
    /// Export the computed table as CSV.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate
    /// for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where proceeds data and configuration is held.
    /// Defaults to ~/proceeds
    #[arg(long, env = "PROCEEDS_HOME", default_value_t = default_proceeds_home())]
    proceeds_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, proceeds_home: PathBuf) -> Self {
        Self {
            log_level,
            proceeds_home: proceeds_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn proceeds_home(&self) -> &DisplayPath {
        &self.proceeds_home
    }
}

/// Args for the `proceeds new` command.
#[derive(Debug, Parser, Clone)]
pub struct NewArgs {
    /// The project id, used as the file name under projects/.
    #[arg(long)]
    project: String,

    /// The human-readable project name.
    #[arg(long)]
    name: String,

    /// A loan to fund the project, as "type:amount[:rate:term]", e.g.
    /// "SBA 7(a):500000:6.5:10". May be repeated.
    #[arg(long = "loan")]
    loans: Vec<LoanArg>,

    /// A JSON file containing an array of loans, in either the current
    /// shape or the legacy loan_types shape.
    #[arg(long)]
    loans_file: Option<PathBuf>,
}

impl NewArgs {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn loans(&self) -> &[LoanArg] {
        &self.loans
    }

    pub fn loans_file(&self) -> Option<&Path> {
        self.loans_file.as_deref()
    }
}

/// A loan given on the command line as "type:amount[:rate:term]".
#[derive(Debug, Clone, PartialEq)]
pub struct LoanArg {
    loan_type: String,
    amount: Amount,
    rate: Option<f64>,
    term_years: Option<u32>,
}

impl LoanArg {
    pub fn loan_type(&self) -> &str {
        &self.loan_type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    pub fn term_years(&self) -> Option<u32> {
        self.term_years
    }
}

impl FromStr for LoanArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 4 {
            anyhow::bail!("a loan must be in format 'type:amount[:rate:term]', got: {s}");
        }
        if parts[0].is_empty() {
            anyhow::bail!("a loan must name its type, got: {s}");
        }
        let amount = Amount::lenient(parts[1]);
        let rate = parts
            .get(2)
            .map(|p| {
                p.parse::<f64>()
                    .map_err(|e| anyhow::anyhow!("Invalid loan rate: {e}"))
            })
            .transpose()?;
        let term_years = parts
            .get(3)
            .map(|p| {
                p.parse::<u32>()
                    .map_err(|e| anyhow::anyhow!("Invalid loan term: {e}"))
            })
            .transpose()?;
        Ok(LoanArg {
            loan_type: parts[0].to_string(),
            amount,
            rate,
            term_years,
        })
    }
}

/// Args for the `proceeds show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The project id.
    #[arg(long)]
    project: String,
}

impl ShowArgs {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

/// Args for the `proceeds set` command.
#[derive(Debug, Parser, Clone)]
pub struct SetArgs {
    /// The project id.
    #[arg(long)]
    project: String,

    /// A cell assignment as "row:column=value", e.g.
    /// "Working Capital:SBA 7(a)=100000". May be repeated. Values are
    /// normalized leniently; unparseable input becomes 0.
    #[arg(long = "cell", required = true)]
    cells: Vec<CellAssignment>,
}

impl SetArgs {
    pub fn new(project: impl Into<String>, cells: Vec<CellAssignment>) -> Self {
        Self {
            project: project.into(),
            cells,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn cells(&self) -> &[CellAssignment] {
        &self.cells
    }
}

/// One "row:column=value" assignment from the command line. The value is
/// kept raw; normalization happens in the edit session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CellAssignment {
    key: CellKey,
    raw_value: String,
}

impl CellAssignment {
    pub fn key(&self) -> &CellKey {
        &self.key
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }
}

impl FromStr for CellAssignment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The value is everything after the last '='; row and column names
        // do not contain '='.
        let Some((key, raw_value)) = s.rsplit_once('=') else {
            anyhow::bail!("a cell must be in format 'row:column=value', got: {s}");
        };
        Ok(CellAssignment {
            key: key.parse()?,
            raw_value: raw_value.trim().to_string(),
        })
    }
}

/// Args for the `proceeds row` command.
#[derive(Debug, Parser, Clone)]
pub struct RowArgs {
    #[command(subcommand)]
    command: RowSubcommand,
}

impl RowArgs {
    pub fn command(&self) -> &RowSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum RowSubcommand {
    /// Add a spending-category row ahead of the TOTAL row.
    Add(RowAddArgs),
    /// Delete a spending-category row. The TOTAL row cannot be deleted.
    Delete(RowDeleteArgs),
}

/// Args for the `proceeds row add` command.
#[derive(Debug, Parser, Clone)]
pub struct RowAddArgs {
    /// The project id.
    #[arg(long)]
    project: String,

    /// The overall category the row belongs to, e.g. "Working Capital".
    #[arg(long)]
    category: String,

    /// The row name, e.g. "Marketing".
    #[arg(long)]
    name: String,
}

impl RowAddArgs {
    pub fn new(
        project: impl Into<String>,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            category: category.into(),
            name: name.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Args for the `proceeds row delete` command.
#[derive(Debug, Parser, Clone)]
pub struct RowDeleteArgs {
    /// The project id.
    #[arg(long)]
    project: String,

    /// The row name. If duplicate names exist, the first match is deleted.
    #[arg(long)]
    name: String,
}

impl RowDeleteArgs {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Args for the `proceeds column` command.
#[derive(Debug, Parser, Clone)]
pub struct ColumnArgs {
    #[command(subcommand)]
    command: ColumnSubcommand,
}

impl ColumnArgs {
    pub fn command(&self) -> &ColumnSubcommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ColumnSubcommand {
    /// Add a funding-source column.
    Add(ColumnAddArgs),
    /// Delete a funding-source column.
    Delete(ColumnDeleteArgs),
}

/// Args for the `proceeds column add` command.
#[derive(Debug, Parser, Clone)]
pub struct ColumnAddArgs {
    /// The project id.
    #[arg(long)]
    project: String,

    /// The column name. Defaults to "New Column".
    #[arg(long)]
    name: Option<String>,

    /// Annual interest rate in percent, e.g. 6.5. Giving both a rate and a
    /// term makes this a loan column with derived payments.
    #[arg(long)]
    rate: Option<f64>,

    /// Loan term in years.
    #[arg(long)]
    term: Option<u32>,
}

impl ColumnAddArgs {
    pub fn new(
        project: impl Into<String>,
        name: Option<String>,
        rate: Option<f64>,
        term: Option<u32>,
    ) -> Self {
        Self {
            project: project.into(),
            name,
            rate,
            term,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    pub fn term(&self) -> Option<u32> {
        self.term
    }
}

/// Args for the `proceeds column delete` command.
#[derive(Debug, Parser, Clone)]
pub struct ColumnDeleteArgs {
    /// The project id.
    #[arg(long)]
    project: String,

    /// The column name.
    #[arg(long)]
    name: String,
}

impl ColumnDeleteArgs {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Args for the `proceeds export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The project id.
    #[arg(long)]
    project: String,

    /// Write the CSV to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(project: impl Into<String>, output: Option<PathBuf>) -> Self {
        Self {
            project: project.into(),
            output,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

fn default_proceeds_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("proceeds"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --proceeds-home or PROCEEDS_HOME instead of relying on the \
                default proceeds home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("proceeds")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
