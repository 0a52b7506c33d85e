mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ga_core::basis::{binomial, ids_of_grade};
use ga_core::{
    FloatProcessor, MAX_SYMBOLIC_DIMENSION, OrthonormalProcessor, Polynomial, PolynomialProcessor,
    ProductKind, Storage, blade_name, export_json, format_storage, grade, id_to_index,
    import_json, parse_storage,
};
use serde_json::json;

use crate::config::Config;

/// Listing every blade beyond this count needs `--grade`.
const MAX_LISTED_BLADES: u64 = 1 << 12;

#[derive(Parser)]
#[command(name = "ga", about = "Geometric algebra calculator")]
struct Cli {
    /// TOML algebra description (defaults to $GA_CONFIG, then 3D Euclidean)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configured algebra
    Info,

    /// List basis blades with their IDs and grade indices
    Blades {
        /// Only blades of this grade
        #[arg(long)]
        grade: Option<u32>,
    },

    /// Evaluate a bilinear product of two multivectors
    Product {
        /// sp, op, gp, lcp, rcp, fdp, hip, cp or acp
        kind: String,
        /// Left operand, e.g. "1=2, e1^e2=-0.5"
        a: String,
        /// Right operand
        b: String,
    },

    /// Apply the configured outermorphism
    Apply {
        /// Multivector to map
        mv: String,
    },

    /// Product of two generic multivectors with symbolic coefficients
    Symbolic {
        kind: String,
        /// Restrict the left operand to one grade
        #[arg(long)]
        grade_a: Option<u32>,
        /// Restrict the right operand to one grade
        #[arg(long)]
        grade_b: Option<u32>,
    },

    /// Print a multivector stored in the JSON wire format
    Show {
        path: PathBuf,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("GA_CONFIG").ok().map(PathBuf::from));
    Config::load(path.as_deref())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Info => cmd_info(&cli),
        Commands::Blades { grade } => cmd_blades(&cli, *grade),
        Commands::Product { kind, a, b } => cmd_product(&cli, kind, a, b),
        Commands::Apply { mv } => cmd_apply(&cli, mv),
        Commands::Symbolic {
            kind,
            grade_a,
            grade_b,
        } => cmd_symbolic(&cli, kind, *grade_a, *grade_b),
        Commands::Show { path } => cmd_show(&cli, path),
    }
}

fn cmd_info(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let signature = config.signature()?;
    let n = signature.dimension();
    let per_grade: Vec<u64> = (0..=n).map(|k| binomial(n, k)).collect();
    let squares: Vec<i32> = signature.into();

    if cli.json {
        let value = json!({
            "signature": signature.to_string(),
            "dimension": n,
            "squares": squares,
            "blades": signature.blade_count().to_string(),
            "blades_per_grade": per_grade,
            "strategy": config.algebra.strategy,
            "frame": config.frame.is_some(),
            "outermorphism": config.outermorphism.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let squares: Vec<String> = squares.iter().map(i32::to_string).collect();
    println!("signature:  {signature}");
    println!("dimension:  {n}");
    println!("squares:    [{}]", squares.join(", "));
    println!("blades:     {}", signature.blade_count());
    println!("strategy:   {:?}", config.algebra.strategy);
    println!("frame:      {}", yes_no(config.frame.is_some()));
    println!("map:        {}", yes_no(config.outermorphism.is_some()));
    for (k, count) in per_grade.iter().enumerate() {
        println!("grade {k:<2}    {count}");
    }
    Ok(())
}

fn cmd_blades(cli: &Cli, only: Option<u32>) -> Result<()> {
    let signature = load_config(cli)?.signature()?;
    let n = signature.dimension();
    let grades: Vec<u32> = match only {
        Some(k) if k > n => bail!("grade {k} exceeds dimension {n}"),
        Some(k) => vec![k],
        None => (0..=n).collect(),
    };
    let total: u128 = grades.iter().map(|&k| binomial(n, k) as u128).sum();
    if total > MAX_LISTED_BLADES as u128 {
        bail!("{total} blades to list; narrow the listing with --grade or a smaller algebra");
    }

    let ids = grades.iter().flat_map(|&k| ids_of_grade(n, k));
    if cli.json {
        let rows: Vec<_> = ids
            .map(|id| {
                json!({
                    "id": id,
                    "grade": grade(id),
                    "index": id_to_index(id),
                    "name": blade_name(id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:>12}  {:>5}  {:>12}  name", "id", "grade", "index");
    for id in ids {
        println!(
            "{id:>12}  {:>5}  {:>12}  {}",
            grade(id),
            id_to_index(id),
            blade_name(id)
        );
    }
    Ok(())
}

fn cmd_product(cli: &Cli, kind: &str, a: &str, b: &str) -> Result<()> {
    let config = load_config(cli)?;
    let kind: ProductKind = kind.parse().context("invalid product kind")?;
    let ortho = config.orthonormal()?;
    let n = ortho.dimension();
    let p = ortho.scalar_processor();
    let a = parse_storage(p, n, a).context("failed to parse left operand")?;
    let b = parse_storage(p, n, b).context("failed to parse right operand")?;

    let result = match config.change_of_basis()? {
        Some(frame) => {
            tracing::debug!(%kind, "product in configured frame");
            frame.product(kind, &a, &b)
        }
        None => ortho.product(kind, &a, &b),
    }
    .with_context(|| format!("failed to evaluate {kind}"))?;

    print_storage(cli, &ortho, &result)
}

fn cmd_apply(cli: &Cli, mv: &str) -> Result<()> {
    let config = load_config(cli)?;
    let Some(map) = config.outermorphism()? else {
        bail!("config has no [outermorphism] section");
    };
    let ortho = config.orthonormal()?;
    let input = parse_storage(ortho.scalar_processor(), ortho.dimension(), mv)
        .context("failed to parse multivector")?;
    let result = ortho.map(&map, &input).context("failed to apply outermorphism")?;
    print_storage(cli, &ortho, &result)
}

fn cmd_symbolic(
    cli: &Cli,
    kind: &str,
    grade_a: Option<u32>,
    grade_b: Option<u32>,
) -> Result<()> {
    let config = load_config(cli)?;
    let kind: ProductKind = kind.parse().context("invalid product kind")?;
    let signature = config.signature()?;
    let n = signature.dimension();
    if n > MAX_SYMBOLIC_DIMENSION {
        bail!("symbolic products are limited to dimension {MAX_SYMBOLIC_DIMENSION}, got {n}");
    }

    let ga = OrthonormalProcessor::new(signature, PolynomialProcessor::new())
        .with_strategy(config.algebra.strategy);
    let a = generic_multivector("a", n, grade_a)?;
    let b = generic_multivector("b", n, grade_b)?;
    let result = ga.product(kind, &a, &b)?;

    let mut terms: Vec<(u64, &Polynomial)> = result.terms().collect();
    terms.sort_by_key(|&(id, _)| (grade(id), id));

    if cli.json {
        let rows: Vec<_> = terms
            .iter()
            .map(|(id, value)| {
                json!({
                    "id": id,
                    "blade": blade_name(*id),
                    "value": value.to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if terms.is_empty() {
        println!("0");
    }
    for (id, value) in terms {
        println!("{}: {value}", blade_name(id));
    }
    Ok(())
}

fn cmd_show(cli: &Cli, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let (signature, storage) = import_json(&content).context("failed to import multivector")?;
    let ortho = OrthonormalProcessor::new(signature, FloatProcessor::default());
    print_storage(cli, &ortho, &storage)
}

/// Every blade of the chosen grade (or all grades), coefficient `{prefix}{id}`.
fn generic_multivector(prefix: &str, n: u32, only: Option<u32>) -> Result<Storage<Polynomial>> {
    let grades: Vec<u32> = match only {
        Some(k) if k > n => bail!("grade {k} exceeds dimension {n}"),
        Some(k) => vec![k],
        None => (0..=n).collect(),
    };
    let terms = grades
        .iter()
        .flat_map(|&k| ids_of_grade(n, k))
        .map(|id| (id, Polynomial::atom(&format!("{prefix}{id}"))));
    Ok(Storage::sparse(terms))
}

fn print_storage(
    cli: &Cli,
    ortho: &OrthonormalProcessor<FloatProcessor>,
    storage: &Storage<f64>,
) -> Result<()> {
    if cli.json {
        println!("{}", export_json(ortho.signature(), storage)?);
    } else {
        println!("{}", format_storage(ortho.scalar_processor(), storage));
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
