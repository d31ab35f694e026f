use anyhow::{bail, Context, Result};
use future_works::{
    cli::{Cli, Commands},
    config::BuildConfig,
    populate::{build_geopackage, Populated},
    report::Summary,
    schema::{build_order, get_code_list, CODE_LISTS},
    writer::{create_geopackage, GeoPackageWriter},
};
use std::path::Path;
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Create { output } => {
            let start = Instant::now();
            create_geopackage(&output)
                .with_context(|| format!("Failed to create {:?}", output))?
                .finalize()?;

            println!(
                "\nCreated {:?} in {:.1}s",
                output,
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Populate { geopackage, sample } => {
            let mut config = load_config(&cli.config)?;
            sample.apply(&mut config);

            let start = Instant::now();
            let mut writer = GeoPackageWriter::open(&geopackage)
                .with_context(|| format!("Failed to open {:?}", geopackage))?;
            let populated = config
                .populator()
                .populate(&mut writer)
                .with_context(|| format!("Failed to populate {:?}", geopackage))?;
            writer.finalize()?;
            print_populated(&geopackage, &populated, start);
        }

        Commands::Build { output, sample } => {
            let mut config = load_config(&cli.config)?;
            sample.apply(&mut config);

            let start = Instant::now();
            let populated = build_geopackage(&output, &mut config.populator())
                .with_context(|| format!("Failed to build {:?}", output))?;
            print_populated(&output, &populated, start);
        }

        Commands::Summary { geopackage, json } => {
            let writer = GeoPackageWriter::open(&geopackage)
                .with_context(|| format!("Failed to open {:?}", geopackage))?;
            let summary = Summary::collect(writer.connection())
                .with_context(|| format!("Failed to summarise {:?}", geopackage))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("GeoPackage: {:?}\n", geopackage);
                print!("{}", summary);
            }
        }

        Commands::ListTables => {
            println!("Tables in build order:\n");
            for table in build_order()? {
                println!("  {:<44} {:?}", table.name, table.kind);
            }
        }

        Commands::ListCodes { table } => {
            let lists: Vec<_> = match table.as_deref() {
                Some(name) => match get_code_list(name) {
                    Some(def) => vec![def],
                    None => bail!("Unknown code list: {}", name),
                },
                None => CODE_LISTS.iter().collect(),
            };

            for def in lists {
                println!("{}:", def.name());
                for row in (def.rows)() {
                    println!("  {:<12} {}", row.code, row.label);
                }
                println!();
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<BuildConfig> {
    BuildConfig::load(path).with_context(|| format!("Failed to read settings from {:?}", path))
}

fn print_populated(path: &Path, populated: &Populated, start: Instant) {
    println!(
        "\nPopulated {:?} with {} organisations, {} contacts, {} programmes and {} network links in {:.1}s",
        path,
        populated.organisations,
        populated.contacts,
        populated.programmes,
        populated.links,
        start.elapsed().as_secs_f64()
    );
}
