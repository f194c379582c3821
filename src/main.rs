use anyhow::Result;
use code2pdf::{cli::parse_args, run_code2pdf};
use log::LevelFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = parse_args()?;

    let level = match config.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let output_path = config.output_path.clone();
    run_code2pdf(config).await?;

    println!("PDF generated successfully: {}", output_path.display());
    Ok(())
}
