use clap::Parser;
use service_search::cli::{Cli, Commands, CompileOptions, execute_compile, execute_validate};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    service_search::tracing::init(cli.log_format);

    let output = match cli.command {
        Commands::Compile {
            request,
            taxonomy,
            collections,
            config,
            pretty,
            fingerprint,
        } => {
            tracing::info!("Compiling search request from {}", request.display());
            execute_compile(&CompileOptions {
                request,
                taxonomy,
                collections,
                config,
                pretty,
                fingerprint,
            })
            .inspect_err(|e| tracing::error!("Compilation failed: {:#}", e))?
        }
        Commands::Validate {
            taxonomy,
            collections,
        } => execute_validate(&taxonomy, &collections)?,
    };

    println!("{}", output.trim_end());
    Ok(())
}
