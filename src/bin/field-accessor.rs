use clap::{command, Parser};
use field_accessor::{
    config::CompilerConfig, AccessorDescriptor, CompilationContext, Error, InternalResult,
    TypeRegistry, Value,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON file with imports and type definitions
    #[arg(long)]
    types: Option<PathBuf>,

    /// Fully qualified (or imported) name of the target type
    #[arg(short = 't', long = "type")]
    type_name: String,

    /// Accessor expression
    #[arg(short, long)]
    expr: String,

    /// Reject anything that cannot be typed statically
    #[arg(short, long)]
    strict: bool,

    /// Path to a JSON file holding one instance or an array of instances
    #[arg(short, long)]
    instance: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> InternalResult<()> {
    let config = match &cli.types {
        Some(path) => CompilerConfig::from_file(path)?,
        None => CompilerConfig::default(),
    };
    info!("{} type definition(s) loaded.", config.types.len());

    let registry = Arc::new(TypeRegistry::from_definitions(config.types));
    let context = CompilationContext::new(registry.clone()).with_parser_config(config.parser);

    let mut descriptor = AccessorDescriptor::new(&cli.type_name, &cli.expr, cli.strict);
    descriptor.compile(&context)?;
    let result_kind = descriptor
        .result_kind()
        .ok_or_else(|| Error::internal("descriptor is not compiled"))?;
    println!("{} : {}", descriptor, result_kind);

    let Some(path) = &cli.instance else {
        return Ok(());
    };
    let content = std::fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    let instances = match json {
        serde_json::Value::Array(items) => items,
        single => vec![single],
    };

    let input_type = context.resolve_type(&cli.type_name).map_err(|e| Error::internal(e.to_string()))?;
    for (index, raw) in instances.iter().enumerate() {
        debug!("Evaluating instance {}", index);
        let instance = Value::from_json(raw, &input_type, &*registry)?;
        match descriptor.evaluate(&instance) {
            Ok(value) => println!("{}", value.to_json()),
            Err(e) => println!("error: {}", e),
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
