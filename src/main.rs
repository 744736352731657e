use anyhow::{Context, Result};
use serde::Serialize;

use ffrelay::cli::{self, Commands};
use ffrelay::config::Config;
use ffrelay::logging;
use ffrelay::pipeline;
use ffrelay::presets::{PresetFamily, PresetResolver};
use ffrelay::restream::{HttpRelayApi, Restreamer};

#[derive(Serialize)]
struct RelayRow<'a> {
    name: &'a str,
    src: String,
}

fn main() -> Result<()> {
    let cli = cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::InitConfig => init_config(),
        command => {
            let config = match &cli.config {
                Some(path) => Config::load_from(path)?,
                None => Config::load()?,
            };
            run(command, &config)
        }
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let resolver = PresetResolver::init_global(config.presets.options());

    match command {
        Commands::Presets { family } => {
            let families = match family {
                Some(f) => vec![f],
                None => PresetFamily::ALL.to_vec(),
            };
            for family in families {
                println!("{}:", family);
                for name in resolver.preset_names(family) {
                    println!("  {}", name);
                }
            }
        }
        Commands::Decode { preset } => print_fragment(resolver.decode(Some(&preset))),
        Commands::Scale {
            preset,
            fps,
            width,
            height,
            extra,
        } => {
            let args = resolver.scale(Some(&preset), &extra, fps, width, height);
            println!("{}", pipeline::format_cmd(&args));
        }
        Commands::Encode {
            preset,
            input,
            output,
            split,
        } => {
            if split {
                for arg in resolver.encode_args(Some(&preset), &input, &output) {
                    println!("{}", arg);
                }
            } else {
                println!("{}", resolver.encode(Some(&preset), &input, &output));
            }
        }
        Commands::Engine { preset } => match resolver.go2rtc_engine(Some(&preset)) {
            Some(engine) => println!("{}", engine),
            None => eprintln!("No go2rtc engine for '{}'", preset),
        },
        Commands::Input { preset, fps } => print_fragment(resolver.input(Some(&preset), fps)),
        Commands::Record { preset } => print_fragment(resolver.record_output(Some(&preset))),
        Commands::Rtmp { preset } => print_fragment(resolver.rtmp_output(Some(&preset))),
        Commands::Relays { json } => {
            let relays = Restreamer::new(config, resolver).relays();
            if json {
                let rows: Vec<_> = relays
                    .iter()
                    .map(|r| RelayRow {
                        name: &r.name,
                        src: r.descriptor.to_string(),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if relays.is_empty() {
                println!("No streams to register");
            } else {
                for relay in relays {
                    println!("{}: {}", relay.name, relay.descriptor);
                }
            }
        }
        Commands::Register { api_url } => {
            let endpoint = api_url.as_deref().unwrap_or(&config.restream.api_url);
            let api = HttpRelayApi::new(endpoint)?;
            Restreamer::new(config, resolver)
                .register_all(&api)
                .with_context(|| format!("Restream registration with {} failed", endpoint))?;
            println!("Registered streams with {}", endpoint);
        }
        Commands::Commands => {
            for (camera, cmd) in pipeline::all_commands(resolver, config) {
                println!("# {}", camera);
                println!("{}", pipeline::format_cmd(&cmd));
            }
        }
        Commands::InitConfig => init_config()?,
    }

    Ok(())
}

fn print_fragment(args: Option<Vec<String>>) {
    match args {
        Some(args) => println!("{}", pipeline::format_cmd(&args)),
        None => eprintln!("Not a known preset"),
    }
}

fn init_config() -> Result<()> {
    let path = Config::config_path()?;
    if Config::exists() {
        println!("Config file exists: {}", path.display());
    } else {
        Config::ensure_default()?;
        println!("Created default config: {}", path.display());
    }
    Ok(())
}
