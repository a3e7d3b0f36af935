//! CLI application for controlling a Hue bridge.
//!
//! This example demonstrates a command-line interface covering discovery,
//! registration and the most common light, group and scene operations.
//!
//! Run with: cargo run --example hue_cli -- --help

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hue_bridge_rs::{Bridge, Brightness, ResourceKey, TransitionTime, discover_bridges};

#[derive(Parser)]
#[command(name = "hue-cli")]
#[command(about = "Control Philips Hue lights from the command line", long_about = None)]
struct Cli {
    /// IP address of the bridge (read from the credential file if omitted)
    #[arg(short, long, global = true)]
    ip: Option<String>,

    /// Registration token of an already paired client
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Credential file (default: .hue_bridge in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Transition time in deciseconds for state changes
    #[arg(short, long, global = true)]
    transition: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find bridges through the discovery service
    Discover,

    /// Pair with the bridge (press the link button first)
    Register,

    /// Show the bridge name and its lights
    Status,

    /// Turn a light on
    On {
        /// Light id or name
        light: String,
    },

    /// Turn a light off
    Off {
        /// Light id or name
        light: String,
    },

    /// Set brightness (0-254)
    Brightness {
        /// Light id or name
        light: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=254))]
        level: u8,
    },

    /// Set color temperature in Kelvin (2000-6500)
    Temperature {
        /// Light id or name
        light: String,
        kelvin: u32,
    },

    /// List groups
    Groups,

    /// List sensors
    Sensors,

    /// Recall a scene by group name and scene name
    Scene {
        group: String,
        scene: String,
    },
}

fn light_key(light: &str) -> ResourceKey {
    match light.parse::<u32>() {
        Ok(id) => ResourceKey::Id(id),
        Err(_) => ResourceKey::Name(light.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Discover = cli.command {
        println!("Asking the discovery service for bridges...");
        match discover_bridges().await {
            Ok(bridges) => {
                if bridges.is_empty() {
                    println!("No bridges found.");
                } else {
                    println!("\nFound {} bridge(s):", bridges.len());
                    for bridge in bridges {
                        println!("  IP: {:15}  ID: {}", bridge.internal_ip, bridge.id);
                    }
                }
            }
            Err(e) => eprintln!("Error during discovery: {}", e),
        }
        return Ok(());
    }

    let mut builder = Bridge::builder();
    if let Some(ip) = cli.ip {
        builder = builder.ip(ip);
    }
    if let Some(username) = cli.username {
        builder = builder.username(username);
    }
    if let Some(config) = cli.config {
        builder = builder.config_file(config);
    }
    let mut bridge = builder.build();
    let transition = cli.transition.map(TransitionTime::from_deciseconds);

    match cli.command {
        Commands::Discover => unreachable!(),

        Commands::Register => {
            println!("Registering with the bridge...");
            if bridge.ip().is_none() {
                bridge.get_ip_address(true).await?;
            }
            match bridge.register_app().await {
                Ok(()) => println!(
                    "Registered, token stored in {}",
                    bridge.credential_file().path().display()
                ),
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        command => {
            bridge.connect().await?;

            match command {
                Commands::Discover | Commands::Register => unreachable!(),

                Commands::Status => {
                    println!("Bridge: {}", bridge.name().await?);
                    for (id, info) in bridge.lights().get_all_lights().await? {
                        println!(
                            "  {:3}  {:24}  {:4}  bri {:3}  {}",
                            id,
                            info.name,
                            if info.state.on == Some(true) { "ON" } else { "OFF" },
                            info.state.bri.unwrap_or_default(),
                            if info.state.reachable == Some(false) { "unreachable" } else { "" }
                        );
                    }
                }

                Commands::On { light } => {
                    let mut light = bridge.lights().get(light_key(&light)).await?;
                    light.set_transition_time(transition);
                    light.set_on(true).await?;
                    println!("Light turned ON");
                }

                Commands::Off { light } => {
                    let mut light = bridge.lights().get(light_key(&light)).await?;
                    light.set_transition_time(transition);
                    light.set_on(false).await?;
                    println!("Light turned OFF");
                }

                Commands::Brightness { light, level } => {
                    let mut light = bridge.lights().get(light_key(&light)).await?;
                    light.set_transition_time(transition);
                    match Brightness::create(level) {
                        Some(brightness) => {
                            light.set_brightness(brightness).await?;
                            println!("Brightness set successfully");
                        }
                        None => eprintln!("Invalid brightness value. Must be between 0 and 254."),
                    }
                }

                Commands::Temperature { light, kelvin } => {
                    let mut light = bridge.lights().get(light_key(&light)).await?;
                    light.set_transition_time(transition);
                    light.set_colortemp_k(kelvin).await?;
                    println!("Temperature set successfully");
                }

                Commands::Groups => {
                    for (id, info) in bridge.groups().get_all_groups().await? {
                        println!("  {:3}  {:24}  lights {:?}", id, info.name, info.light_ids());
                    }
                }

                Commands::Sensors => {
                    for (id, info) in bridge.sensors().get_all_sensors().await? {
                        println!("  {:3}  {:24}  {}", id, info.name, info.sensor_type);
                    }
                }

                Commands::Scene { group, scene } => {
                    if bridge.scenes().run_scene(&group, &scene, transition).await? {
                        println!("Scene '{}' running in '{}'", scene, group);
                    } else {
                        eprintln!("Could not run scene '{}' in '{}'", scene, group);
                    }
                }
            }
        }
    }

    Ok(())
}
