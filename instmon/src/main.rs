//! Entry point for instmon. Parses args and runs the chosen command.

use instmon::api::ApiClient;
use instmon::app::App;
use instmon::cli::{parse_args, Command};
use instmon::ws::subscribe_url;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args(), |k| env::var(k).ok()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            if msg.starts_with("Usage:") {
                return Ok(());
            }
            std::process::exit(2);
        }
    };

    match parsed.command {
        Command::List => {
            let api = ApiClient::new(&parsed.api)?;
            let instances = api.list().await?;
            if instances.is_empty() {
                println!("no instances");
            }
            for i in instances {
                println!("{:>5}  {:<24} {}", i.id, i.name, i.ip);
            }
        }
        Command::Add { name, ip } => {
            let api = ApiClient::new(&parsed.api)?;
            let i = api.create(&name, &ip).await?;
            println!("created {} ({} {})", i.id, i.name, i.ip);
        }
        Command::Remove { id } => {
            let api = ApiClient::new(&parsed.api)?;
            api.delete(id).await?;
            println!("removed {id}");
        }
        Command::Watch { instance_id } => {
            let url = subscribe_url(&parsed.ws, &instance_id)?;
            let mut app = App::new(instance_id);
            app.run(&url).await?;
        }
    }
    Ok(())
}
