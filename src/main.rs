use std::io::{self, Write as _};

use anyhow::Result;

use routeshift::{
    cmd::{Command, OutputFormat, SubCommand},
    config::Config,
    error::ValidationError,
    gateway::{client::GatewayClient, credentials::StaticCredentials},
    logging::Logger,
    routing::{
        codec::Codec,
        headers::HeaderTable,
        model::{Pool, RoutingConfig, RulePatch},
        sync::Synchronizer,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let command = Command::init();

    if command.logging {
        Logger::init()?;
    }

    let config = Config::load(command.config_load_option()?)?;

    run(command, config).await
}

async fn run(command: Command, config: Config) -> Result<()> {
    let table = HeaderTable::shipped_with(config.headers.clone());

    let codec = Codec::new(table.clone(), config.default_pool_policy);

    let credentials = StaticCredentials::new(
        config.credentials.user.clone(),
        config.credentials.token.clone(),
    );

    let client = GatewayClient::new(reqwest::Client::new(), &config.gateway.base_url, credentials);

    let sync = Synchronizer::new(client, codec);

    let namespace = command
        .namespace
        .clone()
        .unwrap_or_else(|| config.route.namespace.clone());

    let name = command
        .route
        .clone()
        .unwrap_or_else(|| config.route.name.clone());

    match command.subcommand {
        SubCommand::Get { output } => {
            let routing = sync.fetch_config(&namespace, &name).await?;

            match output {
                OutputFormat::Plain => print_config(&routing, &table),
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&routing)?),
            }
        }

        SubCommand::Add {
            header,
            value,
            target,
        } => {
            // Validate before the first network call goes out.
            if header.is_empty() {
                return Err(ValidationError::EmptyHeader.into());
            }

            if value.is_empty() {
                return Err(ValidationError::EmptyValue.into());
            }

            ensure_known_pool(&target, &config.pools)?;

            let routing = sync
                .apply_rule_change(&namespace, &name, |routing| {
                    routing.add_rule(&header, &value, target)?;
                    Ok(())
                })
                .await?;

            println!("Routing updated");
            print_config(&routing, &table);
        }

        SubCommand::Update {
            id,
            header,
            value,
            target,
        } => {
            if let Some(target) = &target {
                ensure_known_pool(target, &config.pools)?;
            }

            let mut found = false;

            let routing = sync
                .apply_rule_change(&namespace, &name, |routing| {
                    found = routing.update_rule(
                        id,
                        RulePatch {
                            header,
                            value,
                            target,
                        },
                    );
                    Ok(())
                })
                .await?;

            if !found {
                eprintln!("No rule with id {}; nothing changed", id);
            } else {
                println!("Routing updated");
            }

            print_config(&routing, &table);
        }

        SubCommand::Remove { id } => {
            let mut found = false;

            let routing = sync
                .apply_rule_change(&namespace, &name, |routing| {
                    found = routing.remove_rule(id);
                    Ok(())
                })
                .await?;

            if !found {
                eprintln!("No rule with id {}; nothing changed", id);
            } else {
                println!("Routing updated");
            }

            print_config(&routing, &table);
        }

        SubCommand::SetDefault { pool } => {
            ensure_known_pool(&pool, &config.pools)?;

            let routing = sync
                .apply_rule_change(&namespace, &name, |routing| {
                    routing.set_default_pool(pool);
                    Ok(())
                })
                .await?;

            println!("Routing updated");
            print_config(&routing, &table);
        }

        SubCommand::SwitchAll { pool, yes } => {
            ensure_known_pool(&pool, &config.pools)?;

            let prompt = format!(
                "This removes all routing rules and sends 100% of traffic to {}. Proceed?",
                pool
            );

            if !yes && !confirm(&prompt)? {
                println!("Aborted");
                return Ok(());
            }

            let routing = sync
                .apply_rule_change(&namespace, &name, |routing| {
                    routing.switch_all_to_pool(pool);
                    Ok(())
                })
                .await?;

            println!("Routing updated");
            print_config(&routing, &table);
        }
    }

    Ok(())
}

fn ensure_known_pool(pool: &Pool, pools: &[String]) -> Result<(), ValidationError> {
    let name = pool.to_string();

    if pools.iter().any(|p| *p == name) {
        Ok(())
    } else {
        Err(ValidationError::UnknownPool(name))
    }
}

fn print_config(routing: &RoutingConfig, table: &HeaderTable) {
    println!("default pool: {}", routing.default_pool);

    if routing.rules.is_empty() {
        println!("no rules defined");
        return;
    }

    for rule in &routing.rules {
        println!(
            "{:>4}  {} ({}) = {}  ->  {}",
            rule.id,
            rule.header,
            table.to_actual(&rule.header),
            rule.value,
            rule.target
        );
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}
