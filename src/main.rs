//! recicart is a CLI tool that turns a recipe's ingredient list into grocery
//! cart contents.
//!
//! The tool has three commands:
//! 1. `ingredients` - Extracts the ingredient list from a recipe page
//! 2. `normalize` - Turns ingredient lines into store search terms
//! 3. `shop` - Resolves every ingredient into a product and quantity in a store catalog

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::LLMProvider;
use log::{LevelFilter, info};
use rate_guard::StdTokenBucket;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use recicart::{
    catalog::JsonCatalog,
    config::Config,
    constants::MODEL_API_KEY_ENV_NAME,
    generate::{GenerationContext, build_model, rate_limiter},
    normalize::normalize,
    pipeline::{shop, shopping_list},
    report::{render, write_report},
};

/// A CLI tool to fill a grocery cart from a recipe
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Command,

    /// Path to a JSON config file (exclusions, default shopping list, ...)
    #[arg(long, short, global = true)]
    config: Option<String>,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Print the ingredients of a recipe page
    Ingredients {
        /// The recipe URL
        url: String,
    },
    /// Turn ingredient lines into store search terms
    Normalize {
        #[command(flatten)]
        model: ModelArgs,
        /// Ingredient lines, e.g. "4 egg yolks"
        #[arg(required = true)]
        ingredients: Vec<String>,
    },
    /// Pick products and quantities for every ingredient from a catalog
    Shop {
        #[command(flatten)]
        model: ModelArgs,
        /// Path to a JSON product catalog
        #[arg(long)]
        catalog: String,
        /// Recipe URL; the default shopping list is used when omitted
        #[arg(long)]
        recipe: Option<String>,
        /// Path to write a Markdown report to
        #[arg(long, short)]
        output: Option<String>,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// URL of the LLM model to use, e.g. ollama://llama3
    model: String,
    /// Endpoint of the LLM backend
    #[arg(long)]
    base_url: Option<String>,
    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,
    /// Rate limit: requests per minute (default: no limit)
    #[arg(long, short = 'r')]
    rpm: Option<u32>,
}

/// The model and rate limiter every command shares.
struct ModelSetup {
    model: Box<dyn LLMProvider>,
    limiter: Option<StdTokenBucket>,
    timeout: Duration,
}

impl ModelSetup {
    fn context(&self) -> GenerationContext<'_> {
        GenerationContext {
            model: self.model.as_ref(),
            rate_limiter: self.limiter.as_ref(),
            timeout: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Ingredients { url } => handle_ingredients_command(&url, &config).await,
        Command::Normalize { model, ingredients } => {
            handle_normalize_command(model, &ingredients, config).await
        }
        Command::Shop {
            model,
            catalog,
            recipe,
            output,
        } => handle_shop_command(model, &catalog, recipe, output, config).await,
    }
}

async fn handle_ingredients_command(url: &str, config: &Config) -> Result<()> {
    let url = Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid recipe url: {}", e))?;
    let list = shopping_list(Some(&url), config).await;

    info!("Ingredients from {:?}", list.recipe.source);
    for ingredient in &list.recipe.ingredients {
        println!("{ingredient}");
    }
    Ok(())
}

async fn handle_normalize_command(
    model_args: ModelArgs,
    ingredients: &[String],
    mut config: Config,
) -> Result<()> {
    let setup = build_model_setup(model_args, &mut config)?;
    let ctx = setup.context();

    for ingredient in ingredients {
        let term = normalize(&ctx, ingredient).await;
        println!("{ingredient} -> {}", term.term);
    }
    Ok(())
}

async fn handle_shop_command(
    model_args: ModelArgs,
    catalog_path: &str,
    recipe: Option<String>,
    output: Option<String>,
    mut config: Config,
) -> Result<()> {
    let recipe_url = match recipe {
        Some(recipe) => {
            Some(Url::parse(&recipe).map_err(|e| anyhow::anyhow!("Invalid recipe url: {}", e))?)
        }
        None => None,
    };

    let setup = build_model_setup(model_args, &mut config)?;
    let ctx = setup.context();
    let mut catalog = JsonCatalog::from_file(catalog_path, config.max_candidates)?;

    let list = shopping_list(recipe_url.as_ref(), &config).await;
    let outcomes = shop(&ctx, &mut catalog, &list.recipe.ingredients).await;

    match output {
        Some(output) => write_report(&output, &list, &outcomes)?,
        None => print!("{}", render(&list, &outcomes)),
    }

    let cart = catalog.cart();
    info!("Cart holds {} products", cart.len());
    for (title, units) in cart {
        info!("{units} x {title}");
    }
    Ok(())
}

/// Builds the model described by the CLI arguments on top of the config file.
fn build_model_setup(model_args: ModelArgs, config: &mut Config) -> Result<ModelSetup> {
    if let Some(base_url) = model_args.base_url {
        config.base_url = Some(base_url);
    }
    if let Some(temperature) = model_args.temperature {
        config.temperature = temperature;
    }

    let model_url = Url::parse(&model_args.model)
        .map_err(|e| anyhow::anyhow!("Invalid model URL: {}", e))?;
    let llm_builder = LLMBuilder::new()
        .backend(
            LLMBackend::from_str(model_url.scheme())
                .map_err(|e| anyhow::anyhow!("Invalid LLM backend: {}", e))?,
        )
        .model(
            [
                model_url
                    .host_str()
                    .context("Specify model name as host URL.")?,
                model_url.username(),
            ]
            .iter()
            .filter(|x| !x.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(":"),
        );

    let llm_builder = match &config.base_url {
        Some(base_url) => llm_builder.base_url(base_url),
        None => llm_builder,
    };

    let llm_builder = match std::env::var(MODEL_API_KEY_ENV_NAME) {
        Ok(model_key) => {
            info!("API key is provided by {MODEL_API_KEY_ENV_NAME}");
            llm_builder.api_key(model_key)
        }
        Err(err) => {
            info!("{err} while providing api key");
            llm_builder
        }
    };

    Ok(ModelSetup {
        model: build_model(llm_builder, config.temperature)?,
        limiter: model_args.rpm.and_then(rate_limiter),
        timeout: config.timeout(),
    })
}
