//! # cart-cli: Marketplace Cart from the Command Line
//!
//! Wires a [`CartStore`] the way a UI shell would and runs a single cart
//! command against it.
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         One Invocation                                  │
//! │                                                                         │
//! │  1. Load CartConfig ─────────► cart.toml + CART_* environment           │
//! │  2. Open key-value store ────► file (cart.json) or memory               │
//! │  3. CartStore::new + load ───► restore saved cart                       │
//! │  4. CartContext::provide ────► consumers reach the store from here     │
//! │  5. Apply command ───────────► add_to_cart / increment / decrement      │
//! │  6. Flush + shutdown ────────► wait for the write to land               │
//! │  7. Render cart ─────────────► stdout                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod args;
pub mod error;

use std::sync::Arc;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cart_core::{Cart, CartChange};
use cart_store::{kv, CartConfig, CartContext, CartStore, StorageBackend};

pub use args::{CliArgs, Command, USAGE};
pub use error::{ArgsError, CliError, CliResult};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "warn,cart_store=info,cart_cli=info";

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout carries only the cart. Override with
/// `RUST_LOG`, e.g. `RUST_LOG=cart_store=debug`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Message for a bad command line: the error, a blank line, then usage.
pub fn usage_error(err: &ArgsError) -> String {
    format!("{}\n\n{}", err, USAGE)
}

/// Runs one command and returns the text to print.
pub async fn run(args: CliArgs) -> CliResult<String> {
    if args.command == Command::Help {
        return Ok(USAGE.to_string());
    }

    let mut config = CartConfig::load(args.config.clone())?;
    if args.memory {
        config.storage.backend = StorageBackend::Memory;
    }

    let store = Arc::new(CartStore::new(kv::open_store(&config)?, config.storage_key()));
    store.subscribe(|cart: &Cart| {
        debug!(
            items = cart.len(),
            quantity = cart.total_quantity(),
            "Cart published"
        );
    });
    store.load().await?;

    let context = CartContext::new();
    context.provide(Arc::clone(&store))?;

    let change = apply(&context, &args.command)?;
    if let Some(change) = change {
        info!(?change, "Command applied");
    }

    store.flush().await?;
    let status = store.persist_status().await;
    store.shutdown().await?;

    if let Some(error) = status.last_error {
        return Err(CliError::NotSaved(error));
    }

    render(&store.products(), args.json)
}

/// Applies a command through the context. `None` for read-only commands.
fn apply(context: &CartContext, command: &Command) -> CliResult<Option<CartChange>> {
    let cart = context.cart()?;

    let change = match command {
        Command::List | Command::Help => return Ok(None),
        Command::Add(item) => cart.add_to_cart(item.clone()),
        Command::Increment(id) => cart.increment(id),
        Command::Decrement(id) => cart.decrement(id),
    };

    Ok(Some(change))
}

/// Formats the cart for the terminal, or as the stored JSON array.
pub fn render(cart: &Cart, json: bool) -> CliResult<String> {
    if json {
        return cart.to_json().map_err(|e| CliError::Render(e.to_string()));
    }

    if cart.is_empty() {
        return Ok("Cart is empty".to_string());
    }

    let mut out = String::new();
    let mut total = 0.0;
    for item in cart {
        let line_total = item.price * f64::from(item.quantity);
        total += line_total;
        out.push_str(&format!(
            "{:>4} x {} [{}] @ {:.2} = {:.2}\n",
            item.quantity, item.title, item.id, item.price, line_total
        ));
    }
    out.push_str(&format!(
        "Total: {} units, {:.2}",
        cart.total_quantity(),
        total
    ));

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::NewCartItem;
    use std::path::Path;

    fn write_config(dir: &Path) -> std::path::PathBuf {
        let config_path = dir.join("cart.toml");
        let contents = format!(
            "[storage]\nbackend = \"file\"\npath = {:?}\n",
            dir.join("cart.json").to_string_lossy()
        );
        std::fs::write(&config_path, contents).unwrap();
        config_path
    }

    fn args(command: Command, config: Option<std::path::PathBuf>) -> CliArgs {
        CliArgs {
            command,
            config,
            memory: false,
            json: false,
        }
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Cart::new(), false).unwrap(), "Cart is empty");
        assert_eq!(render(&Cart::new(), true).unwrap(), "[]");
    }

    #[test]
    fn test_render_lines_and_total() {
        let (cart, _) = Cart::new().apply(&cart_core::CartOp::Add(NewCartItem::new(
            "a", "Shirt", "", 10.0,
        )));
        let (cart, _) = cart.apply(&cart_core::CartOp::Increment("a".into()));

        let out = render(&cart, false).unwrap();
        assert!(out.contains("2 x Shirt [a] @ 10.00 = 20.00"));
        assert!(out.ends_with("Total: 2 units, 20.00"));
    }

    #[test]
    fn test_default_log_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_usage_error_names_problem_once() {
        let err = CliArgs::parse(["checkout"]).unwrap_err();
        let message = usage_error(&err);

        assert!(message.starts_with("Unknown command: checkout\n\n"));
        assert!(message.ends_with(USAGE));
        assert_eq!(message.matches("checkout").count(), 1);
    }

    #[tokio::test]
    async fn test_help_skips_store() {
        let out = run(args(Command::Help, None)).await.unwrap();
        assert!(out.starts_with("GoMarketplace cart"));
    }

    #[tokio::test]
    async fn test_cart_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());

        let shirt = NewCartItem::new("a", "Shirt", "shirt.png", 10.0);
        run(args(Command::Add(shirt.clone()), Some(config.clone())))
            .await
            .unwrap();
        run(args(Command::Add(shirt), Some(config.clone())))
            .await
            .unwrap();

        let mut list = args(Command::List, Some(config.clone()));
        list.json = true;
        let out = run(list).await.unwrap();

        let cart = Cart::from_json(&out).unwrap();
        assert_eq!(cart.get("a").unwrap().quantity, 2);

        run(args(Command::Decrement("a".into()), Some(config.clone())))
            .await
            .unwrap();
        run(args(Command::Decrement("a".into()), Some(config.clone())))
            .await
            .unwrap();
        let out = run(args(Command::List, Some(config))).await.unwrap();
        assert_eq!(out, "Cart is empty");
    }

    #[tokio::test]
    async fn test_corrupt_cart_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        std::fs::write(dir.path().join("cart.json"), "{not json").unwrap();

        let err = run(args(Command::List, Some(config))).await.unwrap_err();
        assert!(matches!(err, CliError::Store(_)));
    }
}
