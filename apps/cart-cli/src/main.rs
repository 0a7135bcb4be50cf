//! # Cart CLI Entry Point
//!
//! ## Usage
//! ```bash
//! cargo run -p cart-cli -- add a Shirt 10 shirt.png
//! cargo run -p cart-cli -- increment a
//! cargo run -p cart-cli -- --json list
//! ```

use std::env;

use cart_cli::{init_tracing, run, usage_error, CliArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = match CliArgs::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", usage_error(&e));
            std::process::exit(2);
        }
    };

    let output = run(args).await?;
    println!("{}", output);

    Ok(())
}
