//! Command-line argument parsing.
//!
//! ## Usage
//! ```bash
//! cart list
//! cart add <id> <title> <price> [image_url]
//! cart increment <id>
//! cart decrement <id>
//!
//! # Options (anywhere on the line)
//! cart --config ./cart.toml list
//! cart --memory add a Shirt 10
//! cart --json list
//! ```

use std::path::PathBuf;

use cart_core::NewCartItem;

use crate::error::ArgsError;

/// Usage text printed for `--help` and after argument errors.
pub const USAGE: &str = "\
GoMarketplace cart

Usage: cart [OPTIONS] <COMMAND>

Commands:
  list                                 Show the cart
  add <id> <title> <price> [image]     Add one unit of a product
  increment <id>                       Add one unit of a product in the cart
  decrement <id>                       Remove one unit of a product

Options:
  -c, --config <PATH>    Config file (default: platform config dir/cart.toml)
  -m, --memory           Keep the cart in memory only
  -j, --json             Print the cart as stored JSON
  -h, --help             Show this help message";

/// One cart command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Add(NewCartItem),
    Increment(String),
    Decrement(String),
    Help,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: Command,
    pub config: Option<PathBuf>,
    pub memory: bool,
    pub json: bool,
}

impl CliArgs {
    /// Parses arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let mut config = None;
        let mut memory = false;
        let mut json = false;
        let mut positional = Vec::new();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    let path = args
                        .get(i + 1)
                        .ok_or(ArgsError::MissingValue("--config"))?;
                    config = Some(PathBuf::from(path));
                    i += 1;
                }
                "--memory" | "-m" => memory = true,
                "--json" | "-j" => json = true,
                "--help" | "-h" => {
                    return Ok(CliArgs {
                        command: Command::Help,
                        config,
                        memory,
                        json,
                    })
                }
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(ArgsError::UnknownOption(flag.to_string()))
                }
                _ => positional.push(args[i].clone()),
            }
            i += 1;
        }

        let command = parse_command(&positional)?;

        Ok(CliArgs {
            command,
            config,
            memory,
            json,
        })
    }
}

fn parse_command(positional: &[String]) -> Result<Command, ArgsError> {
    let Some((name, rest)) = positional.split_first() else {
        return Ok(Command::List);
    };

    let command = match (name.as_str(), rest) {
        ("list", []) => Command::List,
        ("add", [id, title, price]) => Command::Add(new_item(id, title, price, "")?),
        ("add", [id, title, price, image_url]) => {
            Command::Add(new_item(id, title, price, image_url)?)
        }
        ("increment", [id]) => Command::Increment(id.clone()),
        ("decrement", [id]) => Command::Decrement(id.clone()),
        ("list" | "add" | "increment" | "decrement", _) => {
            return Err(ArgsError::WrongArity(name.clone()))
        }
        _ => return Err(ArgsError::UnknownCommand(name.clone())),
    };

    Ok(command)
}

fn new_item(id: &str, title: &str, price: &str, image_url: &str) -> Result<NewCartItem, ArgsError> {
    let price: f64 = price
        .parse()
        .map_err(|_| ArgsError::InvalidPrice(price.to_string()))?;

    if !price.is_finite() {
        return Err(ArgsError::InvalidPrice(price.to_string()));
    }

    Ok(NewCartItem::new(id, title, image_url, price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_lists() {
        let args = CliArgs::parse(Vec::<String>::new()).unwrap();
        assert_eq!(args.command, Command::List);
        assert!(!args.memory);
    }

    #[test]
    fn test_add_with_and_without_image() {
        let args = CliArgs::parse(["add", "a", "Shirt", "10.5"]).unwrap();
        assert_eq!(
            args.command,
            Command::Add(NewCartItem::new("a", "Shirt", "", 10.5))
        );

        let args = CliArgs::parse(["add", "a", "Shirt", "10", "shirt.png"]).unwrap();
        assert_eq!(
            args.command,
            Command::Add(NewCartItem::new("a", "Shirt", "shirt.png", 10.0))
        );
    }

    #[test]
    fn test_options_anywhere() {
        let args = CliArgs::parse(["increment", "--memory", "a", "-c", "cart.toml", "-j"]).unwrap();

        assert_eq!(args.command, Command::Increment("a".into()));
        assert!(args.memory);
        assert!(args.json);
        assert_eq!(args.config, Some(PathBuf::from("cart.toml")));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            CliArgs::parse(["add", "a", "Shirt", "cheap"]),
            Err(ArgsError::InvalidPrice(_))
        ));
        assert!(matches!(
            CliArgs::parse(["add", "a", "Shirt", "NaN"]),
            Err(ArgsError::InvalidPrice(_))
        ));
        assert!(matches!(
            CliArgs::parse(["decrement"]),
            Err(ArgsError::WrongArity(_))
        ));
        assert!(matches!(
            CliArgs::parse(["checkout"]),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            CliArgs::parse(["list", "--verbose"]),
            Err(ArgsError::UnknownOption(_))
        ));
        assert!(matches!(
            CliArgs::parse(["list", "--config"]),
            Err(ArgsError::MissingValue("--config"))
        ));
    }

    #[test]
    fn test_help() {
        let args = CliArgs::parse(["add", "--help"]).unwrap();
        assert_eq!(args.command, Command::Help);
    }
}
