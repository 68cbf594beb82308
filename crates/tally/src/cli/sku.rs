//! SKU command group.

use anyhow::Result;
use clap::{Args, Subcommand};
use tally_protocol::sku::{self, SkuComponents};

#[derive(Subcommand, Debug)]
pub enum SkuCommand {
    /// Generate a SKU from category attributes
    Generate(GenerateArgs),
    /// Parse a SKU back into its attributes
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Item type, e.g. "Shirt"
    #[arg(long, default_value = "")]
    item_type: String,
    /// Color, e.g. "Black"
    #[arg(long, default_value = "")]
    color: String,
    /// Size, e.g. "L"
    #[arg(long, default_value = "")]
    size: String,
    /// Optional free-form prefix, e.g. a warehouse code
    #[arg(long, default_value = "")]
    prefix: String,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    sku: String,
}

pub fn run(command: SkuCommand) -> Result<()> {
    match command {
        SkuCommand::Generate(args) => {
            let components = SkuComponents {
                item_type: args.item_type,
                color: args.color,
                size: args.size,
                prefix: args.prefix,
            };
            println!("{}", sku::generate(&components));
        }
        SkuCommand::Parse(args) => {
            let components = sku::parse(&args.sku);
            if components == SkuComponents::default() {
                println!("unstructured identifier: {}", args.sku);
            } else {
                println!("type:   {}", components.item_type);
                println!("color:  {}", components.color);
                println!("size:   {}", components.size);
                if !components.prefix.is_empty() {
                    println!("prefix: {}", components.prefix);
                }
            }
        }
    }
    Ok(())
}
