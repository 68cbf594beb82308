//! Label command group: encode, decode, render.

use anyhow::{ensure, Context, Result};
use chrono::Utc;
use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;
use tally_matrix::render_png;
use tally_protocol::payload::{self, IdentityPayload};

#[derive(Subcommand, Debug)]
pub enum LabelCommand {
    /// Encode an identity payload to scannable JSON content
    Encode(EncodeArgs),
    /// Decode scanned content back into an identity
    Decode(DecodeArgs),
    /// Render content into a label PNG
    Render(RenderArgs),
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: f64,
    /// Store id; omit for items not yet registered
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    content: String,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    content: String,
    /// Output square size in pixels
    #[arg(long, default_value_t = 420)]
    size: u32,
    #[arg(long)]
    out: PathBuf,
}

pub fn run(command: LabelCommand) -> Result<()> {
    match command {
        LabelCommand::Encode(args) => {
            let mut envelope = IdentityPayload::new(args.sku, args.name, args.price, Utc::now());
            if let Some(id) = args.id {
                envelope = envelope.with_id(id);
            }
            let encoded = payload::encode_payload(&envelope)?;
            ensure!(
                payload::validate(&encoded),
                "encoded payload exceeds the scannable capacity"
            );
            println!("{encoded}");
        }

        LabelCommand::Decode(args) => match payload::decode(&args.content) {
            Some(identity) => {
                println!("sku:   {}", identity.sku);
                if let Some(name) = identity.name {
                    println!("name:  {name}");
                }
                if let Some(price) = identity.price {
                    println!("price: {price}");
                }
                if let Some(id) = identity.id {
                    println!("id:    {id}");
                }
            }
            None => println!("unrecognized content"),
        },

        LabelCommand::Render(args) => {
            ensure!(
                payload::validate(&args.content),
                "content is empty or exceeds the scannable capacity"
            );
            let png = render_png(&args.content, args.size)?;
            fs::write(&args.out, png)
                .with_context(|| format!("Failed to write {}", args.out.display()))?;
            println!("wrote {}", args.out.display());
        }
    }
    Ok(())
}
